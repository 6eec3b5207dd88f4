pub mod events;
pub mod fanout;
pub mod history;
pub mod hub;
pub mod registry;
pub mod responder;
pub mod server;
pub mod session;
