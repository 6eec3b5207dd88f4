//! Static client files and the placeholder avatar.

use std::path::Path;

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::middleware::map_response;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;

use crate::AppState;

/// Served as `/default-avatar.png` so clients that still reference the old
/// PNG get an image instead of a 404.
const DEFAULT_AVATAR_SVG: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64" viewBox="0 0 64 64">
  <rect rx="8" ry="8" width="64" height="64" fill="#f0f0f0"/>
  <g transform="translate(8,8)">
    <circle cx="24" cy="16" r="12" fill="#ddd"/>
    <rect x="4" y="36" width="40" height="12" rx="6" fill="#e6e6e6"/>
  </g>
</svg>"##;

pub fn router(static_dir: &Path) -> Router<AppState> {
    Router::new()
        .route("/default-avatar.png", get(default_avatar))
        .fallback_service(ServeDir::new(static_dir))
        .layer(map_response(html_utf8))
}

async fn default_avatar() -> impl IntoResponse {
    ([(CONTENT_TYPE, "image/svg+xml")], DEFAULT_AVATAR_SVG)
}

/// Pin HTML responses to UTF-8 so accented text renders correctly.
async fn html_utf8(mut response: Response) -> Response {
    let is_html = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));
    if is_html {
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
    }
    response
}
