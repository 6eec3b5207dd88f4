//! Scripted bot replies.

/// A canned reply: text plus the animation the client shows as the avatar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: &'static str,
    pub animation: &'static str,
}

struct Rule {
    keywords: &'static [&'static str],
    reply: Reply,
}

/// Checked top to bottom; first match wins.
const RULES: &[Rule] = &[
    Rule {
        keywords: &["olá", "como estas"],
        reply: Reply {
            text: "Oi! Que bom te ver!",
            animation: "wave.gif",
        },
    },
    Rule {
        keywords: &["triste"],
        reply: Reply {
            text: "Oh, que pena...",
            animation: "sad.gif",
        },
    },
];

const FALLBACK: Reply = Reply {
    text: "Hmm, entendi.",
    animation: "thinking.gif",
};

/// Pick the reply for a message addressed to the bot.
pub fn reply(text: &str) -> Reply {
    let text = text.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| text.contains(k)))
        .map(|rule| rule.reply.clone())
        .unwrap_or(FALLBACK)
}

/// Whether `text` contains `@<bot_name>`, ignoring case.
pub fn mentions(text: &str, bot_name: &str) -> bool {
    let token = format!("@{}", bot_name.to_lowercase());
    text.to_lowercase().contains(&token)
}
