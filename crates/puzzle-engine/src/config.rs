//! Engine configuration from environment variables.

use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Delay before the opponent's scripted reply is played.
    pub reply_delay: Duration,

    /// Promote to a queen when a promoting move arrives without a piece.
    pub auto_queen: bool,

    /// Mistakes after which front ends suggest a hint.
    pub hint_after_mistakes: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(500),
            auto_queen: true,
            hint_after_mistakes: 2,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; unset or unparsable values keep
    /// their defaults.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let reply_delay = lookup("PUZZLE_REPLY_DELAY_MS")
            .and_then(|v| v.trim().parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.reply_delay);

        let auto_queen = lookup("PUZZLE_AUTO_QUEEN")
            .and_then(|v| parse_flag(&v))
            .unwrap_or(defaults.auto_queen);

        let hint_after_mistakes = lookup("PUZZLE_HINT_AFTER_MISTAKES")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.hint_after_mistakes);

        Self {
            reply_delay,
            auto_queen,
            hint_after_mistakes,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
