//! Decorative one-line remarks about the player's score.
//!
//! Nothing in the game depends on this module: every failure ends in a canned
//! line instead of an error.

mod config;
mod provider;
mod service;
mod trigger;

use serde::{Deserialize, Serialize};

pub use config::CommentaryConfig;
pub use provider::{CommentaryProvider, DisabledProvider, GeminiProvider};
pub use service::{CommentaryService, RetryPolicy};
pub use trigger::CommentaryTrigger;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentaryKind {
    Encouragement,
    Sarcasm,
    Advice,
    Congratulations,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commentary {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: CommentaryKind,
}

impl Commentary {
    pub fn new(message: impl Into<String>, kind: CommentaryKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}
