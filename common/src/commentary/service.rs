use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::error::CommentaryError;
use crate::games::snake::GameStatus;
use crate::{log, log_warn};
use super::provider::CommentaryProvider;
use super::{Commentary, CommentaryKind};

const FALLBACK_LINES: &[(&str, CommentaryKind)] = &[
    ("Your snake moves faster than my processors on a Monday.", CommentaryKind::Encouragement),
    ("Do you even blink? A score like that takes inhuman focus.", CommentaryKind::Congratulations),
    ("I see you're going with the inch-by-inch strategy. Bold.", CommentaryKind::Advice),
    ("You zigzag like you're running from a system update.", CommentaryKind::Sarcasm),
    ("Your hand-eye coordination is... acceptable to the algorithm.", CommentaryKind::Encouragement),
    ("Eating that energy cell was statistically unlikely. Well done.", CommentaryKind::Congratulations),
    ("Warning: excessive dexterity detected. Are you a bot?", CommentaryKind::Sarcasm),
    ("Turn left. Or right. Just not into yourself.", CommentaryKind::Advice),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; only rate-limited attempts are retried.
    pub max_retries: u32,
    /// Delay before the first retry, doubled before each later one.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

/// Wraps a provider with backoff on rate limiting and a canned fallback.
pub struct CommentaryService<P> {
    provider: Arc<P>,
    policy: RetryPolicy,
}

impl<P> Clone for CommentaryService<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            policy: self.policy,
        }
    }
}

impl<P: CommentaryProvider> CommentaryService<P> {
    pub fn new(provider: P, policy: RetryPolicy) -> Self {
        Self {
            provider: Arc::new(provider),
            policy,
        }
    }

    /// Never fails: exhausted retries and non-retryable errors yield a
    /// fallback line.
    pub async fn comment(&self, score: u32, status: GameStatus) -> Commentary {
        let mut delay = self.policy.initial_delay;
        let mut retries_left = self.policy.max_retries;
        let mut attempt = 1;

        loop {
            let error = match self.provider.request(score, status).await {
                Ok(commentary) => return commentary,
                Err(CommentaryError::Disabled) => return random_fallback(score, status),
                Err(e) => e,
            };

            log_warn!("Commentary attempt {} failed: {}", attempt, error);
            if !error.is_rate_limited() || retries_left == 0 {
                return random_fallback(score, status);
            }

            log!("Rate limited, retrying commentary in {} ms", delay.as_millis());
            tokio::time::sleep(delay).await;
            delay *= 2;
            retries_left -= 1;
            attempt += 1;
        }
    }
}

fn random_fallback(score: u32, status: GameStatus) -> Commentary {
    let index = rand::rng().random_range(0..FALLBACK_LINES.len());
    fallback(score, status, index)
}

fn fallback(score: u32, status: GameStatus, index: usize) -> Commentary {
    let (line, kind) = FALLBACK_LINES[index % FALLBACK_LINES.len()];
    let message = if status == GameStatus::GameOver {
        format!("Session over. Score: {}. My circuits are crying (in binary).", score)
    } else {
        line.to_string()
    };
    Commentary::new(message, kind)
}
