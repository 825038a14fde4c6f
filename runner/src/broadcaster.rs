use std::sync::{Arc, Mutex};

use common::commentary::{
    Commentary, CommentaryConfig, CommentaryProvider, CommentaryService, CommentaryTrigger,
    DisabledProvider, GeminiProvider,
};
use common::error::CommentaryError;
use common::games::snake::{GameState, GameStatus, StatusBroadcaster};
use common::{log, log_warn};
use tokio::task::JoinHandle;

pub enum RunnerCommentaryProvider {
    Gemini(GeminiProvider),
    /// No API key: every request falls back to a canned line.
    Offline(DisabledProvider),
}

impl CommentaryProvider for RunnerCommentaryProvider {
    async fn request(&self, score: u32, status: GameStatus) -> Result<Commentary, CommentaryError> {
        match self {
            RunnerCommentaryProvider::Gemini(provider) => provider.request(score, status).await,
            RunnerCommentaryProvider::Offline(provider) => provider.request(score, status).await,
        }
    }
}

pub fn build_commentary(config: &CommentaryConfig) -> Option<CommentaryService<RunnerCommentaryProvider>> {
    if !config.enabled {
        return None;
    }
    let provider = match GeminiProvider::from_config(config) {
        Ok(provider) => RunnerCommentaryProvider::Gemini(provider),
        Err(e) => {
            log_warn!("{}, using offline commentary", e);
            RunnerCommentaryProvider::Offline(DisabledProvider)
        }
    };
    Some(CommentaryService::new(provider, config.retry_policy()))
}

/// Logs session updates and fires commentary requests in the background.
#[derive(Clone)]
pub struct ConsoleBroadcaster {
    commentary: Option<CommentaryService<RunnerCommentaryProvider>>,
    trigger: Arc<Mutex<CommentaryTrigger>>,
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
    verbose: bool,
}

impl ConsoleBroadcaster {
    pub fn new(commentary: Option<CommentaryService<RunnerCommentaryProvider>>, verbose: bool) -> Self {
        Self {
            commentary,
            trigger: Arc::new(Mutex::new(CommentaryTrigger::new())),
            pending: Arc::new(Mutex::new(Vec::new())),
            verbose,
        }
    }

    /// Waits for in-flight commentary and rearms the trigger for the next game.
    pub async fn flush(&self) {
        let handles = std::mem::take(&mut *self.pending.lock().unwrap_or_else(|e| e.into_inner()));
        for handle in handles {
            let _ = handle.await;
        }
        self.trigger.lock().unwrap_or_else(|e| e.into_inner()).reset();
    }
}

impl StatusBroadcaster for ConsoleBroadcaster {
    async fn broadcast_state(&self, state: GameState) {
        if !self.verbose {
            return;
        }
        let head = state.snake.head();
        log!(
            "tick {:>5} head ({:>2},{:>2}) len {:>3} score {:>3}",
            state.tick,
            head.x,
            head.y,
            state.snake.len(),
            state.score
        );
    }

    async fn broadcast_status(&self, status: GameStatus, score: u32) {
        log!("{} score {}", status, score);

        let Some(service) = &self.commentary else {
            return;
        };
        let due = self
            .trigger
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .should_comment(score, status);
        if !due {
            return;
        }

        let service = service.clone();
        let handle = tokio::spawn(async move {
            let commentary = service.comment(score, status).await;
            log!("AI ({:?}): {}", commentary.kind, commentary.message);
        });
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).push(handle);
    }
}
