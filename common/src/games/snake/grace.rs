use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::log;

const PENDING: u8 = 0;
const CORRECTED: u8 = 1;
const FINALIZED: u8 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraceResolution {
    Pending,
    Corrected,
    Finalized,
}

/// Deferred loss shared between the session and its timer task.
///
/// Exactly one of `try_correct` and `try_finalize` can succeed.
#[derive(Clone, Debug)]
pub struct GraceToken {
    id: u64,
    state: Arc<AtomicU8>,
}

impl GraceToken {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            state: Arc::new(AtomicU8::new(PENDING)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn try_correct(&self) -> bool {
        self.resolve(CORRECTED)
    }

    pub fn try_finalize(&self) -> bool {
        self.resolve(FINALIZED)
    }

    pub fn resolution(&self) -> GraceResolution {
        match self.state.load(Ordering::Acquire) {
            CORRECTED => GraceResolution::Corrected,
            FINALIZED => GraceResolution::Finalized,
            _ => GraceResolution::Pending,
        }
    }

    fn resolve(&self, to: u8) -> bool {
        self.state
            .compare_exchange(PENDING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Armed grace window: the token plus the timer that finalizes it.
pub struct GraceTimer {
    token: GraceToken,
    handle: JoinHandle<()>,
}

impl GraceTimer {
    /// Spawns a timer that finalizes the token after `window` and, if the
    /// finalize wins, sends the token id on `expired`.
    pub fn arm(id: u64, window: Duration, expired: mpsc::UnboundedSender<u64>) -> Self {
        let token = GraceToken::new(id);
        let timer_token = token.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if timer_token.try_finalize() {
                log!("Grace period {} elapsed, loss finalized", timer_token.id());
                let _ = expired.send(timer_token.id());
            }
        });
        Self { token, handle }
    }

    pub fn token(&self) -> &GraceToken {
        &self.token
    }

    /// Cancels the pending loss. Returns false when the timer already won.
    pub fn try_correct(&self) -> bool {
        if self.token.try_correct() {
            self.handle.abort();
            log!("Grace period {} corrected", self.token.id());
            return true;
        }
        false
    }

    pub fn cancel(self) {
        self.handle.abort();
    }
}
