use crate::games::snake::GameStatus;

const SCORE_STEP: u32 = 5;

/// Decides when a remark is due: on game over, and once per non-zero
/// multiple of five.
#[derive(Debug, Default)]
pub struct CommentaryTrigger {
    last_score: Option<u32>,
}

impl CommentaryTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_comment(&mut self, score: u32, status: GameStatus) -> bool {
        let due = status == GameStatus::GameOver
            || (score > 0 && score % SCORE_STEP == 0 && self.last_score != Some(score));
        if due {
            self.last_score = Some(score);
        }
        due
    }

    pub fn reset(&mut self) {
        self.last_score = None;
    }
}
