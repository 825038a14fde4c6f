use std::time::Duration;

use super::settings::GameSettings;
use super::snake::{Snake, INITIAL_SNAKE_LENGTH};
use super::types::{Direction, GameMode, GameStatus, LossReason, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Food {
    pub position: Point,
    /// Monotonic time since session start.
    pub created_at: Duration,
}

impl Food {
    pub fn new(position: Point, created_at: Duration) -> Self {
        Self { position, created_at }
    }

    pub fn is_expired(&self, lifetime: Duration, now: Duration) -> bool {
        now.saturating_sub(self.created_at) >= lifetime
    }
}

/// Immutable snapshot of one game. The rules engine produces a new one per tick.
#[derive(Clone, Debug)]
pub struct GameState {
    pub snake: Snake,
    pub foods: Vec<Food>,
    pub direction: Direction,
    pub status: GameStatus,
    pub score: u32,
    pub tick: u64,
    /// Consecutive ticks whose move was discarded.
    pub blocked_ticks: u32,
    pub loss_reason: Option<LossReason>,
    pub settings: GameSettings,
}

impl GameState {
    pub fn new(settings: GameSettings) -> Self {
        Self {
            snake: Snake::initial(settings.grid_size),
            foods: Vec::new(),
            direction: Direction::Up,
            status: GameStatus::Idle,
            score: 0,
            tick: 0,
            blocked_ticks: 0,
            loss_reason: None,
            settings,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.settings.mode
    }

    pub fn grid_size(&self) -> i32 {
        self.settings.grid_size
    }

    pub fn target_score(&self) -> u32 {
        self.settings
            .target_score
            .resolve(self.settings.grid_size, INITIAL_SNAKE_LENGTH)
    }

    pub fn food_positions(&self) -> impl Iterator<Item = Point> + '_ {
        self.foods.iter().map(|food| food.position)
    }

    pub fn food_index_at(&self, position: Point) -> Option<usize> {
        self.foods.iter().position(|food| food.position == position)
    }
}
