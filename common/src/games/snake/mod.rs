mod bot_controller;
mod game_state;
mod grace;
pub mod rules;
mod session;
mod settings;
mod snake;
mod types;

pub use bot_controller::{BotController, CandidateMove};
pub use game_state::{Food, GameState};
pub use grace::{GraceResolution, GraceTimer, GraceToken};
pub use rules::{TickOutcome, TickResult};
pub use session::{SessionCommand, SessionConfig, SessionSummary, SnakeSession, StatusBroadcaster};
pub use settings::{GameSettings, MAX_FOOD_COUNT, MAX_GRID_SIZE, MIN_GRID_SIZE};
pub use snake::{Snake, INITIAL_SNAKE_LENGTH};
pub use types::{Direction, GameMode, GameStatus, LossReason, Point, TargetScore};
