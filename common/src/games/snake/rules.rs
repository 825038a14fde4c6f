//! Tick transition function and status transitions.
//!
//! Every function takes a snapshot by reference and returns a new one; nothing
//! here mutates a `GameState` that a caller can still observe.

use std::time::Duration;

use crate::games::RandomSource;
use crate::log;
use super::game_state::{Food, GameState};
use super::settings::GameSettings;
use super::snake::Snake;
use super::types::{Direction, GameMode, GameStatus, LossReason, Point};

/// Random draws per grid cell before placement switches to scanning free cells.
const REJECTION_ATTEMPTS_PER_CELL: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The state was not `Playing`; nothing changed.
    Ignored,
    Moved,
    Ate { score: u32 },
    /// The move was discarded (STOP wall, GOD self-overlap).
    Blocked,
    Lost(LossReason),
    Won { score: u32 },
    Stalled,
}

impl TickOutcome {
    pub fn is_terminal(self) -> bool {
        matches!(self, TickOutcome::Lost(_) | TickOutcome::Won { .. } | TickOutcome::Stalled)
    }
}

#[derive(Clone, Debug)]
pub struct TickResult {
    pub state: GameState,
    pub outcome: TickOutcome,
}

/// Fresh game: new snake, food placed, status `Playing`.
pub fn start<R: RandomSource>(settings: &GameSettings, rng: &mut R, now: Duration) -> GameState {
    let mut state = GameState::new(settings.clone());
    replenish_food(&state.snake, &mut state.foods, settings, rng, now);
    state.status = GameStatus::Playing;
    log!(
        "Game started: {}x{} grid, mode {:?}, {} food, target {}",
        settings.grid_size,
        settings.grid_size,
        settings.mode,
        state.foods.len(),
        state.target_score()
    );
    state
}

pub fn pause(state: &GameState) -> GameState {
    with_status(state, GameStatus::Playing, GameStatus::Paused)
}

pub fn resume(state: &GameState) -> GameState {
    with_status(state, GameStatus::Paused, GameStatus::Playing)
}

pub fn reset(state: &GameState) -> GameState {
    GameState::new(state.settings.clone())
}

fn with_status(state: &GameState, from: GameStatus, to: GameStatus) -> GameState {
    let mut next = state.clone();
    if next.status == from {
        next.status = to;
    }
    next
}

/// Advances the game by one cell in `requested` (or the current heading if
/// `requested` reverses it).
pub fn tick<R: RandomSource>(
    state: &GameState,
    requested: Direction,
    rng: &mut R,
    now: Duration,
) -> TickResult {
    if state.status != GameStatus::Playing {
        return TickResult {
            state: state.clone(),
            outcome: TickOutcome::Ignored,
        };
    }

    let direction = if requested.is_opposite(&state.direction) {
        state.direction
    } else {
        requested
    };

    let mut next = state.clone();
    next.tick += 1;
    next.direction = direction;
    expire_food(&mut next, rng, now);

    let grid_size = state.grid_size();
    let raw_head = state.snake.head().step(direction);

    let next_head = match state.mode() {
        GameMode::Normal => {
            if !raw_head.in_bounds(grid_size) {
                return lost(next, LossReason::WallCollision);
            }
            raw_head
        }
        GameMode::Stop => {
            if !raw_head.in_bounds(grid_size) {
                return blocked(next);
            }
            raw_head
        }
        GameMode::Wrap | GameMode::God => raw_head.wrapped(grid_size),
    };

    if state.snake.occupies_excluding_tail(next_head) {
        return match state.mode() {
            GameMode::God => blocked(next),
            _ => lost(next, LossReason::SelfCollision),
        };
    }

    next.blocked_ticks = 0;
    let eaten = next.food_index_at(next_head);
    next.snake = state.snake.advanced(next_head, eaten.is_some());

    let Some(food_index) = eaten else {
        return TickResult {
            state: next,
            outcome: TickOutcome::Moved,
        };
    };

    next.foods.remove(food_index);
    next.score += 1;
    log!(
        "Ate food at ({}, {}). Score: {}",
        next_head.x,
        next_head.y,
        next.score
    );

    if next.score >= next.target_score() {
        next.status = GameStatus::Won;
        log!("Target score {} reached", next.target_score());
        return TickResult {
            outcome: TickOutcome::Won { score: next.score },
            state: next,
        };
    }

    let settings = next.settings.clone();
    replenish_food(&next.snake, &mut next.foods, &settings, rng, now);

    TickResult {
        outcome: TickOutcome::Ate { score: next.score },
        state: next,
    }
}

fn lost(mut next: GameState, reason: LossReason) -> TickResult {
    next.status = GameStatus::GameOver;
    next.loss_reason = Some(reason);
    log!("Collision after {} ticks: {:?}, score {}", next.tick, reason, next.score);
    TickResult {
        state: next,
        outcome: TickOutcome::Lost(reason),
    }
}

fn blocked(mut next: GameState) -> TickResult {
    next.blocked_ticks += 1;
    if next.blocked_ticks >= next.settings.stall_tick_limit {
        next.status = GameStatus::Stalled;
        log!(
            "Stalled after {} discarded moves, score {}",
            next.blocked_ticks,
            next.score
        );
        return TickResult {
            state: next,
            outcome: TickOutcome::Stalled,
        };
    }
    TickResult {
        state: next,
        outcome: TickOutcome::Blocked,
    }
}

fn expire_food<R: RandomSource>(state: &mut GameState, rng: &mut R, now: Duration) {
    let Some(lifetime) = state.settings.food_lifetime() else {
        return;
    };

    let before = state.foods.len();
    state.foods.retain(|food| !food.is_expired(lifetime, now));
    if state.foods.len() == before {
        return;
    }

    log!("{} food faded", before - state.foods.len());
    let settings = state.settings.clone();
    replenish_food(&state.snake, &mut state.foods, &settings, rng, now);
}

/// Tops `foods` up to the effective food count by rejection sampling.
///
/// New food never lands on the snake or on another food. If the requested
/// count exceeds the free cells it is capped silently.
pub fn replenish_food<R: RandomSource>(
    snake: &Snake,
    foods: &mut Vec<Food>,
    settings: &GameSettings,
    rng: &mut R,
    now: Duration,
) {
    let wanted = settings.effective_food_count(snake.len());
    let max_attempts = settings.cell_count() * REJECTION_ATTEMPTS_PER_CELL;
    let mut attempts = 0;

    while foods.len() < wanted {
        let candidate = if attempts < max_attempts {
            attempts += 1;
            rng.random_cell(settings.grid_size)
        } else {
            match random_free_cell(snake, foods, settings.grid_size, rng) {
                Some(cell) => cell,
                None => break,
            }
        };

        if is_free(snake, foods, candidate) {
            foods.push(Food::new(candidate, now));
        }
    }
}

fn is_free(snake: &Snake, foods: &[Food], cell: Point) -> bool {
    !snake.occupies(cell) && !foods.iter().any(|food| food.position == cell)
}

fn random_free_cell<R: RandomSource>(
    snake: &Snake,
    foods: &[Food],
    grid_size: i32,
    rng: &mut R,
) -> Option<Point> {
    let free: Vec<Point> = (0..grid_size)
        .flat_map(|y| (0..grid_size).map(move |x| Point::new(x, y)))
        .filter(|cell| is_free(snake, foods, *cell))
        .collect();
    if free.is_empty() {
        return None;
    }
    Some(free[rng.random_index(free.len())])
}
