use std::collections::VecDeque;

use super::game_state::GameState;
use super::snake::Snake;
use super::types::{Direction, GameMode, Point};

/// One scored move considered by the autopilot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CandidateMove {
    pub direction: Direction,
    /// Normalized cell the head would move into.
    pub cell: Point,
    pub space: usize,
    pub distance: u32,
}

impl CandidateMove {
    pub fn survives(&self, snake_len: usize) -> bool {
        self.space >= snake_len
    }
}

/// Greedy autopilot: nearest food subject to a reachable-space margin,
/// degrading to pure survival when no move keeps that margin.
pub struct BotController;

impl BotController {
    /// Never fails; falls back to the current heading.
    pub fn calculate_move(state: &GameState) -> Direction {
        let candidates = Self::evaluate_candidates(state);
        Self::choose(&candidates, state.snake.len()).unwrap_or(state.direction)
    }

    /// Scored candidates in UP, DOWN, LEFT, RIGHT order. Empty when there is no food.
    pub fn evaluate_candidates(state: &GameState) -> Vec<CandidateMove> {
        let board = Board::new(&state.snake, state.grid_size(), state.mode());
        let head = state.snake.head();

        let Some(target) = board.nearest_food(head, state.food_positions()) else {
            return Vec::new();
        };

        Direction::ALL
            .into_iter()
            .filter(|direction| !direction.is_opposite(&state.direction))
            .map(|direction| (direction, head.step(direction)))
            .filter(|(_, cell)| !board.is_collision(*cell))
            .map(|(direction, cell)| {
                let cell = board.normalize(cell);
                CandidateMove {
                    direction,
                    cell,
                    space: board.reachable_space(cell),
                    distance: cell.manhattan_distance(target),
                }
            })
            .collect()
    }

    fn choose(candidates: &[CandidateMove], snake_len: usize) -> Option<Direction> {
        // min_by_key keeps the first of equal minima, which is the fixed direction order.
        let primary = candidates
            .iter()
            .filter(|candidate| candidate.survives(snake_len))
            .min_by_key(|candidate| candidate.distance);

        if let Some(candidate) = primary {
            return Some(candidate.direction);
        }

        candidates
            .iter()
            .fold(None::<&CandidateMove>, |best, candidate| match best {
                Some(best) if best.space >= candidate.space => Some(best),
                _ => Some(candidate),
            })
            .map(|candidate| candidate.direction)
    }
}

/// Read-only view of the grid under the active mode.
struct Board<'a> {
    snake: &'a Snake,
    grid_size: i32,
    mode: GameMode,
}

impl<'a> Board<'a> {
    fn new(snake: &'a Snake, grid_size: i32, mode: GameMode) -> Self {
        Self {
            snake,
            grid_size,
            mode,
        }
    }

    fn normalize(&self, point: Point) -> Point {
        match self.mode {
            GameMode::Wrap => point.wrapped(self.grid_size),
            _ => point,
        }
    }

    fn is_collision(&self, point: Point) -> bool {
        let point = self.normalize(point);
        if self.mode != GameMode::Wrap && !point.in_bounds(self.grid_size) {
            return true;
        }
        self.snake.occupies_excluding_tail(point)
    }

    /// Closest food by Manhattan distance; ties go to the smallest `(x, y)`.
    fn nearest_food(&self, head: Point, foods: impl Iterator<Item = Point>) -> Option<Point> {
        foods
            .map(|food| self.normalize(food))
            .min_by_key(|food| (food.manhattan_distance(head), food.x, food.y))
    }

    /// Cells reachable from `start` without touching a collision, capped at
    /// the grid's cell count.
    fn reachable_space(&self, start: Point) -> usize {
        let start = self.normalize(start);
        if self.is_collision(start) {
            return 0;
        }

        let cell_count = (self.grid_size * self.grid_size) as usize;
        let mut visited = vec![false; cell_count];
        let mut queue = VecDeque::from([start]);
        visited[self.index(start)] = true;
        let mut count = 0;

        while count < cell_count {
            let Some(point) = queue.pop_front() else {
                break;
            };
            count += 1;

            for direction in Direction::ALL {
                let neighbor = self.normalize(point.step(direction));
                if self.is_collision(neighbor) {
                    continue;
                }
                let index = self.index(neighbor);
                if !visited[index] {
                    visited[index] = true;
                    queue.push_back(neighbor);
                }
            }
        }

        count
    }

    /// Only valid for in-bounds points.
    fn index(&self, point: Point) -> usize {
        (point.y * self.grid_size + point.x) as usize
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::games::snake::game_state::Food;
    use crate::games::snake::settings::GameSettings;
    use crate::games::snake::types::GameStatus;

    fn state_with(
        grid_size: i32,
        mode: GameMode,
        segments: &[Point],
        direction: Direction,
        foods: &[Point],
    ) -> GameState {
        let mut state = GameState::new(GameSettings {
            grid_size,
            mode,
            ..GameSettings::default()
        });
        state.snake = Snake::from_segments(segments.iter().copied());
        state.direction = direction;
        state.foods = foods.iter().map(|p| Food::new(*p, Duration::ZERO)).collect();
        state.status = GameStatus::Playing;
        state
    }

    fn default_snake() -> Vec<Point> {
        vec![Point::new(10, 10), Point::new(10, 11), Point::new(10, 12)]
    }

    #[test]
    fn test_moves_toward_food_straight_ahead() {
        let state = state_with(20, GameMode::Normal, &default_snake(), Direction::Up, &[Point::new(10, 5)]);

        assert_eq!(BotController::calculate_move(&state), Direction::Up);
    }

    #[test]
    fn test_food_behind_never_reverses() {
        let state = state_with(20, GameMode::Normal, &default_snake(), Direction::Up, &[Point::new(10, 13)]);

        let candidates = BotController::evaluate_candidates(&state);
        let direction = BotController::calculate_move(&state);

        assert!(candidates.iter().all(|c| c.direction != Direction::Down));
        assert_ne!(direction, Direction::Down);
        // UP, LEFT and RIGHT are all 4 away; UP comes first in the fixed order.
        assert_eq!(direction, Direction::Up);
    }

    #[test]
    fn test_turns_toward_food_on_the_side() {
        let state = state_with(20, GameMode::Normal, &default_snake(), Direction::Up, &[Point::new(15, 10)]);

        assert_eq!(BotController::calculate_move(&state), Direction::Right);
    }

    #[test]
    fn test_no_food_keeps_heading() {
        let state = state_with(20, GameMode::Normal, &default_snake(), Direction::Left, &[]);

        assert_eq!(BotController::calculate_move(&state), Direction::Left);
        assert!(BotController::evaluate_candidates(&state).is_empty());
    }

    #[test]
    fn test_deterministic_for_identical_snapshots() {
        let state = state_with(
            20,
            GameMode::Wrap,
            &default_snake(),
            Direction::Up,
            &[Point::new(3, 17), Point::new(17, 3), Point::new(10, 0)],
        );

        let first = BotController::calculate_move(&state);
        for _ in 0..10 {
            assert_eq!(BotController::calculate_move(&state.clone()), first);
        }
    }

    #[test]
    fn test_equidistant_foods_break_ties_lexicographically() {
        // (8, 10) and (12, 10) are both 2 away; (8, 10) is smaller.
        let state = state_with(
            20,
            GameMode::Normal,
            &default_snake(),
            Direction::Up,
            &[Point::new(12, 10), Point::new(8, 10)],
        );

        assert_eq!(BotController::calculate_move(&state), Direction::Left);
    }

    #[test]
    fn test_wall_moves_are_filtered_outside_wrap() {
        let segments = [Point::new(0, 0), Point::new(1, 0), Point::new(2, 0)];
        let state = state_with(20, GameMode::Normal, &segments, Direction::Left, &[Point::new(0, 19)]);

        let candidates = BotController::evaluate_candidates(&state);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].direction, Direction::Down);
    }

    #[test]
    fn test_god_mode_treats_walls_as_collisions() {
        let segments = [Point::new(0, 0), Point::new(1, 0), Point::new(2, 0)];
        let state = state_with(20, GameMode::God, &segments, Direction::Left, &[Point::new(19, 0)]);

        let candidates = BotController::evaluate_candidates(&state);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].direction, Direction::Down);
        assert_eq!(BotController::calculate_move(&state), Direction::Down);
    }

    #[test]
    fn test_stop_mode_filters_move_into_wall() {
        let segments = [Point::new(19, 19), Point::new(18, 19), Point::new(17, 19)];
        let state = state_with(20, GameMode::Stop, &segments, Direction::Right, &[Point::new(19, 0)]);

        let candidates = BotController::evaluate_candidates(&state);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].direction, Direction::Up);
    }

    #[test]
    fn test_wrap_mode_crosses_the_edge() {
        let segments = [Point::new(0, 10), Point::new(1, 10), Point::new(2, 10)];
        let state = state_with(20, GameMode::Wrap, &segments, Direction::Left, &[Point::new(18, 10)]);

        let candidates = BotController::evaluate_candidates(&state);
        let left = candidates.iter().find(|c| c.direction == Direction::Left).unwrap();

        assert_eq!(left.cell, Point::new(19, 10));
        assert_eq!(left.distance, 1);
        assert_eq!(BotController::calculate_move(&state), Direction::Left);
    }

    #[test]
    fn test_reachable_space_on_open_board_is_capped_by_cell_count() {
        let state = state_with(10, GameMode::Wrap, &default_snake()[..1], Direction::Up, &[Point::new(1, 1)]);
        let board = Board::new(&state.snake, 10, GameMode::Wrap);

        // Single-segment snake: its only segment is the tail, so nothing blocks.
        assert_eq!(board.reachable_space(Point::new(0, 0)), 100);
    }

    /// Head at (5,5) heading UP; LEFT leads into the sealed pocket {(4,5),(3,5)}.
    fn pocket_snake() -> Vec<Point> {
        vec![
            Point::new(5, 5),
            Point::new(5, 6),
            Point::new(4, 6),
            Point::new(3, 6),
            Point::new(2, 6),
            Point::new(2, 5),
            Point::new(2, 4),
            Point::new(3, 4),
            Point::new(4, 4),
            Point::new(4, 3),
            Point::new(4, 2),
        ]
    }

    #[test]
    fn test_avoids_pocket_smaller_than_body() {
        let state = state_with(20, GameMode::Normal, &pocket_snake(), Direction::Up, &[Point::new(3, 5)]);

        let candidates = BotController::evaluate_candidates(&state);
        let left = candidates.iter().find(|c| c.direction == Direction::Left).unwrap();
        let up = candidates.iter().find(|c| c.direction == Direction::Up).unwrap();

        assert_eq!(left.space, 2);
        assert!(left.distance < up.distance);
        assert_eq!(BotController::calculate_move(&state), Direction::Up);
    }

    #[test]
    fn test_never_picks_non_surviving_move_when_one_survives() {
        let foods = [Point::new(3, 5), Point::new(4, 5), Point::new(0, 0), Point::new(15, 15)];
        for food in foods {
            let state = state_with(20, GameMode::Normal, &pocket_snake(), Direction::Up, &[food]);
            let candidates = BotController::evaluate_candidates(&state);
            let len = state.snake.len();

            let chosen = BotController::calculate_move(&state);
            let chosen = candidates.iter().find(|c| c.direction == chosen).unwrap();

            assert!(candidates.iter().any(|c| c.survives(len)));
            assert!(chosen.survives(len));
        }
    }

    #[test]
    fn test_falls_back_to_largest_space_when_trapped() {
        // Head enclosed in the top-left corner: the free cells are (0,0), (1,0)
        // and (0,1), fewer than the 12 segments.
        let segments = [
            Point::new(1, 1),
            Point::new(1, 2),
            Point::new(0, 2),
            Point::new(0, 3),
            Point::new(1, 3),
            Point::new(2, 3),
            Point::new(2, 2),
            Point::new(2, 1),
            Point::new(2, 0),
            Point::new(3, 0),
            Point::new(4, 0),
            Point::new(5, 0),
        ];
        let state = state_with(20, GameMode::Normal, &segments, Direction::Up, &[Point::new(15, 15)]);

        let candidates = BotController::evaluate_candidates(&state);

        assert_eq!(
            candidates.iter().map(|c| (c.direction, c.space)).collect::<Vec<_>>(),
            vec![(Direction::Up, 3), (Direction::Left, 3)]
        );
        assert!(candidates.iter().all(|c| !c.survives(state.snake.len())));
        assert_eq!(BotController::calculate_move(&state), Direction::Up);
    }

    #[test]
    fn test_fallback_prefers_bigger_pocket_over_closer_food() {
        // UP is body. LEFT opens {(4,5),(3,5)}, RIGHT opens {(6,5),(7,5),(8,5)};
        // both are shorter than the 21 segments.
        let segments = [
            Point::new(5, 5),
            Point::new(5, 6),
            Point::new(4, 6),
            Point::new(3, 6),
            Point::new(2, 6),
            Point::new(2, 5),
            Point::new(2, 4),
            Point::new(3, 4),
            Point::new(4, 4),
            Point::new(5, 4),
            Point::new(6, 4),
            Point::new(7, 4),
            Point::new(8, 4),
            Point::new(9, 4),
            Point::new(9, 5),
            Point::new(9, 6),
            Point::new(8, 6),
            Point::new(7, 6),
            Point::new(6, 6),
            Point::new(6, 7),
            Point::new(6, 8),
        ];
        let state = state_with(20, GameMode::Normal, &segments, Direction::Up, &[Point::new(3, 5)]);

        let candidates = BotController::evaluate_candidates(&state);

        assert_eq!(
            candidates
                .iter()
                .map(|c| (c.direction, c.space, c.distance))
                .collect::<Vec<_>>(),
            vec![(Direction::Left, 2, 1), (Direction::Right, 3, 3)]
        );
        assert_eq!(BotController::calculate_move(&state), Direction::Right);
    }

    #[test]
    fn test_no_candidates_keeps_heading() {
        // Head at (0,0) heading LEFT, body blocks DOWN, walls block UP/LEFT,
        // RIGHT would reverse.
        let segments = [
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(1, 1),
            Point::new(0, 1),
            Point::new(0, 2),
        ];
        let state = state_with(20, GameMode::Normal, &segments, Direction::Left, &[Point::new(9, 9)]);

        assert!(BotController::evaluate_candidates(&state).is_empty());
        assert_eq!(BotController::calculate_move(&state), Direction::Left);
    }
}
