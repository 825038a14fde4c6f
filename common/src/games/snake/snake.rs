use std::collections::{HashSet, VecDeque};

use super::types::{Direction, Point};

pub const INITIAL_SNAKE_LENGTH: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    body: VecDeque<Point>,
    body_set: HashSet<Point>,
}

impl Snake {
    /// Lays the body out behind `head`, opposite to `direction`.
    pub fn new(head: Point, direction: Direction, length: usize) -> Self {
        let behind = direction.opposite();
        let mut segments = Vec::with_capacity(length.max(1));
        let mut current = head;
        for _ in 0..length.max(1) {
            segments.push(current);
            current = current.step(behind);
        }
        Self::from_segments(segments)
    }

    /// Starting snake for a square grid: centred, heading up.
    pub fn initial(grid_size: i32) -> Self {
        let centre = grid_size / 2;
        Self::new(Point::new(centre, centre), Direction::Up, INITIAL_SNAKE_LENGTH)
    }

    /// Builds a snake from segments ordered head first.
    ///
    /// Panics on an empty segment list.
    pub fn from_segments(segments: impl IntoIterator<Item = Point>) -> Self {
        let body: VecDeque<Point> = segments.into_iter().collect();
        assert!(!body.is_empty(), "Snake body should never be empty");
        let body_set = body.iter().copied().collect();
        Self { body, body_set }
    }

    pub fn head(&self) -> Point {
        self.body[0]
    }

    pub fn tail(&self) -> Point {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = Point> + '_ {
        self.body.iter().copied()
    }

    pub fn occupies(&self, point: Point) -> bool {
        self.body_set.contains(&point)
    }

    /// The tail is left out because it vacates on the move being made.
    pub fn occupies_excluding_tail(&self, point: Point) -> bool {
        self.occupies(point) && point != self.tail()
    }

    /// Returns the snake after its head moves to `next_head`.
    pub fn advanced(&self, next_head: Point, grow: bool) -> Snake {
        let mut next = self.clone();
        if !grow
            && let Some(tail) = next.body.pop_back()
        {
            next.body_set.remove(&tail);
        }
        next.body.push_front(next_head);
        next.body_set.insert(next_head);
        next
    }
}
