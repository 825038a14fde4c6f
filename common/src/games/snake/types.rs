use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn in_bounds(self, grid_size: i32) -> bool {
        (0..grid_size).contains(&self.x) && (0..grid_size).contains(&self.y)
    }

    pub fn wrapped(self, grid_size: i32) -> Self {
        Self::new(self.x.rem_euclid(grid_size), self.y.rem_euclid(grid_size))
    }

    pub fn manhattan_distance(self, other: Point) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Fixed evaluation order; also the tie-break order of the autopilot.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(&self, other: &Direction) -> bool {
        self.opposite() == *other
    }

    /// y grows downwards.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameMode {
    /// Walls kill.
    #[default]
    Normal,
    /// Toroidal grid.
    Wrap,
    /// Walls block the move without killing.
    Stop,
    /// Nothing is fatal; walls wrap and self-overlap is blocked.
    God,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Idle,
    Playing,
    Paused,
    GameOver,
    Won,
    Stalled,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::GameOver | GameStatus::Won | GameStatus::Stalled)
    }

    pub fn label(self) -> &'static str {
        match self {
            GameStatus::Idle => "IDLE",
            GameStatus::Playing => "PLAYING",
            GameStatus::Paused => "PAUSED",
            GameStatus::GameOver => "GAME_OVER",
            GameStatus::Won => "WON",
            GameStatus::Stalled => "STALLED",
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    WallCollision,
    SelfCollision,
}

/// Score at which a session is won. Written as a number or `max` in config files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TargetScoreRepr", into = "TargetScoreRepr")]
pub enum TargetScore {
    Finite(u32),
    /// Every cell not covered by the starting snake.
    Max,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum TargetScoreRepr {
    Score(u32),
    Keyword(String),
}

impl TryFrom<TargetScoreRepr> for TargetScore {
    type Error = String;

    fn try_from(repr: TargetScoreRepr) -> Result<Self, Self::Error> {
        match repr {
            TargetScoreRepr::Score(score) => Ok(TargetScore::Finite(score)),
            TargetScoreRepr::Keyword(word) if word.eq_ignore_ascii_case("max") => Ok(TargetScore::Max),
            TargetScoreRepr::Keyword(word) => Err(format!("unknown target score '{}'", word)),
        }
    }
}

impl From<TargetScore> for TargetScoreRepr {
    fn from(target: TargetScore) -> Self {
        match target {
            TargetScore::Finite(score) => TargetScoreRepr::Score(score),
            TargetScore::Max => TargetScoreRepr::Keyword("max".to_string()),
        }
    }
}

impl TargetScore {
    pub fn resolve(self, grid_size: i32, initial_snake_len: usize) -> u32 {
        let free_cells = (grid_size * grid_size) as u32 - initial_snake_len as u32;
        match self {
            TargetScore::Finite(score) => score,
            TargetScore::Max => free_cells,
        }
    }
}
