/// The width and height of the board.
pub const BOARD_SIZE: usize = 7;

/// The shortest run of tiles that can count as a word.
pub const MIN_WORD_LENGTH: usize = 3;

/// A cell on the board. `x` is the column and `y` is the row, where row 0 is the top of the board
/// and row `BOARD_SIZE - 1` is the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Position {
        Position { x, y }
    }

    pub fn is_on_board(&self) -> bool {
        self.x < BOARD_SIZE && self.y < BOARD_SIZE
    }

    /// Returns the neighbouring position in the given direction, if it is on the board.
    pub fn step(&self, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.delta();
        let x = self.x as isize + dx;
        let y = self.y as isize + dy;
        if x < 0 || y < 0 || x >= BOARD_SIZE as isize || y >= BOARD_SIZE as isize {
            return None;
        }
        Some(Position::new(x as usize, y as usize))
    }

    /// Key for row-major (reading) order.
    pub fn row_major_key(&self) -> (usize, usize) {
        (self.y, self.x)
    }
}

/// One of the eight unit steps on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Right,
    Left,
    Down,
    Up,
    DownRight,
    UpLeft,
    DownLeft,
    UpRight,
}

impl Direction {
    /// Every direction. Searches from a single cell need all of these.
    pub const ALL: [Direction; 8] = [
        Direction::Right,
        Direction::Down,
        Direction::DownRight,
        Direction::DownLeft,
        Direction::Left,
        Direction::Up,
        Direction::UpLeft,
        Direction::UpRight,
    ];

    /// One direction per line orientation. Scanning every cell in these four directions finds
    /// every line on the board exactly once.
    pub const CANONICAL: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::DownRight,
        Direction::DownLeft,
    ];

    /// The `(dx, dy)` step of this direction.
    pub fn delta(&self) -> (isize, isize) {
        match self {
            Direction::Right => (1, 0),
            Direction::Left => (-1, 0),
            Direction::Down => (0, 1),
            Direction::Up => (0, -1),
            Direction::DownRight => (1, 1),
            Direction::UpLeft => (-1, -1),
            Direction::DownLeft => (-1, 1),
            Direction::UpRight => (1, -1),
        }
    }

    pub fn from_delta(dx: isize, dy: isize) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|direction| direction.delta() == (dx, dy))
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Right => Direction::Left,
            Direction::Left => Direction::Right,
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::DownRight => Direction::UpLeft,
            Direction::UpLeft => Direction::DownRight,
            Direction::DownLeft => Direction::UpRight,
            Direction::UpRight => Direction::DownLeft,
        }
    }

    /// Maps this direction onto the member of [`Direction::CANONICAL`] along the same line, so
    /// that a line and its reverse compare equal.
    pub fn canonical(&self) -> Direction {
        if Direction::CANONICAL.contains(self) {
            *self
        } else {
            self.opposite()
        }
    }

    pub fn is_diagonal(&self) -> bool {
        let (dx, dy) = self.delta();
        dx != 0 && dy != 0
    }
}

/// Returns the direction of the line formed by `positions`, if they form a straight, gap-free
/// line of unit steps in the given order.
///
/// Returns `None` for fewer than two positions.
pub fn line_direction(positions: &[Position]) -> Option<Direction> {
    if positions.len() < 2 || positions.iter().any(|position| !position.is_on_board()) {
        return None;
    }
    let dx = positions[1].x as isize - positions[0].x as isize;
    let dy = positions[1].y as isize - positions[0].y as isize;
    let direction = Direction::from_delta(dx, dy)?;
    if positions
        .windows(2)
        .all(|pair| pair[0].step(direction) == Some(pair[1]))
    {
        Some(direction)
    } else {
        None
    }
}

/// Sorts positions into row-major reading order.
pub fn sort_row_major(positions: &mut [Position]) {
    positions.sort_by_key(Position::row_major_key);
}
