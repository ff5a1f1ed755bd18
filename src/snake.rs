use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use Direction::*;

pub const INITIAL_SNAKE_LENGTH: i32 = 3;

/// Pixel-space top-left corner of one grid square.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    /// The cell one step of `size` pixels away in `direction`.
    pub fn step(self, direction: Direction, size: i32) -> Self {
        let (dx, dy) = direction.unit();
        Cell::new(self.x + dx * size, self.y + dy * size)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Up,
    #[default]
    Right,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Left, Up, Right, Down];

    pub fn opposite(self) -> Self {
        match self {
            Left => Right,
            Right => Left,
            Up => Down,
            Down => Up,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }

    fn unit(self) -> (i32, i32) {
        match self {
            Left => (-1, 0),
            Up => (0, -1),
            Right => (1, 0),
            Down => (0, 1),
        }
    }
}

/// A direction change asked for by the player or by a restart.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DirectionRequest {
    Turn(Direction),
    Reset,
}

impl From<Direction> for DirectionRequest {
    fn from(direction: Direction) -> Self {
        DirectionRequest::Turn(direction)
    }
}

/// Applies a direction change, refusing a 180 degree turn.
pub fn reduce_direction(current: Direction, request: DirectionRequest) -> Direction {
    match request {
        DirectionRequest::Reset => Direction::default(),
        DirectionRequest::Turn(next) if next.is_opposite(current) => current,
        DirectionRequest::Turn(next) => next,
    }
}

/// `x < 0 || x > width || y < 0 || y > height`.
///
/// The check is against the far edge of the surface, so a head sitting at
/// `x == width` (one column past the last visible one) is still alive.
pub fn hit_wall(head: Cell, width: i32, height: i32) -> bool {
    head.x < 0 || head.x > width || head.y < 0 || head.y > height
}

/// The snake body, head first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    body: Vec<Cell>,
}

impl Snake {
    /// Lays out the starting snake on the middle row, heading right.
    pub fn initial(cell: i32, width: i32, height: i32) -> Result<Self> {
        let y = height / cell / 2 * cell;

        if INITIAL_SNAKE_LENGTH * cell > width || y + cell > height {
            return Err(GameError::NoRoomForSnake { width, height, cell });
        }

        let body = (1..=INITIAL_SNAKE_LENGTH)
            .rev()
            .map(|i| Cell::new(i * cell, y))
            .collect();
        Ok(Snake { body })
    }

    /// Builds a snake from explicit cells. Returns `None` for an empty body.
    pub fn from_cells(body: Vec<Cell>) -> Option<Self> {
        if body.is_empty() {
            None
        } else {
            Some(Snake { body })
        }
    }

    pub fn body(&self) -> &[Cell] {
        &self.body
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn tail(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn contains(&self, cell: &Cell) -> bool {
        self.body.contains(cell)
    }

    /// Moves the head one cell along `direction`; the old tail is dropped.
    pub fn advance(&self, cell: i32, direction: Direction) -> Snake {
        let head = self.head().step(direction, cell);
        let body = std::iter::once(head)
            .chain(self.body[..self.body.len() - 1].iter().copied())
            .collect();
        Snake { body }
    }

    /// Appends `cell` at the tail end, one cell longer than before.
    pub fn grow(&mut self, cell: Cell) {
        self.body.push(cell);
    }

    pub fn hit_tail(&self) -> bool {
        let head = self.head();
        self.body[1..].contains(&head)
    }

    /// Whether this snake's head sits on the apple.
    pub fn ate(&self, apple: Cell) -> bool {
        self.head() == apple
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake(cells: &[(i32, i32)]) -> Snake {
        Snake::from_cells(cells.iter().map(|&(x, y)| Cell::new(x, y)).collect()).unwrap()
    }

    #[test]
    fn test_reducer_rejects_reversal() {
        for d in Direction::ALL {
            assert_eq!(reduce_direction(d, d.opposite().into()), d);
        }
    }

    #[test]
    fn test_reducer_accepts_other_turns() {
        for d in Direction::ALL {
            for next in Direction::ALL.iter().copied().filter(|n| *n != d.opposite()) {
                assert_eq!(reduce_direction(d, next.into()), next);
            }
        }
    }

    #[test]
    fn test_reducer_reset_always_wins() {
        for d in Direction::ALL {
            assert_eq!(reduce_direction(d, DirectionRequest::Reset), Right);
        }
        // Reset restores right even from left, which a turn could not do.
        assert_eq!(reduce_direction(Left, DirectionRequest::Reset), Right);
    }

    #[test]
    fn test_initial_layout() {
        let s = Snake::initial(20, 500, 500).unwrap();
        assert_eq!(
            s.body(),
            &[Cell::new(60, 240), Cell::new(40, 240), Cell::new(20, 240)]
        );
    }

    #[test]
    fn test_initial_needs_room() {
        assert!(matches!(
            Snake::initial(20, 59, 500),
            Err(GameError::NoRoomForSnake { .. })
        ));
        assert!(Snake::initial(20, 60, 20).is_ok());
        assert!(Snake::initial(20, 60, 19).is_err());
    }

    #[test]
    fn test_advance_keeps_length() {
        let s = snake(&[(60, 40), (40, 40), (20, 40)]);
        let moved = s.advance(20, Down);
        assert_eq!(moved.len(), s.len());
        assert_eq!(moved.body(), &[Cell::new(60, 60), Cell::new(60, 40), Cell::new(40, 40)]);
        // The original is untouched.
        assert_eq!(s.head(), Cell::new(60, 40));
    }

    #[test]
    fn test_grow_adds_exactly_one() {
        let s = snake(&[(60, 40), (40, 40), (20, 40)]);
        let mut moved = s.advance(20, Right);
        // The eaten cell is the old head, now right behind the new one.
        moved.grow(s.head());
        assert_eq!(moved.len(), s.len() + 1);
        assert_eq!(moved.tail(), Cell::new(60, 40));
        assert!(!moved.hit_tail());
    }

    #[test]
    fn test_single_cell_snake_advances() {
        let s = snake(&[(0, 0)]);
        assert_eq!(s.advance(10, Down).body(), &[Cell::new(0, 10)]);
    }

    #[test]
    fn test_hit_tail() {
        // A square loop: turning left puts the head back on the last body cell.
        let s = snake(&[(20, 20), (20, 0), (0, 0), (0, 20), (0, 40)]);
        let moved = s.advance(20, Left);
        assert!(moved.hit_tail());
        assert!(!s.advance(20, Right).hit_tail());
    }

    #[test]
    fn test_hit_wall_uses_far_edge() {
        assert!(!hit_wall(Cell::new(0, 0), 500, 500));
        assert!(!hit_wall(Cell::new(500, 500), 500, 500));
        assert!(hit_wall(Cell::new(520, 0), 500, 500));
        assert!(hit_wall(Cell::new(-20, 0), 500, 500));
        assert!(hit_wall(Cell::new(0, -20), 500, 500));
        assert!(hit_wall(Cell::new(0, 520), 500, 500));
    }

    #[test]
    fn test_direction_serde_names() {
        let d: Direction = serde_json::from_str("\"up\"").unwrap();
        assert_eq!(d, Up);
    }
}
