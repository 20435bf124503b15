//! Placement of the active piece's bounding box

/// Direction the active piece can be moved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Left,
    Right,
    Down,
}

/// Board coordinate of the top-left cell of a piece's 4x4 box.
/// Row 0 is the top of the board, rows grow downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The position one step away in `direction`
    pub fn shifted(self, direction: MoveDirection) -> Self {
        match direction {
            MoveDirection::Left => Self::new(self.row, self.col - 1),
            MoveDirection::Right => Self::new(self.row, self.col + 1),
            MoveDirection::Down => Self::new(self.row + 1, self.col),
        }
    }

    /// Board coordinate of shape cell (i, j)
    pub fn offset(self, i: usize, j: usize) -> (i32, i32) {
        (self.row + i as i32, self.col + j as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shifted_returns_new_value() {
        let origin = Position::new(2, 3);
        assert_eq!(origin.shifted(MoveDirection::Left), Position::new(2, 2));
        assert_eq!(origin.shifted(MoveDirection::Right), Position::new(2, 4));
        assert_eq!(origin.shifted(MoveDirection::Down), Position::new(3, 3));
        assert_eq!(origin, Position::new(2, 3));
    }

    #[test]
    fn test_offset() {
        assert_eq!(Position::new(-1, 5).offset(3, 2), (2, 7));
    }
}
