//! 4x4 piece shapes and their quarter-turn rotations

use thiserror::Error;

/// Side length of every shape matrix
pub const SHAPE_SIZE: usize = 4;

/// Direction for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

impl RotationDirection {
    /// The rotation that undoes this one
    pub fn opposite(self) -> Self {
        match self {
            RotationDirection::Clockwise => RotationDirection::CounterClockwise,
            RotationDirection::CounterClockwise => RotationDirection::Clockwise,
        }
    }
}

/// Rejected shape input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("shape must have exactly {SHAPE_SIZE} rows, found {found}")]
    RowCount { found: usize },
    #[error("shape row {row} must have exactly {SHAPE_SIZE} cells, found {found}")]
    RowLength { row: usize, found: usize },
}

/// A 4x4 occupancy matrix, `true` where a block is present.
/// Indexed as `[row][col]`, row 0 at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Shape([[bool; SHAPE_SIZE]; SHAPE_SIZE]);

impl Shape {
    pub const fn new(cells: [[bool; SHAPE_SIZE]; SHAPE_SIZE]) -> Self {
        Self(cells)
    }

    /// Build a shape from dynamically sized rows, rejecting anything that is not exactly 4x4
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Result<Self, ShapeError> {
        if rows.len() != SHAPE_SIZE {
            return Err(ShapeError::RowCount { found: rows.len() });
        }

        let mut cells = [[false; SHAPE_SIZE]; SHAPE_SIZE];
        for (row, source) in rows.iter().enumerate() {
            let source = source.as_ref();
            if source.len() != SHAPE_SIZE {
                return Err(ShapeError::RowLength {
                    row,
                    found: source.len(),
                });
            }
            cells[row].copy_from_slice(source);
        }
        Ok(Self(cells))
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.0[row][col]
    }

    pub fn rows(&self) -> &[[bool; SHAPE_SIZE]; SHAPE_SIZE] {
        &self.0
    }

    /// Iterate over the (row, col) offsets of every filled cell
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(col, _)| (row, col))
        })
    }

    /// Number of filled cells
    pub fn block_count(&self) -> usize {
        self.filled_cells().count()
    }

    /// Return this shape turned a quarter in `direction`
    pub fn rotated(&self, direction: RotationDirection) -> Self {
        let mut copy = *self;
        copy.rotate_in_place(direction);
        copy
    }

    /// Turn the matrix a quarter in place, ring by ring
    pub fn rotate_in_place(&mut self, direction: RotationDirection) {
        const N: usize = SHAPE_SIZE;
        let m = &mut self.0;

        for i in 0..N / 2 {
            for j in i..N - i - 1 {
                let temp = m[i][j];
                match direction {
                    RotationDirection::Clockwise => {
                        m[i][j] = m[N - 1 - j][i];
                        m[N - 1 - j][i] = m[N - 1 - i][N - 1 - j];
                        m[N - 1 - i][N - 1 - j] = m[j][N - 1 - i];
                        m[j][N - 1 - i] = temp;
                    }
                    RotationDirection::CounterClockwise => {
                        m[i][j] = m[j][N - 1 - i];
                        m[j][N - 1 - i] = m[N - 1 - i][N - 1 - j];
                        m[N - 1 - i][N - 1 - j] = m[N - 1 - j][i];
                        m[N - 1 - j][i] = temp;
                    }
                }
            }
        }
    }
}

impl From<[[bool; SHAPE_SIZE]; SHAPE_SIZE]> for Shape {
    fn from(cells: [[bool; SHAPE_SIZE]; SHAPE_SIZE]) -> Self {
        Self(cells)
    }
}
