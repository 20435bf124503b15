//! Playfield grid, piece baking and line removal

use crate::piece::{Piece, EMPTY_COLOR};
use crate::position::Position;
use ratatui::style::Color;

/// Smallest accepted board dimensions; smaller requests are clamped up
pub const MIN_HEIGHT: usize = 4;
pub const MIN_WIDTH: usize = 10;

/// A cell on the board - either empty or filled with a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(Color),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }

    /// Display colour, `EMPTY_COLOR` for empty cells
    pub fn color(&self) -> Color {
        match self {
            Cell::Empty => EMPTY_COLOR,
            Cell::Filled(color) => *color,
        }
    }
}

/// The locked blocks of the playfield
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Grid stored as [row][col], row 0 is top, row increases downward
    cells: Vec<Vec<Cell>>,
    height: usize,
    width: usize,
}

impl Board {
    /// Create an empty board, clamping to at least `MIN_HEIGHT` x `MIN_WIDTH`
    pub fn new(height: usize, width: usize) -> Self {
        let height = height.max(MIN_HEIGHT);
        let width = width.max(MIN_WIDTH);
        Self {
            cells: vec![vec![Cell::Empty; width]; height],
            height,
            width,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether (row, col) lies inside the grid
    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.height && (col as usize) < self.width
    }

    /// Get the cell at a position (row, col)
    /// Returns None if out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        if !self.in_bounds(row, col) {
            return None;
        }
        Some(self.cells[row as usize][col as usize])
    }

    /// Set a cell at a position
    /// Returns false if out of bounds
    pub fn set(&mut self, row: i32, col: i32, cell: Cell) -> bool {
        if !self.in_bounds(row, col) {
            return false;
        }
        self.cells[row as usize][col as usize] = cell;
        true
    }

    /// Whether a locked block sits at (row, col); out of bounds reads as free
    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        self.get(row, col).is_some_and(|cell| cell.is_filled())
    }

    /// Display colour at (row, col); `EMPTY_COLOR` when empty or out of bounds
    pub fn color_at(&self, row: i32, col: i32) -> Color {
        self.get(row, col).map_or(EMPTY_COLOR, |cell| cell.color())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.iter().map(Vec::as_slice)
    }

    /// Merge a piece's filled cells into the grid at `top_left`.
    /// Cells falling outside the grid are dropped; existing blocks are never erased.
    pub fn bake(&mut self, piece: &Piece, top_left: Position) {
        for (i, j) in piece.orientation().filled_cells() {
            let (row, col) = top_left.offset(i, j);
            self.set(row, col, Cell::Filled(piece.color()));
        }
    }

    /// Check if a line is completely filled
    pub fn is_row_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|cell| cell.is_filled())
    }

    /// Indices of all full rows, top to bottom
    pub fn full_rows(&self) -> Vec<usize> {
        (0..self.height).filter(|&row| self.is_row_full(row)).collect()
    }

    /// Empty every cell of `row`
    pub fn clear_row(&mut self, row: usize) {
        self.cells[row].fill(Cell::Empty);
    }

    /// Remove `row`, dropping every row above it by one and emptying row 0
    pub fn collapse_row(&mut self, row: usize) {
        for r in (1..=row).rev() {
            let (above, below) = self.cells.split_at_mut(r);
            below[0].clone_from_slice(&above[r - 1]);
        }
        self.cells[0].fill(Cell::Empty);
    }

    /// Remove the given rows (top-to-bottom order) and compact the stack
    pub fn remove_rows(&mut self, rows: &[usize]) {
        for &row in rows {
            self.clear_row(row);
        }
        for &row in rows {
            self.collapse_row(row);
        }
    }

    /// Number of filled cells
    pub fn filled_count(&self) -> usize {
        self.cells
            .iter()
            .map(|row| row.iter().filter(|cell| cell.is_filled()).count())
            .sum()
    }

    /// Check if the board is completely empty
    pub fn is_empty(&self) -> bool {
        self.filled_count() == 0
    }

    /// Empty every cell, keeping the dimensions
    pub fn reset(&mut self) {
        for row in &mut self.cells {
            row.fill(Cell::Empty);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;

    const T: bool = true;
    const F: bool = false;

    fn fill_row(board: &mut Board, row: i32, color: Color) {
        for col in 0..board.width() as i32 {
            board.set(row, col, Cell::Filled(color));
        }
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(20, 10);
        assert!(board.is_empty());
        assert_eq!(board.height(), 20);
        assert_eq!(board.width(), 10);
    }

    #[test]
    fn test_dimensions_are_clamped() {
        let board = Board::new(1, 3);
        assert_eq!(board.height(), MIN_HEIGHT);
        assert_eq!(board.width(), MIN_WIDTH);
        assert_eq!(board.rows().count(), MIN_HEIGHT);
        assert!(board.rows().all(|row| row.len() == MIN_WIDTH));
    }

    #[test]
    fn test_set_and_get() {
        let mut board = Board::new(20, 10);
        assert!(board.set(5, 5, Cell::Filled(Color::Red)));
        assert_eq!(board.get(5, 5), Some(Cell::Filled(Color::Red)));
        assert!(board.is_occupied(5, 5));
        assert_eq!(board.color_at(5, 5), Color::Red);
        assert_eq!(board.color_at(5, 6), EMPTY_COLOR);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut board = Board::new(20, 10);
        assert_eq!(board.get(-1, 0), None);
        assert_eq!(board.get(0, -1), None);
        assert_eq!(board.get(20, 0), None);
        assert_eq!(board.get(0, 10), None);
        assert!(!board.set(0, 10, Cell::Filled(Color::Red)));
        assert!(!board.is_occupied(-1, -1));
    }

    #[test]
    fn test_bake_merges_and_drops_out_of_bounds_cells() {
        let mut board = Board::new(4, 10);
        board.set(3, 0, Cell::Filled(Color::Green));
        let square = Shape::new([
            [T, T, F, F],
            [T, T, F, F],
            [F, F, F, F],
            [F, F, F, F],
        ]);
        let piece = Piece::with_color(square, Color::Red);

        // Bottom half of the square hangs below the floor
        board.bake(&piece, Position::new(3, -1));
        assert_eq!(board.get(3, 0), Some(Cell::Filled(Color::Red)));
        assert_eq!(board.filled_count(), 1);

        // Empty piece cells never erase existing blocks
        board.set(0, 9, Cell::Filled(Color::Blue));
        board.bake(&piece, Position::new(0, 6));
        assert_eq!(board.get(0, 9), Some(Cell::Filled(Color::Blue)));
        assert_eq!(board.filled_count(), 6);
    }

    #[test]
    fn test_full_rows_top_to_bottom() {
        let mut board = Board::new(6, 10);
        fill_row(&mut board, 4, Color::Cyan);
        fill_row(&mut board, 1, Color::Cyan);
        board.set(2, 0, Cell::Filled(Color::Red));
        assert_eq!(board.full_rows(), vec![1, 4]);
    }

    #[test]
    fn test_remove_single_row_drops_stack() {
        let mut board = Board::new(6, 10);
        fill_row(&mut board, 5, Color::Cyan);
        board.set(4, 0, Cell::Filled(Color::Red));
        board.set(3, 7, Cell::Filled(Color::Blue));

        board.remove_rows(&[5]);
        assert_eq!(board.get(5, 0), Some(Cell::Filled(Color::Red)));
        assert_eq!(board.get(4, 7), Some(Cell::Filled(Color::Blue)));
        assert_eq!(board.filled_count(), 2);
        assert_eq!(board.color_at(3, 7), EMPTY_COLOR);
    }

    #[test]
    fn test_remove_split_rows_preserves_survivor_order() {
        let mut board = Board::new(8, 10);
        board.set(0, 1, Cell::Filled(Color::Red));
        fill_row(&mut board, 3, Color::Cyan);
        board.set(4, 2, Cell::Filled(Color::Green));
        fill_row(&mut board, 5, Color::Cyan);
        board.set(6, 3, Cell::Filled(Color::Blue));
        board.set(7, 4, Cell::Filled(Color::Yellow));

        board.remove_rows(&[3, 5]);

        // Rows below every cleared row stay put
        assert_eq!(board.get(6, 3), Some(Cell::Filled(Color::Blue)));
        assert_eq!(board.get(7, 4), Some(Cell::Filled(Color::Yellow)));
        // Between the cleared rows: drops by one
        assert_eq!(board.get(5, 2), Some(Cell::Filled(Color::Green)));
        // Above both: drops by two
        assert_eq!(board.get(2, 1), Some(Cell::Filled(Color::Red)));
        assert_eq!(board.filled_count(), 4);
        assert!(board.rows().take(2).all(|row| row.iter().all(Cell::is_empty)));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut board = Board::new(4, 10);
        fill_row(&mut board, 2, Color::Magenta);
        board.reset();
        assert!(board.is_empty());
        assert_eq!(board.color_at(2, 0), EMPTY_COLOR);
    }
}
