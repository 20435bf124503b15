//! The active falling piece: canonical shape, live orientation and colour

use crate::shape::{RotationDirection, Shape};
use rand::Rng;
use ratatui::style::Color;

/// Colour of an empty board cell. Never assigned to a piece.
pub const EMPTY_COLOR: Color = Color::Black;

/// Colours a piece may be drawn in, all equally likely
pub const PIECE_COLORS: [Color; 14] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::Gray,
    Color::DarkGray,
    Color::LightRed,
    Color::LightGreen,
    Color::LightYellow,
    Color::LightBlue,
    Color::LightMagenta,
    Color::LightCyan,
];

/// A piece instance. Colour is rolled once at construction and kept for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    original: Shape,
    orientation: Shape,
    color: Color,
}

impl Piece {
    /// Create a piece from its canonical shape with a random palette colour
    pub fn new<R: Rng>(shape: Shape, rng: &mut R) -> Self {
        let color = PIECE_COLORS[rng.gen_range(0..PIECE_COLORS.len())];
        Self::with_color(shape, color)
    }

    pub fn with_color(shape: Shape, color: Color) -> Self {
        Self {
            original: shape,
            orientation: shape,
            color,
        }
    }

    /// The shape as authored
    pub fn original(&self) -> &Shape {
        &self.original
    }

    /// The current rotated shape
    pub fn orientation(&self) -> &Shape {
        &self.orientation
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Rotate the current orientation a quarter turn.
    ///
    /// With `commit` the stored orientation is updated and returned. Without it a
    /// trial copy is rotated and returned, leaving the piece untouched.
    pub fn rotate(&mut self, direction: RotationDirection, commit: bool) -> Shape {
        if commit {
            self.orientation.rotate_in_place(direction);
            self.orientation
        } else {
            self.orientation.rotated(direction)
        }
    }
}
