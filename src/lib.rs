//! BLOCKFALL - a falling-block puzzle engine
//!
//! The engine (`shape`, `piece`, `position`, `board`, `score`, `game`) performs no
//! I/O and owns no global state; any number of sessions can run side by side.
//! The remaining modules are the terminal front end built on top of it.

pub mod board;
pub mod game;
pub mod input;
pub mod pacing;
pub mod piece;
pub mod position;
pub mod score;
pub mod settings;
pub mod shape;
pub mod tiles;
pub mod ui;

pub use board::{Board, Cell};
pub use game::{Action, Game, GameError, GameState, LineClear};
pub use piece::{Piece, EMPTY_COLOR, PIECE_COLORS};
pub use position::{MoveDirection, Position};
pub use score::Score;
pub use shape::{RotationDirection, Shape, ShapeError};
