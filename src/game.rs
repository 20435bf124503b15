//! Core game state and logic

use crate::board::Board;
use crate::piece::Piece;
use crate::position::{MoveDirection, Position};
use crate::score::Score;
use crate::shape::{RotationDirection, Shape};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use ratatui::style::Color;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{debug, info};

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Lost,
}

/// Input actions the game can process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    RotateClockwise,
    RotateCounterClockwise,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("tile set must contain at least one shape")]
    EmptyTileSet,
}

/// Rows removed by one lock and the points they earned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineClear {
    /// Cleared row indices, top to bottom, as they were before collapsing
    pub rows: Vec<usize>,
    pub awarded: u64,
    /// The stack at lock time, full rows still in place
    pub before: Board,
}

/// Outcome of testing a one-step move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveCheck {
    Allowed,
    Blocked,
    /// A downward move hit the floor or the stack
    Landed,
}

/// One play session: board, active and next piece, score
pub struct Game {
    board: Board,
    tile_set: Vec<Shape>,
    rng: ChaCha8Rng,
    current_piece: Option<Piece>,
    next_piece: Option<Piece>,
    top_left: Position,
    score: Score,
    state: GameState,
    /// Set when the active piece has landed and must be locked before anything else moves
    pending_spawn: bool,
    queued: VecDeque<Action>,
    last_clear: Option<LineClear>,
}

impl Game {
    /// Create a new game with an entropy-seeded generator
    pub fn new(height: usize, width: usize, tile_set: Vec<Shape>) -> Result<Self, GameError> {
        Self::with_seed(height, width, tile_set, rand::random())
    }

    /// Create a new game whose piece and colour sequence is fixed by `seed`
    pub fn with_seed(
        height: usize,
        width: usize,
        tile_set: Vec<Shape>,
        seed: u64,
    ) -> Result<Self, GameError> {
        if tile_set.is_empty() {
            return Err(GameError::EmptyTileSet);
        }
        let board = Board::new(height, width);
        debug!(
            height = board.height(),
            width = board.width(),
            shapes = tile_set.len(),
            seed,
            "created game"
        );

        Ok(Self {
            board,
            tile_set,
            rng: ChaCha8Rng::seed_from_u64(seed),
            current_piece: None,
            next_piece: None,
            top_left: Position::default(),
            score: Score::new(),
            state: GameState::Lost,
            pending_spawn: false,
            queued: VecDeque::new(),
            last_clear: None,
        })
    }

    /// Begin a round: draw the next piece and spawn it.
    /// Ends up `Lost` right away if the first piece has no room.
    pub fn start(&mut self) -> GameState {
        self.current_piece = None;
        self.pending_spawn = false;
        self.next_piece = Some(self.draw_piece());

        self.state = if self.spawn() {
            GameState::Playing
        } else {
            info!(score = self.score.points, "no room for the first piece");
            GameState::Lost
        };
        self.state
    }

    /// Abort the round: zero the score, empty the grid and drop every piece reference
    pub fn restart(&mut self) {
        debug!(score = self.score.points, "restarting");
        self.board.reset();
        self.score.reset();
        self.current_piece = None;
        self.next_piece = None;
        self.top_left = Position::default();
        self.pending_spawn = false;
        self.queued.clear();
        self.last_clear = None;
        self.state = GameState::Lost;
    }

    /// Lock the active piece (if any), clear lines, and bring in the next piece.
    /// Returns false when the new piece overlaps the stack.
    pub fn spawn(&mut self) -> bool {
        if let Some(piece) = self.current_piece.take() {
            self.board.bake(&piece, self.top_left);
            debug!(row = self.top_left.row, col = self.top_left.col, "locked piece");
            self.last_clear = self.clear_lines();
        }
        self.queued.clear();
        self.pending_spawn = false;

        self.top_left = Position::new(0, self.board.width() as i32 / 2 - 2);
        let piece = match self.next_piece.take() {
            Some(piece) => piece,
            None => self.draw_piece(),
        };
        self.current_piece = Some(piece);
        self.next_piece = Some(self.draw_piece());

        let fits = self
            .current_piece
            .as_ref()
            .is_some_and(|piece| !self.overlaps(piece.orientation(), self.top_left));
        debug!(fits, col = self.top_left.col, "spawned piece");
        fits
    }

    /// Remove full rows, award points and compact the stack
    pub fn clear_lines(&mut self) -> Option<LineClear> {
        let rows = self.board.full_rows();
        if rows.is_empty() {
            return None;
        }

        let before = self.board.clone();
        let awarded = self.score.add_clear(rows.len());
        self.current_piece = None;
        self.board.remove_rows(&rows);
        debug!(?rows, awarded, total = self.score.points, "cleared lines");

        Some(LineClear {
            rows,
            awarded,
            before,
        })
    }

    /// Whether the active piece could move one step in `direction`
    pub fn can_move(&self, direction: MoveDirection) -> bool {
        self.check_move(direction) == MoveCheck::Allowed
    }

    /// Move the active piece one step. A blocked downward move raises the pending-spawn flag.
    pub fn move_piece(&mut self, direction: MoveDirection) -> bool {
        match self.check_move(direction) {
            MoveCheck::Allowed => {
                self.top_left = self.top_left.shifted(direction);
                true
            }
            MoveCheck::Landed => {
                self.pending_spawn = true;
                false
            }
            MoveCheck::Blocked => false,
        }
    }

    /// Floor first, then the stack, then the side walls
    fn check_move(&self, direction: MoveDirection) -> MoveCheck {
        let Some(piece) = &self.current_piece else {
            return MoveCheck::Blocked;
        };
        let candidate = self.top_left.shifted(direction);
        let shape = piece.orientation();
        let height = self.board.height() as i32;
        let width = self.board.width() as i32;

        if direction == MoveDirection::Down
            && shape
                .filled_cells()
                .any(|(i, j)| candidate.offset(i, j).0 >= height)
        {
            return MoveCheck::Landed;
        }

        if self.overlaps(shape, candidate) {
            return if direction == MoveDirection::Down {
                MoveCheck::Landed
            } else {
                MoveCheck::Blocked
            };
        }

        if shape.filled_cells().any(|(i, j)| {
            let col = candidate.offset(i, j).1;
            col < 0 || col >= width
        }) {
            return MoveCheck::Blocked;
        }

        MoveCheck::Allowed
    }

    /// Whether the active piece could turn in place. There are no wall or floor kicks.
    pub fn can_rotate(&self, direction: RotationDirection) -> bool {
        let Some(piece) = &self.current_piece else {
            return false;
        };
        self.rotation_fits(&piece.clone().rotate(direction, false))
    }

    fn rotation_fits(&self, trial: &Shape) -> bool {
        if self.overlaps(trial, self.top_left) {
            return false;
        }

        let height = self.board.height() as i32;
        let width = self.board.width() as i32;
        !trial.filled_cells().any(|(i, j)| {
            let (row, col) = self.top_left.offset(i, j);
            row >= height || col < 0 || col >= width
        })
    }

    /// Rotate the active piece if the turned shape fits where it is
    pub fn rotate(&mut self, direction: RotationDirection) -> bool {
        let Some(mut piece) = self.current_piece.take() else {
            return false;
        };
        let fits = self.rotation_fits(&piece.rotate(direction, false));
        if fits {
            piece.rotate(direction, true);
        }
        self.current_piece = Some(piece);
        fits
    }

    /// One gravity step: move down, and lock plus spawn if the piece landed
    pub fn step_gravity(&mut self) {
        if self.state != GameState::Playing {
            return;
        }
        self.move_piece(MoveDirection::Down);
        self.resolve_landing();
    }

    /// Consume the pending-spawn flag. A failed spawn ends the round.
    fn resolve_landing(&mut self) {
        if !self.take_pending_spawn() {
            return;
        }
        if !self.spawn() {
            self.state = GameState::Lost;
            info!(score = self.score.points, lines = self.score.lines, "game over");
        }
    }

    /// Process an action
    pub fn apply(&mut self, action: Action) {
        if self.state != GameState::Playing {
            return;
        }
        match action {
            Action::MoveLeft => {
                self.move_piece(MoveDirection::Left);
            }
            Action::MoveRight => {
                self.move_piece(MoveDirection::Right);
            }
            Action::SoftDrop => self.step_gravity(),
            Action::RotateClockwise => {
                self.rotate(RotationDirection::Clockwise);
            }
            Action::RotateCounterClockwise => {
                self.rotate(RotationDirection::CounterClockwise);
            }
        }
    }

    /// Buffer an action for the next `apply_queued`
    pub fn queue(&mut self, action: Action) {
        self.queued.push_back(action);
    }

    /// Apply buffered actions in order. A spawn part-way through drops the rest.
    pub fn apply_queued(&mut self) {
        while let Some(action) = self.queued.pop_front() {
            self.apply(action);
        }
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// Read and clear the pending-spawn flag
    pub fn take_pending_spawn(&mut self) -> bool {
        std::mem::take(&mut self.pending_spawn)
    }

    pub fn pending_spawn(&self) -> bool {
        self.pending_spawn
    }

    fn draw_piece(&mut self) -> Piece {
        let shape = self.tile_set[self.rng.gen_range(0..self.tile_set.len())];
        Piece::new(shape, &mut self.rng)
    }

    /// Whether any filled cell of `shape` at `top_left` sits on a locked block
    fn overlaps(&self, shape: &Shape, top_left: Position) -> bool {
        shape.filled_cells().any(|(i, j)| {
            let (row, col) = top_left.offset(i, j);
            self.board.is_occupied(row, col)
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn height(&self) -> usize {
        self.board.height()
    }

    pub fn width(&self) -> usize {
        self.board.width()
    }

    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        self.board.is_occupied(row, col)
    }

    pub fn color_at(&self, row: i32, col: i32) -> Color {
        self.board.color_at(row, col)
    }

    pub fn current_piece(&self) -> Option<&Piece> {
        self.current_piece.as_ref()
    }

    /// Origin of the active piece's 4x4 box
    pub fn top_left(&self) -> Position {
        self.top_left
    }

    pub fn next_piece(&self) -> Option<&Piece> {
        self.next_piece.as_ref()
    }

    /// Board coordinates of the active piece's blocks, including any outside the grid
    pub fn active_cells(&self) -> Vec<(i32, i32)> {
        match &self.current_piece {
            Some(piece) => piece
                .orientation()
                .filled_cells()
                .map(|(i, j)| self.top_left.offset(i, j))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_lost(&self) -> bool {
        self.state == GameState::Lost
    }

    /// Result of the line clear performed by the most recent lock
    pub fn last_clear(&self) -> Option<&LineClear> {
        self.last_clear.as_ref()
    }

    /// Hand over the most recent clear report, leaving none behind
    pub fn take_last_clear(&mut self) -> Option<LineClear> {
        self.last_clear.take()
    }
}
