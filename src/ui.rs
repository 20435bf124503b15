//! Terminal UI rendering with ratatui

use crate::board::Cell;
use crate::game::{Game, LineClear};
use crate::input::KeyMap;
use crate::piece::Piece;
use crate::shape::SHAPE_SIZE;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const BLOCK: &str = "██";
const EMPTY: &str = "  ";

/// Width of the side panel holding the preview, score and controls
const PANEL_WIDTH: u16 = 24;

/// Staged erase of the rows removed by one clear, drawn over the stack as it
/// was at lock time. On odd widths the middle column goes first, then one
/// column pair per stage working outwards.
#[derive(Debug, Clone)]
pub struct ClearFlash {
    clear: LineClear,
    stage: usize,
}

impl ClearFlash {
    pub fn new(clear: LineClear) -> Self {
        Self { clear, stage: 0 }
    }

    /// Pair stages needed to erase a whole row
    pub fn stages(&self) -> usize {
        self.clear.before.width() / 2
    }

    pub fn stage(&self) -> usize {
        self.stage
    }

    /// Erase the next column pair. Returns false once nothing is left to erase.
    pub fn advance(&mut self) -> bool {
        if self.stage < self.stages() {
            self.stage += 1;
            true
        } else {
            false
        }
    }

    /// Whether the cleared cell at (row, col) is already gone
    pub fn is_erased(&self, row: usize, col: usize) -> bool {
        if !self.clear.rows.contains(&row) {
            return false;
        }
        let width = self.clear.before.width();
        let half = width / 2;
        if col < half {
            half - col <= self.stage
        } else if col >= width - half {
            col + 1 - (width - half) <= self.stage
        } else {
            true
        }
    }

    fn cell(&self, row: usize, col: usize) -> Cell {
        if self.is_erased(row, col) {
            return Cell::Empty;
        }
        self.clear
            .before
            .get(row as i32, col as i32)
            .unwrap_or_default()
    }
}

/// Render the entire game UI, with the clear flash standing in for the board while it runs
pub fn render_game(frame: &mut Frame, game: &Game, keys: &KeyMap, flash: Option<&ClearFlash>) {
    let area = frame.area();

    // Oversized boards are cropped to whatever fits beside the panel
    let board_width = u16::try_from(game.width())
        .unwrap_or(u16::MAX)
        .saturating_mul(2)
        .saturating_add(2)
        .min(area.width.saturating_sub(PANEL_WIDTH));
    let board_height = u16::try_from(game.height())
        .unwrap_or(u16::MAX)
        .saturating_add(2)
        .min(area.height);
    let game_area = center_rect(
        area,
        board_width.saturating_add(PANEL_WIDTH),
        board_height.max(18),
    );

    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(board_width), Constraint::Length(PANEL_WIDTH)])
        .split(game_area);

    render_board(frame, main_layout[0], game, flash);

    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(SHAPE_SIZE as u16 + 2), // Next piece
            Constraint::Length(4),                     // Score
            Constraint::Min(7),                        // Controls
        ])
        .split(main_layout[1]);

    render_next(frame, right_layout[0], game.next_piece());
    render_stats(frame, right_layout[1], game);
    render_controls(frame, right_layout[2], keys);

    if game.is_lost() {
        let restart = keys
            .describe()
            .into_iter()
            .find(|(label, _)| *label == "Restart")
            .map(|(_, key)| key)
            .unwrap_or_default();
        render_overlay(frame, main_layout[0], "GAME ENDED", &format!("Restart: {}", restart));
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the playfield with the active piece drawn over the locked cells.
/// During a clear flash the pre-clear stack is shown instead and the new piece is hidden.
fn render_board(frame: &mut Frame, area: Rect, game: &Game, flash: Option<&ClearFlash>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (active, active_color) = match flash {
        Some(_) => (Vec::new(), None),
        None => (game.active_cells(), game.current_piece().map(Piece::color)),
    };

    let rows = game.height().min(inner.height as usize);
    let cols = game.width().min(inner.width as usize / 2);

    let lines: Vec<Line> = (0..rows)
        .map(|row| {
            let spans: Vec<Span> = (0..cols)
                .map(|col| {
                    let (r, c) = (row as i32, col as i32);
                    let cell = match flash {
                        Some(flash) => flash.cell(row, col),
                        None => game.board().get(r, c).unwrap_or_default(),
                    };
                    if let Some(color) = active_color.filter(|_| active.contains(&(r, c))) {
                        Span::styled(BLOCK, Style::default().fg(color))
                    } else if let Cell::Filled(color) = cell {
                        Span::styled(BLOCK, Style::default().fg(color))
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the next piece preview in its authored 4x4 box
fn render_next(frame: &mut Frame, area: Rect, next: Option<&Piece>) {
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(piece) = next else {
        return;
    };

    let lines: Vec<Line> = piece
        .orientation()
        .rows()
        .iter()
        .map(|cells| {
            let spans: Vec<Span> = cells
                .iter()
                .map(|&filled| {
                    if filled {
                        Span::styled(BLOCK, Style::default().fg(piece.color()))
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

/// Render the score panel
fn render_stats(frame: &mut Frame, area: Rect, game: &Game) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let score = game.score();
    let lines = vec![
        Line::from(vec![
            Span::styled("SCORE ", Style::default().fg(Color::Gray)),
            Span::styled(format!("{:07}", score.points), Style::default().fg(Color::Yellow).bold()),
        ]),
        Line::from(vec![
            Span::styled("LINES ", Style::default().fg(Color::Gray)),
            Span::styled(format!("{}", score.lines), Style::default().fg(Color::Cyan)),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the key reference
fn render_controls(frame: &mut Frame, area: Rect, keys: &KeyMap) {
    let block = Block::default()
        .title(" CONTROLS ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = keys
        .describe()
        .into_iter()
        .map(|(label, key)| {
            Line::from(vec![
                Span::styled(format!("{:<8}", label), Style::default().fg(Color::Gray)),
                Span::styled(key, Style::default().fg(Color::White)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render a centered message box over `area`
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let overlay_area = center_rect(area, 20, 5);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let text = vec![
        Line::styled(title.to_string(), Style::default().fg(Color::Red).bold()),
        Line::raw(""),
        Line::styled(subtitle.to_string(), Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, overlay_area);
}
