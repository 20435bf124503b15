//! BLOCKFALL - terminal front end
//!
//! Wires settings, the tile set and the engine to a crossterm/ratatui terminal
//! and runs the gravity / input / difficulty clocks.

use anyhow::{Context, Result};
use blockfall::game::{Action, Game};
use blockfall::input::{Command, KeyMap};
use blockfall::pacing::{Pacing, PacingConfig};
use blockfall::settings::Settings;
use blockfall::tiles::{default_tile_set, load_tile_set};
use blockfall::ui::{self, ClearFlash};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{self, stdout},
    path::PathBuf,
    time::{Duration, Instant},
};

/// Upper bound on a single blocking wait so the ramp clock keeps ticking
const MAX_POLL: Duration = Duration::from_millis(100);

/// One erase stage of the line clear flash, 24 per second
const FLASH_STEP: Duration = Duration::from_nanos(1_000_000_000 / 24);

/// Get the blockfall temp directory, creating it if needed
fn blockfall_temp_dir() -> Result<PathBuf> {
    let dir = std::env::temp_dir().join("blockfall");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;
    Ok(dir)
}

fn main() -> Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    let log_dir = blockfall_temp_dir()?;
    let log_file = format!("{:08x}.log", session_id);

    // Setup tracing to log file
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("blockfall=debug".parse()?),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "BLOCKFALL starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let settings = Settings::load();

    let tile_set = match &settings.tile_file {
        Some(path) => load_tile_set(path)
            .with_context(|| format!("loading tile set from {}", path.display()))?,
        None => default_tile_set(),
    };

    let (height, width) = (settings.board.height, settings.board.width);
    let mut game = match settings.seed {
        Some(seed) => Game::with_seed(height, width, tile_set, seed),
        None => Game::new(height, width, tile_set),
    }
    .context("creating game")?;
    let keys = KeyMap::from_settings(&settings);

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run(&mut terminal, &mut game, &keys, settings.timing.clone());

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = settings.save() {
        tracing::warn!("Could not save settings: {:#}", anyhow::Error::new(e));
    }

    result?;
    println!("Final score: {}", game.score().points);
    tracing::info!(score = game.score().points, "BLOCKFALL shutting down");
    Ok(())
}

/// The driver loop: draw, collect keys, then run whichever clocks are due
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    game: &mut Game,
    keys: &KeyMap,
    timing: PacingConfig,
) -> Result<()> {
    let mut pacing = Pacing::new(timing, Instant::now());
    let mut flash: Option<(ClearFlash, Instant)> = None;
    game.start();

    loop {
        terminal.draw(|frame| {
            ui::render_game(frame, game, keys, flash.as_ref().map(|(flash, _)| flash))
        })?;

        let now = Instant::now();
        let timeout = match &flash {
            Some((_, stepped)) => FLASH_STEP.saturating_sub(now.duration_since(*stepped)),
            None => pacing.until_next_tick(now),
        }
        .min(MAX_POLL);
        if event::poll(timeout)? {
            // Drain everything that arrived while we waited
            loop {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        match keys.command(key) {
                            Some(Command::Quit) => return Ok(()),
                            Some(Command::Restart) if game.is_lost() => {
                                flash = None;
                                game.restart();
                                game.start();
                                pacing.reset(Instant::now());
                            }
                            Some(Command::Play(action)) if !game.is_lost() => {
                                if action == Action::SoftDrop {
                                    pacing.reset_fall(Instant::now());
                                }
                                game.queue(action);
                            }
                            _ => {}
                        }
                    }
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }

        let now = Instant::now();
        pacing.ramp(now, game.is_lost());

        // The engine holds still while cleared rows are being erased
        if let Some((current, stepped)) = &mut flash {
            if now.duration_since(*stepped) >= FLASH_STEP {
                if current.advance() {
                    *stepped = now;
                } else {
                    flash = None;
                    pacing.reset_fall(now);
                }
            }
            continue;
        }

        if pacing.input_due(now) {
            game.apply_queued();
        }
        if pacing.fall_due(now) {
            game.step_gravity();
        }
        if let Some(clear) = game.take_last_clear() {
            flash = Some((ClearFlash::new(clear), now));
        }
    }
}
