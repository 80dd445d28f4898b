mod render;

use std::fs::File;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ghost_chase::constants::{DEFAULT_GRID_H, DEFAULT_GRID_W, STARTING_LIVES};
use ghost_chase::rng;
use ghost_chase::{Direction, GameEvent, Session, SessionConfig, StdRandom};

use crate::render::Renderer;

/// One simulation frame at roughly 60 Hz.
const DEFAULT_TICK_MS: u64 = 16;
const DEFAULT_RENDER_FPS: u64 = 120;
/// Headless walker picks a new heading this often.
const WALKER_TURN_TICKS: u64 = 16;

#[derive(Debug, Parser)]
#[command(name = "ghost-chase", version, about = "Maze chase in the terminal")]
struct Cli {
    /// Maze width in cells.
    #[arg(long, env = "GHOST_CHASE_WIDTH", default_value_t = DEFAULT_GRID_W)]
    width: usize,

    /// Maze height in cells.
    #[arg(long, env = "GHOST_CHASE_HEIGHT", default_value_t = DEFAULT_GRID_H)]
    height: usize,

    /// Milliseconds per simulation tick.
    #[arg(
        long,
        env = "GHOST_CHASE_TICK_MS",
        default_value_t = DEFAULT_TICK_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    tick_ms: u64,

    /// Redraw rate.
    #[arg(
        long,
        env = "GHOST_CHASE_FPS",
        default_value_t = DEFAULT_RENDER_FPS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    fps: u64,

    /// Seed for maze generation and ghost decisions.
    #[arg(long, env = "GHOST_CHASE_SEED")]
    seed: Option<u64>,

    #[arg(long, env = "GHOST_CHASE_LIVES", default_value_t = STARTING_LIVES)]
    lives: u32,

    /// Write tracing output to this file. Nothing is logged otherwise.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Run this many ticks without a terminal and print a summary.
    #[arg(long, value_name = "TICKS")]
    headless: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let config = SessionConfig {
        width: cli.width,
        height: cli.height,
        starting_lives: cli.lives,
        ..SessionConfig::default()
    };
    let rng = match cli.seed {
        Some(seed) => StdRandom::seeded(seed),
        None => StdRandom::from_entropy(),
    };
    let mut session = Session::new(config, rng).context("could not start a session")?;

    if let Some(ticks) = cli.headless {
        return run_headless(&mut session, ticks, cli.seed);
    }

    let mut stdout = io::stdout();
    let _terminal = TerminalGuard::enter(&mut stdout)?;
    run(&mut stdout, &mut session, &cli)
}

/// Holds raw mode and the alternate screen; dropping it puts the terminal back.
struct TerminalGuard;

impl TerminalGuard {
    fn enter(stdout: &mut Stdout) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = TerminalGuard;
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(Hide)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = stdout.execute(Show);
        let _ = stdout.execute(LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn init_tracing(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(stdout: &mut Stdout, session: &mut Session, cli: &Cli) -> Result<()> {
    let mut renderer = Renderer::new(session.maze().width(), session.maze().height());
    let tick_time = Duration::from_millis(cli.tick_ms);
    let frame_time = Duration::from_micros(1_000_000 / cli.fps);
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char(' ') => session.toggle_pause(),
                KeyCode::Char('r') if !session.is_active() => {
                    session.restart();
                    renderer.set_status("");
                    renderer.invalidate();
                }
                code => {
                    if let Some(dir) = direction_for(code) {
                        session.queue_direction(dir);
                    }
                }
            }
        }

        if session.is_active() && last_tick.elapsed() >= tick_time {
            last_tick = Instant::now();
            for event in session.tick() {
                if let Some(status) = status_for(&event) {
                    renderer.set_status(status);
                }
            }
        }

        let snapshot = session.snapshot();
        renderer.draw(stdout, session.maze(), &snapshot)?;
        if !snapshot.active {
            renderer.draw_game_over(stdout, &snapshot)?;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(Direction::Right),
        _ => None,
    }
}

fn status_for(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::PowerActivated { .. } => Some("Power up!".to_string()),
        GameEvent::GhostEaten { kind, points, .. } => {
            Some(format!("{} eaten +{}", kind.name(), points))
        }
        GameEvent::PlayerDied { lives_left } if *lives_left > 0 => Some("Caught!".to_string()),
        GameEvent::LevelAdvanced { level } => Some(format!("Level {}!", level)),
        _ => None,
    }
}

/// Drives the session with a random walker instead of the keyboard.
fn run_headless(session: &mut Session, ticks: u64, seed: Option<u64>) -> Result<()> {
    let mut walker = match seed {
        Some(seed) => StdRandom::seeded(seed.wrapping_add(1)),
        None => StdRandom::from_entropy(),
    };
    let mut deaths = 0u32;
    for _ in 0..ticks {
        if !session.is_active() {
            break;
        }
        if session.frame() % WALKER_TURN_TICKS == 0 {
            if let Some(dir) = rng::choose(&mut walker, &Direction::MOVES) {
                session.queue_direction(dir);
            }
        }
        deaths += session
            .tick()
            .iter()
            .filter(|event| matches!(event, GameEvent::PlayerDied { .. }))
            .count() as u32;
    }

    let summary = session.summary();
    info!(score = summary.score, level = summary.level, frames = summary.frames, "headless run finished");
    println!(
        "score={} level={} lives={} deaths={} frames={} active={}",
        summary.score,
        summary.level,
        session.lives(),
        deaths,
        summary.frames,
        session.is_active()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restoring_without_a_terminal_is_quiet() {
        // No tty under the test harness, so every restore step fails and is ignored.
        drop(TerminalGuard);
    }

    #[test]
    fn keys_map_to_directions() {
        assert_eq!(direction_for(KeyCode::Char('k')), Some(Direction::Up));
        assert_eq!(direction_for(KeyCode::Left), Some(Direction::Left));
        assert_eq!(direction_for(KeyCode::Char('q')), None);
    }

    #[test]
    fn cli_flags_parse() {
        let cli = Cli::try_parse_from(["ghost-chase", "--width", "21", "--headless", "50"]).unwrap();
        assert_eq!(cli.width, 21);
        assert_eq!(cli.headless, Some(50));
        assert!(Cli::try_parse_from(["ghost-chase", "--tick-ms", "0"]).is_err());
    }
}
