mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use dig_survive::compute::{init_state, step, SimulationClock};
use dig_survive::config::{Config, ConfigError};
use dig_survive::constants::FRAME_TIME_MS;
use dig_survive::entities::{GameEvent, GameState, GameStatus, InputIntent};

const FRAME: Duration = Duration::from_millis(FRAME_TIME_MS);

/// How long a reached achievement stays in the HUD.
const ACHIEVEMENT_BANNER_MS: u64 = 3000;

#[derive(Debug, Error)]
enum AppError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot open log file {}: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ── Held-key tracking ─────────────────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many milliseconds. Covers terminals that don't emit key-release
/// events: OS key-repeat runs at ≥ 15 Hz, so the window is refreshed before
/// it expires while the key is down.
const HOLD_WINDOW_MS: u64 = 130;

const LEFT_KEYS: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT_KEYS: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const JUMP_KEYS: &[KeyCode] = &[
    KeyCode::Up,
    KeyCode::Char('w'),
    KeyCode::Char('W'),
    KeyCode::Char(' '),
];
const DIG_KEYS: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];

#[derive(Default)]
struct KeyTracker {
    /// Wall time each key was last seen (press or repeat).
    seen_at: HashMap<KeyCode, u64>,
    left_pressed_at: u64,
    right_pressed_at: u64,
    pause_requested: bool,
}

impl KeyTracker {
    fn press(&mut self, code: KeyCode, now: u64, repeat: bool) {
        self.seen_at.insert(code, now);
        if repeat {
            return;
        }
        if LEFT_KEYS.contains(&code) {
            self.left_pressed_at = now;
        } else if RIGHT_KEYS.contains(&code) {
            self.right_pressed_at = now;
        } else if matches!(code, KeyCode::Char('p') | KeyCode::Char('P')) {
            self.pause_requested = true;
        }
    }

    fn release(&mut self, code: KeyCode) {
        self.seen_at.remove(&code);
    }

    fn any_held(&self, keys: &[KeyCode], now: u64) -> bool {
        keys.iter().any(|key| {
            self.seen_at
                .get(key)
                .map_or(false, |&at| now.saturating_sub(at) <= HOLD_WINDOW_MS)
        })
    }

    /// Snapshot for this frame. The pause request is consumed.
    fn intent(&mut self, now: u64) -> InputIntent {
        InputIntent {
            move_left: self.any_held(LEFT_KEYS, now),
            move_right: self.any_held(RIGHT_KEYS, now),
            jump: self.any_held(JUMP_KEYS, now),
            dig: self.any_held(DIG_KEYS, now),
            pause: std::mem::take(&mut self.pause_requested),
            left_pressed_at: self.left_pressed_at,
            right_pressed_at: self.right_pressed_at,
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum LoopExit {
    Quit,
    Restart,
}

/// Works on two classes of terminal:
/// * **Keyboard-enhancement capable** (kitty protocol): proper `Press` /
///   `Repeat` / `Release` events, so keys drop out on release.
/// * **Classic terminals**: only `Press` events. Keys expire after
///   `HOLD_WINDOW_MS` of silence.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    rx: &mpsc::Receiver<Event>,
    rng: &mut ChaCha8Rng,
) -> Result<LoopExit, AppError> {
    let started = Instant::now();
    let mut clock = SimulationClock::new();
    let mut keys = KeyTracker::default();
    let mut banner: Option<(&'static str, u64)> = None;

    loop {
        let frame_start = Instant::now();
        let wall_ms = started.elapsed().as_millis() as u64;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = ev
            else {
                continue;
            };
            match kind {
                KeyEventKind::Press => match code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                        return Ok(LoopExit::Quit);
                    }
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(LoopExit::Quit);
                    }
                    KeyCode::Char('r') | KeyCode::Char('R')
                        if state.status == GameStatus::GameOver =>
                    {
                        return Ok(LoopExit::Restart);
                    }
                    _ => keys.press(code, wall_ms, false),
                },
                KeyEventKind::Repeat => keys.press(code, wall_ms, true),
                KeyEventKind::Release => keys.release(code),
            }
        }

        let intent = keys.intent(wall_ms);
        for event in step(state, &mut clock, &intent, wall_ms, rng) {
            if let GameEvent::AchievementReached { id } = event {
                banner = Some((id, clock.sim_time()));
            }
            log_event(&event);
        }

        let shown = banner
            .filter(|&(_, at)| clock.sim_time().saturating_sub(at) < ACHIEVEMENT_BANNER_MS)
            .and_then(|(id, _)| state.achievements.get(id));
        display::render(out, state, shown)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

/// Stand-in for the audio collaborator: every event goes to the log.
fn log_event(event: &GameEvent) {
    match event {
        GameEvent::MissileImpact { x, y, destroyed } => {
            debug!(x, y, destroyed = destroyed.len(), "event: missile impact")
        }
        GameEvent::LevelComplete { .. } | GameEvent::PlayerDied | GameEvent::GameOver => {
            info!(?event, "event")
        }
        other => debug!(event = ?other, "event"),
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_logging(path: Option<&Path>) -> Result<(), AppError> {
    // The terminal is in raw mode, so logs only ever go to a file.
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).map_err(|source| AppError::LogFile {
        path: path.to_path_buf(),
        source,
    })?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<(), AppError> {
    let config = Config::parse();
    config.validate()?;
    init_logging(config.log_file.as_deref())?;

    let (cols, rows) = terminal::size()?;
    let (width, height) = config.world_size(cols, rows)?;

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, &config, width, height);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: &Config,
    width: usize,
    height: usize,
) -> Result<(), AppError> {
    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    info!(width, height, seed = ?config.seed, start_level = config.start_level, "starting");

    loop {
        let mut state = init_state(width, height, config.start_level, &mut rng);
        match game_loop(out, &mut state, rx, &mut rng)? {
            LoopExit::Quit => break,
            LoopExit::Restart => info!(score = state.score, "restarting"),
        }
    }
    Ok(())
}
