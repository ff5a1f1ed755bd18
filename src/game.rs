use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::render::PixelCanvas;
use crate::session::{GameSession, Phase, TickOutcome};
use crate::config::RESERVED_KEYS;
use crate::term::{key_name, Coords, TermInt, TermManager};

const INPUT_POLL_MS: u64 = 5;

/// Where the board sits on screen: one column and row in from the corner,
/// leaving room for the border.
const BOARD_ORIGIN: Coords = (1, 1);

/// What a key press asks the front end to do, besides steering.
enum Command {
    Quit,
    Toggle,
    Key(String),
    Ignore,
}

/// Terminal front end: owns the timer, the keyboard and the screen, and
/// drives a [`GameSession`].
pub struct SnakeGame {
    term: TermManager,
    session: GameSession<PixelCanvas>,
    board_size: Coords,
}

impl SnakeGame {
    pub fn new(config: GameConfig, seed: Option<u64>) -> Result<Self> {
        let (width, height) = (config.width, config.height);
        let (cols, rows) = config.grid_size();
        let cols = TermInt::try_from(cols).unwrap_or(TermInt::MAX);
        let rows = TermInt::try_from(rows).unwrap_or(TermInt::MAX);

        let mut session = match seed {
            Some(seed) => GameSession::with_seed(config, seed)?,
            None => GameSession::new(config)?,
        };
        session.attach(PixelCanvas::new(width, height))?;

        let term = TermManager::new()?;
        // Two characters per tile, a border on each side and a status line.
        let need = (cols.saturating_mul(2).saturating_add(2), rows.saturating_add(3));
        let have = term.get_terminal_size();
        if have.0 < need.0 || have.1 < need.1 {
            return Err(GameError::TerminalTooSmall { have, need });
        }

        Ok(SnakeGame { term, session, board_size: (cols, rows) })
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.term.setup()
    }

    /// Puts the terminal back the way it was.
    pub fn shutdown(&mut self) -> Result<()> {
        self.term.restore()
    }

    /// Shows the controls and waits for a key. Returns `false` to quit.
    pub fn show_intro(&mut self) -> Result<bool> {
        self.draw_board()?;
        let keys = &self.session.config().keys;
        let moves = format!("{} {} {} {} to move", keys.left, keys.up, keys.right, keys.down);
        let lines = [
            moves.as_str(),
            "Space or Esc to play/pause",
            "q or CTRL+C to quit",
            "",
            "Press any key to begin",
        ];

        self.term.show_message(&lines)?;
        let key = self.term.read_key_blocking()?;
        self.term.hide_message()?;
        Ok(!matches!(command(&key), Command::Quit))
    }

    /// Runs until the player quits.
    pub fn play(&mut self) -> Result<()> {
        let interval = self.session.config().tick_interval();
        info!(?interval, board = ?self.board_size, "starting");
        self.session.start();
        self.refresh()?;

        let mut next_tick = Instant::now() + interval;

        loop {
            for key_ev in self.term.read_key_events_queue(Duration::from_millis(INPUT_POLL_MS))? {
                match command(&key_ev) {
                    Command::Quit => return Ok(()),
                    Command::Toggle => {
                        self.session.toggle();
                        next_tick = Instant::now() + interval;
                        self.refresh()?;
                    }
                    Command::Key(name) => {
                        if !self.session.press_key(&name) {
                            debug!(key = %name, "unbound key");
                        }
                    }
                    Command::Ignore => {}
                }
            }

            if !self.session.is_playing() || Instant::now() < next_tick {
                continue;
            }
            next_tick = next_deadline(next_tick, Instant::now(), interval);

            let outcome = self.session.tick();
            self.present()?;
            if let TickOutcome::GameOver(_) = outcome {
                self.refresh()?;
            } else {
                self.draw_status()?;
            }
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn draw_board(&mut self) -> Result<()> {
        self.term.clear()?;
        let (cols, rows) = self.board_size;
        let bottom_right = (BOARD_ORIGIN.0 + cols * 2, BOARD_ORIGIN.1 + rows);
        self.term.draw_borders((0, 0), bottom_right)?;
        self.present()?;
        self.draw_status()
    }

    fn present(&mut self) -> Result<()> {
        let cell = self.session.config().cell;
        match self.session.surface() {
            Some(canvas) => self.term.present(canvas, cell, BOARD_ORIGIN),
            None => Ok(()),
        }
    }

    fn draw_status(&mut self) -> Result<()> {
        let hint = if self.session.is_playing() {"pause"} else {"play"};
        let status = format!("Score: {}   [space] {}   [q] quit", self.session.score(), hint);
        self.term.print_line(BOARD_ORIGIN.1 + self.board_size.1 + 1, &status)
    }

    /// Redraws the status line and the overlay matching the current phase.
    fn refresh(&mut self) -> Result<()> {
        self.draw_status()?;
        let score = format!("Score: {}", self.session.score());

        match self.session.phase() {
            Phase::Paused => self.term.show_message(&["Paused", "Space or Esc to resume", "or q to quit"]),
            Phase::GameOver(reason) => {
                let title = if reason.is_win() {"You won!"} else {"Game over!"};
                self.term.show_message(&[title, score.as_str(), "", "Space to play again,", "or q to quit."])
            }
            Phase::Playing | Phase::NotStarted => self.term.hide_message(),
        }
    }
}

/// Schedules the tick after the one due at `due`. A stalled loop skips the
/// missed ticks instead of running them back to back.
fn next_deadline(due: Instant, now: Instant, interval: Duration) -> Instant {
    due.max(now) + interval
}

fn command(ev: &KeyEvent) -> Command {
    if is_ctrl_c(ev) {
        return Command::Quit;
    }
    let Some(name) = key_name(ev.code) else {
        return Command::Ignore;
    };

    match name.as_str() {
        n if n == RESERVED_KEYS[0] => Command::Quit,
        n if RESERVED_KEYS[1..].contains(&n) => Command::Toggle,
        _ => Command::Key(name),
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_commands() {
        assert!(matches!(command(&key(KeyCode::Char('q'))), Command::Quit));
        assert!(matches!(
            command(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Command::Quit
        ));
        assert!(matches!(command(&key(KeyCode::Esc)), Command::Toggle));
        assert!(matches!(command(&key(KeyCode::Char(' '))), Command::Toggle));
        assert!(matches!(command(&key(KeyCode::Up)), Command::Key(k) if k == "ArrowUp"));
        assert!(matches!(command(&key(KeyCode::Char('c'))), Command::Key(k) if k == "c"));
        assert!(matches!(command(&key(KeyCode::F(5))), Command::Ignore));
    }

    #[test]
    fn test_next_deadline() {
        let start = Instant::now();
        let interval = Duration::from_millis(200);

        // On time: the next tick follows one interval later.
        assert_eq!(next_deadline(start, start, interval), start + interval);

        // Half a second late: no burst of catch-up ticks.
        let late = start + Duration::from_millis(500);
        let next = next_deadline(start, late, interval);
        assert_eq!(next, late + interval);
        assert!(next > late);
    }
}
