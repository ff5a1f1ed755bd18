//! The game session: snake, apple, score and phase, advanced one tick at a
//! time by whoever owns the timer.

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info, warn};

use crate::apple::place_apple;
use crate::config::{GameConfig, KeyMap};
use crate::error::{GameError, Result};
use crate::render::{render_frame, Surface};
use crate::snake::{hit_wall, reduce_direction, Cell, Direction, DirectionRequest, Snake};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameOverReason {
    HitWall,
    HitTail,
    MissingSurface,
    /// No free cell is left for an apple.
    BoardFull,
}

impl GameOverReason {
    pub fn is_win(self) -> bool {
        self == GameOverReason::BoardFull
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Playing,
    Paused,
    GameOver(GameOverReason),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session is not playing; nothing happened.
    Idle,
    Moved,
    Ate,
    GameOver(GameOverReason),
}

pub struct GameSession<S> {
    config: GameConfig,
    keys: KeyMap,
    surface: Option<S>,
    rng: StdRng,
    snake: Snake,
    direction: Direction,
    apple: Option<Cell>,
    score: u32,
    phase: Phase,
}

impl<S: Surface> GameSession<S> {
    /// Creates a session seeded from the OS.
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Result<Self> {
        config.validate()?;
        let snake = Snake::initial(config.cell, config.width, config.height)?;

        Ok(GameSession {
            keys: config.keys.key_map(),
            config,
            surface: None,
            rng,
            snake,
            direction: Direction::default(),
            apple: None,
            score: 0,
            phase: Phase::NotStarted,
        })
    }

    /// Hands the drawing surface to the session and paints the empty board.
    ///
    /// Walls and apple placement use the configured size, so the surface must
    /// match it.
    pub fn attach(&mut self, mut surface: S) -> Result<()> {
        let (w, h) = (surface.width(), surface.height());
        if (w, h) != (self.config.width, self.config.height) {
            return Err(GameError::SurfaceSize {
                have: (w, h),
                want: (self.config.width, self.config.height),
            });
        }
        surface.fill_rect(0, 0, w, h, self.config.background);
        self.surface = Some(surface);
        Ok(())
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn apple(&self) -> Option<Cell> {
        self.apple
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver(_))
    }

    /// Puts the apple on a given cell. Meant for scripted scenarios.
    pub fn set_apple(&mut self, apple: Option<Cell>) {
        self.apple = apple;
    }

    /// Replaces the snake. Meant for scripted scenarios.
    pub fn set_snake(&mut self, snake: Snake) {
        self.snake = snake;
    }

    pub fn start(&mut self) {
        match self.phase {
            Phase::Playing => {}
            Phase::GameOver(_) => self.restart(),
            Phase::NotStarted | Phase::Paused => {
                info!(score = self.score, "playing");
                self.phase = Phase::Playing;
            }
        }
    }

    pub fn pause(&mut self) {
        if self.phase == Phase::Playing {
            info!(score = self.score, "paused");
            self.phase = Phase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.start();
        }
    }

    /// Stops ticking, keeping the board as it is.
    pub fn stop(&mut self) {
        self.pause();
    }

    /// The play/pause control.
    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Resets snake, apple, score and direction, then starts playing.
    pub fn restart(&mut self) {
        // The config was validated at construction, so the layout still fits.
        if let Ok(snake) = Snake::initial(self.config.cell, self.config.width, self.config.height) {
            self.snake = snake;
        }
        self.direction = reduce_direction(self.direction, DirectionRequest::Reset);
        self.apple = None;
        self.score = 0;
        self.phase = Phase::Playing;
        info!("restarted");
    }

    pub fn steer(&mut self, request: DirectionRequest) {
        self.direction = reduce_direction(self.direction, request);
    }

    /// Feeds a raw key name through the key map. Unknown keys are ignored.
    pub fn press_key(&mut self, key: &str) -> bool {
        match self.keys.direction(key) {
            Some(direction) => {
                self.steer(direction.into());
                true
            }
            None => false,
        }
    }

    /// Advances the game by one step. Does nothing unless playing.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != Phase::Playing {
            return TickOutcome::Idle;
        }

        let GameConfig { cell, width, height, .. } = self.config;
        let palette = self.config.palette();

        if self.surface.is_none() {
            return self.game_over(GameOverReason::MissingSurface);
        }

        let mut moved = self.snake.advance(cell, self.direction);

        let apple = match self.apple {
            Some(apple) => apple,
            None => match place_apple(&moved, cell, width, height, &mut self.rng) {
                Some(apple) => apple,
                None => return self.game_over(GameOverReason::BoardFull),
            },
        };
        self.apple = Some(apple);

        if let Some(surface) = self.surface.as_mut() {
            render_frame(surface, &moved, Some(apple), &palette, cell);
        }

        if hit_wall(moved.head(), width, height) {
            return self.game_over(GameOverReason::HitWall);
        }
        if moved.hit_tail() {
            return self.game_over(GameOverReason::HitTail);
        }

        // The eaten apple sits under the old head, now the second cell. It is
        // appended and drops off again on the next move, so the snake ends up
        // one cell longer without ever covering its new head.
        let outcome = if self.snake.ate(apple) {
            moved.grow(apple);
            self.apple = None;
            self.score += 1;
            debug!(score = self.score, len = moved.len(), "ate apple");
            TickOutcome::Ate
        } else {
            TickOutcome::Moved
        };

        self.snake = moved;
        outcome
    }

    fn game_over(&mut self, reason: GameOverReason) -> TickOutcome {
        warn!(?reason, score = self.score, head = ?self.snake.head(), "game over");
        self.phase = Phase::GameOver(reason);
        TickOutcome::GameOver(reason)
    }
}
