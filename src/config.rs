use std::{collections::HashMap, fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::render::{Palette, Rgb};
use crate::snake::Direction;

/// Everything a session needs to know before it starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    pub cell: i32,
    /// Tick interval in milliseconds.
    pub speed_ms: u64,
    pub background: Rgb,
    pub foreground: Rgb,
    pub keys: KeyBindings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            cell: 20,
            speed_ms: 200,
            background: Rgb::new(0xb3, 0xbc, 0x2f),
            foreground: Rgb::new(0x35, 0x36, 0x0c),
            keys: KeyBindings::default(),
        }
    }
}

/// Keys the terminal front end keeps for itself: quit and play/pause.
pub const RESERVED_KEYS: [&str; 3] = ["q", " ", "Escape"];

/// Key names as reported by [`crate::term::key_name`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub left: String,
    pub up: String,
    pub right: String,
    pub down: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: "ArrowLeft".to_string(),
            up: "ArrowUp".to_string(),
            right: "ArrowRight".to_string(),
            down: "ArrowDown".to_string(),
        }
    }
}

impl KeyBindings {
    pub fn key_map(&self) -> KeyMap {
        let map = [
            (self.left.clone(), Direction::Left),
            (self.up.clone(), Direction::Up),
            (self.right.clone(), Direction::Right),
            (self.down.clone(), Direction::Down),
        ]
        .into_iter()
        .collect();
        KeyMap(map)
    }
}

/// Lookup from key name to direction.
#[derive(Clone, Debug, Default)]
pub struct KeyMap(HashMap<String, Direction>);

impl KeyMap {
    pub fn direction(&self, key: &str) -> Option<Direction> {
        self.0.get(key).copied()
    }
}

impl GameConfig {
    /// Reads a JSON config file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| GameError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig =
            serde_json::from_str(&text).map_err(|source| GameError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cell <= 0 {
            return Err(GameError::InvalidConfig(format!("cell size must be positive, got {}", self.cell)));
        }
        if self.width <= 0 || self.height <= 0 {
            return Err(GameError::InvalidConfig(format!(
                "surface must have a positive size, got {}x{}",
                self.width, self.height
            )));
        }
        if self.speed_ms == 0 {
            return Err(GameError::InvalidConfig("tick interval must be at least 1ms".to_string()));
        }

        let k = &self.keys;
        let keys = [&k.left, &k.up, &k.right, &k.down];
        for (i, key) in keys.iter().enumerate() {
            if key.is_empty() {
                return Err(GameError::InvalidConfig("key bindings must not be empty".to_string()));
            }
            if RESERVED_KEYS.contains(&key.as_str()) {
                return Err(GameError::InvalidConfig(format!("key {:?} is reserved for game controls", key)));
            }
            if keys[..i].contains(key) {
                return Err(GameError::InvalidConfig(format!("key {:?} is bound twice", key)));
            }
        }

        Ok(())
    }

    /// Applies a command-line tick interval on top of the file settings.
    pub fn with_speed(mut self, speed_ms: Option<u64>) -> Result<Self> {
        if let Some(speed) = speed_ms {
            self.speed_ms = speed;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.speed_ms)
    }

    pub fn palette(&self) -> Palette {
        Palette { background: self.background, foreground: self.foreground }
    }

    /// Number of grid columns and rows.
    pub fn grid_size(&self) -> (i32, i32) {
        (self.width / self.cell, self.height / self.cell)
    }
}
