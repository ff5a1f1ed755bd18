use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures that prevent a game session from starting.
///
/// Collisions are not errors: they end the session through
/// [`Phase::GameOver`](crate::session::Phase::GameOver).
#[derive(Debug, Error)]
pub enum GameError {
    #[error("not enough room to place the initial snake on a {width}x{height} surface with {cell}px cells")]
    NoRoomForSnake { width: i32, height: i32, cell: i32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not read config file {path}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not parse config file {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("drawing surface is {have:?} but the board is configured as {want:?}")]
    SurfaceSize { have: (i32, i32), want: (i32, i32) },

    #[error("terminal is {have:?} but the board needs at least {need:?}")]
    TerminalTooSmall { have: (u16, u16), need: (u16, u16) },

    #[error("terminal error")]
    Terminal(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
