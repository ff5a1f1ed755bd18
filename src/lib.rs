//! Snake on a fixed grid: the game session and its rules, plus a crossterm
//! front end that plays it in a terminal.

pub mod apple;
pub mod config;
pub mod error;
pub mod game;
pub mod render;
pub mod session;
pub mod snake;
pub mod term;
