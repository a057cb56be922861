//! Simulation core of a tile-based action adventure, plus the terminal
//! front-end that drives it.

pub mod config;
pub mod domain;
pub mod sim;
pub mod ui;
