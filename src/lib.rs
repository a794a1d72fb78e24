pub mod config;
pub mod draw;
pub mod error;
pub mod grid;
pub mod proc;
pub mod prompt;

pub use error::{Error, Result};
pub use grid::Grid;
pub use proc::Simulation;
