use std::time::Duration;

use crossterm::style::Color;

use crate::error::{Error, Result};

pub const DEFAULT_SIZE: usize = 30;
pub const DEFAULT_DENSITY: f64 = 0.25;
pub const DEFAULT_TICK: Duration = Duration::from_millis(200);

/// Everything the terminal driver needs to set up a run.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub rows: usize,
    pub cols: usize,
    pub on_torus: bool,
    /// Chance of each cell starting alive when the board is randomized.
    pub density: f64,
    pub tick: Duration,
    pub alive_color: Color,
    pub dead_color: Color,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            rows: DEFAULT_SIZE,
            cols: DEFAULT_SIZE,
            on_torus: false,
            density: DEFAULT_DENSITY,
            tick: DEFAULT_TICK,
            alive_color: Color::Black,
            dead_color: Color::White,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(Error::InvalidDimension {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if !(self.density > 0.0 && self.density < 1.0) {
            return Err(Error::InvalidProbability(self.density));
        }
        Ok(())
    }

    /// Width and height of the drawing surface in terminal cells: two columns
    /// per board cell plus one status line.
    pub fn surface_size(&self) -> (u16, u16) {
        let w = (self.cols * 2).min(u16::MAX as usize) as u16;
        let h = (self.rows + 1).min(u16::MAX as usize) as u16;
        (w, h)
    }
}
