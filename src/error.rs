//! Errors raised by the board and the simulation.
//!
//! All of them are precondition violations: the call that detects one fails
//! immediately and leaves the board untouched.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid board dimensions {rows}x{cols}: both must be positive")]
    InvalidDimension { rows: usize, cols: usize },

    #[error("invalid probability {0}: must lie strictly between 0 and 1")]
    InvalidProbability(f64),

    #[error("cell ({row}, {col}) is outside the {rows}x{cols} board")]
    IndexOutOfBounds {
        row: isize,
        col: isize,
        rows: usize,
        cols: usize,
    },

    #[error("malformed pattern: {0}")]
    MalformedPattern(String),
}

pub type Result<T> = std::result::Result<T, Error>;
