use thiserror::Error;

/// Errors raised by the tuning core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TunerError {
    /// A matrix does not have the shape the state-space model requires.
    #[error("dimension mismatch for {what}: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// An element edit addressed a cell outside the feedback matrix.
    #[error("element ({row}, {col}) is outside the {rows}x{cols} feedback matrix")]
    IndexOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// The principal matrix logarithm of the closed loop is undefined.
    #[error("discrete to continuous transform undefined: {0}")]
    SingularTransform(String),

    /// Non-finite matrix entry, NaN magnitude or bad configuration value.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

pub type TunerResult<T> = Result<T, TunerError>;
