//! Interactive tuning of a discrete-time state-feedback gain.
//!
//! A [`control::model::StateSpaceModel`] holds the plant `(A, B)` and the
//! gain `F`. A [`tuner::session::TuningSession`] edits `F` one element at a
//! time (magnitude in dB plus an invert switch) and, after every edit,
//! converts `A - B F` to continuous time with the matrix logarithm and
//! classifies stability from its eigenvalues.

pub mod config;
pub mod control;
pub mod error;
pub mod plot;
pub mod tuner;

pub use config::TunerConfig;
pub use error::{TunerError, TunerResult};
