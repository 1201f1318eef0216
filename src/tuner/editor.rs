//! Per-element editing of the feedback gain.
//!
//! The operator drives each gain with two independent controls: a magnitude
//! in dB and an invert switch. The sign is recorded per element so that a
//! magnitude edit never flips it, including after a zero gain was inverted.

use nalgebra as na;

use crate::config::TunerConfig;
use crate::control::model::StateSpaceModel;
use crate::error::{TunerError, TunerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sign {
    #[default]
    NonNegative,
    Negative,
}

impl Sign {
    /// Zero counts as non-negative.
    pub fn of(value: f64) -> Sign {
        if value < 0.0 {
            Sign::Negative
        } else {
            Sign::NonNegative
        }
    }

    pub fn from_inverted(inverted: bool) -> Sign {
        if inverted {
            Sign::Negative
        } else {
            Sign::NonNegative
        }
    }

    pub fn is_inverted(self) -> bool {
        self == Sign::Negative
    }

    fn apply(self, magnitude: f64) -> f64 {
        match self {
            Sign::NonNegative => magnitude.abs(),
            Sign::Negative => -magnitude.abs(),
        }
    }
}

pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

pub fn linear_to_db(value: f64) -> f64 {
    20.0 * value.abs().log10()
}

#[derive(Debug, Clone)]
pub struct FeedbackEditor {
    magnitude_range_db: f64,
    signs: na::DMatrix<Sign>,
}

impl FeedbackEditor {
    pub fn new(config: &TunerConfig, model: &StateSpaceModel) -> FeedbackEditor {
        let mut editor = FeedbackEditor {
            magnitude_range_db: config.magnitude_range_db,
            signs: na::DMatrix::from_element(model.n_inputs(), model.n_states(), Sign::default()),
        };
        editor.sync_signs(model);
        editor
    }

    pub fn magnitude_range_db(&self) -> f64 {
        self.magnitude_range_db
    }

    pub fn floor_db(&self) -> f64 {
        -self.magnitude_range_db
    }

    /// Re-reads every sign from the stored gains, after a wholesale replacement.
    pub fn sync_signs(&mut self, model: &StateSpaceModel) {
        self.signs = model.feedback_matrix().map(Sign::of);
    }

    pub fn sign(&self, model: &StateSpaceModel, row: usize, col: usize) -> TunerResult<Sign> {
        model.check_index(row, col)?;
        Ok(self.signs[(row, col)])
    }

    /// Writes `10^(db/20)` with the element's recorded sign. `db` is clamped
    /// to the configured range. Returns the stored gain.
    pub(crate) fn set_magnitude_db(
        &mut self,
        model: &mut StateSpaceModel,
        row: usize,
        col: usize,
        db: f64,
    ) -> TunerResult<f64> {
        model.check_index(row, col)?;
        if db.is_nan() {
            return Err(TunerError::InvalidValue("magnitude is NaN".to_string()));
        }

        let db = db.clamp(-self.magnitude_range_db, self.magnitude_range_db);
        let value = self.signs[(row, col)].apply(db_to_linear(db));
        model.set_feedback_element(row, col, value)?;

        log::debug!("F[{row}, {col}] <- {value:.6} ({db:.1} dB)");
        Ok(value)
    }

    /// Sets the sign, keeping the magnitude. Returns the stored gain.
    pub(crate) fn set_sign(
        &mut self,
        model: &mut StateSpaceModel,
        row: usize,
        col: usize,
        inverted: bool,
    ) -> TunerResult<f64> {
        let current = model.feedback_element(row, col)?;
        let sign = Sign::from_inverted(inverted);
        let value = sign.apply(current);
        model.set_feedback_element(row, col, value)?;
        self.signs[(row, col)] = sign;

        log::debug!("F[{row}, {col}] <- {value:.6} (inverted: {inverted})");
        Ok(value)
    }

    /// Magnitude of the stored gain in dB; a zero gain reports the floor.
    pub fn display_db(&self, model: &StateSpaceModel, row: usize, col: usize) -> TunerResult<f64> {
        let value = model.feedback_element(row, col)?;
        if value == 0.0 {
            return Ok(self.floor_db());
        }
        Ok(linear_to_db(value))
    }
}
