use std::default::Default;

use crate::error::{TunerError, TunerResult};

/// Settings consumed by the tuning core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunerConfig {
    /// Symmetric bound of the magnitude control, in dB.
    pub magnitude_range_db: f64,
    /// Sampling frequency in Hz. The control period is its reciprocal.
    pub sampling_frequency: f64,
}

impl Default for TunerConfig {
    fn default() -> TunerConfig {
        TunerConfig {
            magnitude_range_db: 36.0,
            sampling_frequency: 44_100.0,
        }
    }
}

impl TunerConfig {
    pub fn validate(&self) -> TunerResult<()> {
        if !(self.magnitude_range_db.is_finite() && self.magnitude_range_db > 0.0) {
            return Err(TunerError::InvalidValue(format!(
                "magnitude range must be positive, got {}",
                self.magnitude_range_db
            )));
        }
        if !(self.sampling_frequency.is_finite() && self.sampling_frequency > 0.0) {
            return Err(TunerError::InvalidValue(format!(
                "sampling frequency must be positive, got {}",
                self.sampling_frequency
            )));
        }
        Ok(())
    }

    /// Floor reported for a zero gain.
    pub fn floor_db(&self) -> f64 {
        -self.magnitude_range_db
    }
}
