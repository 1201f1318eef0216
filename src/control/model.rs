use nalgebra as na;

use crate::control::logm;
use crate::error::{TunerError, TunerResult};

/// A discrete-time plant `x[k+1] = A x[k] + B u[k]` identified at a given
/// sampling frequency.
pub trait DiscretePlant {
    fn get_mat_a(&self) -> &na::DMatrix<f64>;
    fn get_mat_b(&self) -> &na::DMatrix<f64>;
    fn get_sampling_frequency(&self) -> f64;
}

/// Plant plus the editable state-feedback gain `F`.
///
/// `A` is n x n, `B` is n x m and `F` is m x n. Only `F` changes after
/// construction and it never changes shape.
#[derive(Debug, Clone)]
pub struct StateSpaceModel {
    mat_a: na::DMatrix<f64>,
    mat_b: na::DMatrix<f64>,
    mat_f: na::DMatrix<f64>,
    sampling_frequency: f64,
}

fn ensure_finite(what: &str, mat: &na::DMatrix<f64>) -> TunerResult<()> {
    if let Some(v) = mat.iter().find(|v| !v.is_finite()) {
        return Err(TunerError::InvalidValue(format!(
            "{what} contains non-finite entry {v}"
        )));
    }
    Ok(())
}

impl StateSpaceModel {
    pub fn new(
        mat_a: na::DMatrix<f64>,
        mat_b: na::DMatrix<f64>,
        sampling_frequency: f64,
    ) -> TunerResult<StateSpaceModel> {
        let n = mat_a.nrows();
        if !mat_a.is_square() {
            return Err(TunerError::DimensionMismatch {
                what: "system matrix",
                expected: (n, n),
                found: mat_a.shape(),
            });
        }
        if mat_b.nrows() != n {
            return Err(TunerError::DimensionMismatch {
                what: "input matrix",
                expected: (n, mat_b.ncols()),
                found: mat_b.shape(),
            });
        }
        if !(sampling_frequency.is_finite() && sampling_frequency > 0.0) {
            return Err(TunerError::InvalidValue(format!(
                "sampling frequency must be positive, got {sampling_frequency}"
            )));
        }
        ensure_finite("system matrix", &mat_a)?;
        ensure_finite("input matrix", &mat_b)?;

        let mat_f = na::DMatrix::<f64>::zeros(mat_b.ncols(), n);

        Ok(StateSpaceModel {
            mat_a,
            mat_b,
            mat_f,
            sampling_frequency,
        })
    }

    pub fn from_plant(plant: &impl DiscretePlant) -> TunerResult<StateSpaceModel> {
        Self::new(
            plant.get_mat_a().clone(),
            plant.get_mat_b().clone(),
            plant.get_sampling_frequency(),
        )
    }

    pub fn n_states(&self) -> usize {
        self.mat_a.nrows()
    }

    pub fn n_inputs(&self) -> usize {
        self.mat_b.ncols()
    }

    pub fn system_matrix(&self) -> &na::DMatrix<f64> {
        &self.mat_a
    }

    pub fn input_matrix(&self) -> &na::DMatrix<f64> {
        &self.mat_b
    }

    pub fn feedback_matrix(&self) -> &na::DMatrix<f64> {
        &self.mat_f
    }

    pub fn sampling_frequency(&self) -> f64 {
        self.sampling_frequency
    }

    /// Control period `dt = 1 / sampling_frequency`.
    pub fn control_period(&self) -> f64 {
        1.0 / self.sampling_frequency
    }

    /// Replaces `F` wholesale. No recomputation happens here.
    pub fn set_feedback_matrix(&mut self, mat_f: na::DMatrix<f64>) -> TunerResult<()> {
        let expected = (self.n_inputs(), self.n_states());
        if mat_f.shape() != expected {
            return Err(TunerError::DimensionMismatch {
                what: "feedback matrix",
                expected,
                found: mat_f.shape(),
            });
        }
        ensure_finite("feedback matrix", &mat_f)?;

        self.mat_f = mat_f;
        Ok(())
    }

    pub fn check_index(&self, row: usize, col: usize) -> TunerResult<()> {
        let (rows, cols) = self.mat_f.shape();
        if row >= rows || col >= cols {
            return Err(TunerError::IndexOutOfRange {
                row,
                col,
                rows,
                cols,
            });
        }
        Ok(())
    }

    pub fn feedback_element(&self, row: usize, col: usize) -> TunerResult<f64> {
        self.check_index(row, col)?;
        Ok(self.mat_f[(row, col)])
    }

    pub(crate) fn set_feedback_element(
        &mut self,
        row: usize,
        col: usize,
        value: f64,
    ) -> TunerResult<()> {
        self.check_index(row, col)?;
        if !value.is_finite() {
            return Err(TunerError::InvalidValue(format!(
                "feedback gain must be finite, got {value}"
            )));
        }
        self.mat_f[(row, col)] = value;
        Ok(())
    }

    /// `A - B F`
    pub fn discrete_closed_loop(&self) -> na::DMatrix<f64> {
        &self.mat_a - &self.mat_b * &self.mat_f
    }

    /// `logm(A - B F) / dt`
    pub fn continuous_closed_loop(&self) -> TunerResult<na::DMatrix<f64>> {
        let discrete = self.discrete_closed_loop();
        let log = logm::logm(&discrete)?;
        Ok(log.unscale(self.control_period()))
    }

    /// Eigenvalues of the continuous closed loop. Order is not sorted.
    pub fn eigenvalues(&self) -> TunerResult<Vec<na::Complex<f64>>> {
        let continuous = self.continuous_closed_loop()?;
        logm::eigenvalues(&continuous)
    }
}
