use nalgebra as na;

use crate::control::model::StateSpaceModel;
use crate::error::{TunerError, TunerResult};

/// Propagates `x[k+1] = (A - B F) x[k] + B u[k]` over the columns of `mat_u`.
///
/// Returns the n x (T + 1) state trajectory, starting with `x0`.
pub fn simulate_closed_loop(
    model: &StateSpaceModel,
    mat_u: &na::DMatrix<f64>,
    x0: &na::DVector<f64>,
) -> TunerResult<na::DMatrix<f64>> {
    let n_state = model.n_states();
    if mat_u.nrows() != model.n_inputs() {
        return Err(TunerError::DimensionMismatch {
            what: "input sequence",
            expected: (model.n_inputs(), mat_u.ncols()),
            found: mat_u.shape(),
        });
    }
    if x0.len() != n_state {
        return Err(TunerError::DimensionMismatch {
            what: "initial state",
            expected: (n_state, 1),
            found: (x0.len(), 1),
        });
    }

    let sim_time = mat_u.ncols();
    let mat_acl = model.discrete_closed_loop();
    let mat_b = model.input_matrix();

    let mut mat_x = na::DMatrix::<f64>::zeros(n_state, sim_time + 1);
    mat_x.column_mut(0).copy_from(x0);
    for i in 0..sim_time {
        let x_k = mat_x.column(i).into_owned();
        mat_x
            .column_mut(i + 1)
            .copy_from(&(&mat_acl * x_k + mat_b * mat_u.column(i)));
    }

    Ok(mat_x)
}

/// Response of one state to a constant input of `amplitude` on every channel.
pub fn compute_step_response(
    model: &StateSpaceModel,
    n_samples: usize,
    amplitude: f64,
    state: usize,
) -> TunerResult<Vec<f64>> {
    if state >= model.n_states() {
        return Err(TunerError::IndexOutOfRange {
            row: state,
            col: 0,
            rows: model.n_states(),
            cols: 1,
        });
    }
    let input = na::DMatrix::from_element(model.n_inputs(), n_samples, amplitude);
    let x0 = na::DVector::<f64>::zeros(model.n_states());

    let mat_x = simulate_closed_loop(model, &input, &x0)?;

    Ok(mat_x.row(state).iter().cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn open_loop_integrator_accumulates_input() {
        let model = StateSpaceModel::new(na::dmatrix![1.0], na::dmatrix![1.0], 1.0).unwrap();
        let response = compute_step_response(&model, 4, 2.0, 0).unwrap();
        assert_eq!(response, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn feedback_settles_integrator() {
        let mut model =
            StateSpaceModel::new(na::dmatrix![1.0], na::dmatrix![1.0], 1.0).unwrap();
        // x[k+1] = 0.5 x[k] + u, fixed point 2u
        model.set_feedback_matrix(na::dmatrix![0.5]).unwrap();
        let response = compute_step_response(&model, 60, 1.0, 0).unwrap();
        assert_relative_eq!(*response.last().unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn rejects_mismatched_input() {
        let model = StateSpaceModel::new(na::dmatrix![1.0], na::dmatrix![1.0], 1.0).unwrap();
        let input = na::DMatrix::<f64>::zeros(2, 3);
        let x0 = na::DVector::<f64>::zeros(1);
        assert!(matches!(
            simulate_closed_loop(&model, &input, &x0),
            Err(TunerError::DimensionMismatch { .. })
        ));
        assert!(compute_step_response(&model, 3, 1.0, 1).is_err());
    }
}
