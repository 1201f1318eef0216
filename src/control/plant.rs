pub mod dc_motor {
    use nalgebra as na;
    use std::default::Default;

    use crate::control::model::DiscretePlant;
    use crate::error::{TunerError, TunerResult};

    pub struct Parameters {
        pub b: f64,
        pub j: f64,
        pub k: f64,
        pub l: f64,
        pub r: f64,
    }

    impl Default for Parameters {
        fn default() -> Parameters {
            Parameters {
                b: 0.1,
                j: 0.01,
                k: 0.01,
                l: 0.5,
                r: 1.0,
            }
        }
    }

    /// DC motor (speed, current) discretized with backward Euler.
    #[derive(Clone, Debug)]
    pub struct Model {
        mat_a: na::DMatrix<f64>,
        mat_b: na::DMatrix<f64>,
        sampling_frequency: f64,
    }

    impl Model {
        pub fn new(params: Parameters, sampling_frequency: f64) -> TunerResult<Model> {
            if !(sampling_frequency.is_finite() && sampling_frequency > 0.0) {
                return Err(TunerError::InvalidValue(format!(
                    "sampling frequency must be positive, got {sampling_frequency}"
                )));
            }
            let sampling_dt = 1.0 / sampling_frequency;

            // Define the continuous-time system matrices
            let mat_ac = na::dmatrix![
                -params.b / params.j, params.k / params.j;
                -params.k / params.l, -params.r / params.l;
            ];
            let mat_bc = na::dmatrix![0.0; 1.0 / params.l];

            // Model discretization
            let mat_i = na::DMatrix::<f64>::identity(mat_ac.nrows(), mat_ac.nrows());
            let mat_a = (mat_i - mat_ac.scale(sampling_dt))
                .try_inverse()
                .ok_or_else(|| {
                    TunerError::InvalidValue("I - Ac dt is not invertible".to_string())
                })?;
            let mat_b = &mat_a * mat_bc.scale(sampling_dt);

            Ok(Model {
                mat_a,
                mat_b,
                sampling_frequency,
            })
        }
    }

    impl DiscretePlant for Model {
        fn get_mat_a(&self) -> &na::DMatrix<f64> {
            &self.mat_a
        }

        fn get_mat_b(&self) -> &na::DMatrix<f64> {
            &self.mat_b
        }

        fn get_sampling_frequency(&self) -> f64 {
            self.sampling_frequency
        }
    }

}
