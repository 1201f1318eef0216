use nalgebra as na;

use crate::control::model::StateSpaceModel;
use crate::tuner::editor::FeedbackEditor;

/// Continuous-time stability of the closed loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    /// Every eigenvalue has a non-positive real part.
    Stable,
    /// At least one eigenvalue has a positive real part.
    Unstable,
    /// The discrete to continuous transform is undefined for the current gain.
    Indeterminate,
}

/// What the renderer shows for one feedback element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDisplay {
    pub row: usize,
    pub col: usize,
    pub highlighted: bool,
    pub db: f64,
    pub inverted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StabilityReport {
    pub verdict: Stability,
    /// Continuous closed-loop eigenvalues; empty when indeterminate.
    pub eigenvalues: Vec<na::Complex<f64>>,
    /// Why the transform failed, when indeterminate.
    pub reason: Option<String>,
    /// Set when stable: the controls should be re-synchronised with the model.
    pub refresh_values: bool,
    /// Row-major.
    pub elements: Vec<ElementDisplay>,
}

impl StabilityReport {
    pub fn element(&self, row: usize, col: usize) -> Option<&ElementDisplay> {
        self.elements.iter().find(|e| e.row == row && e.col == col)
    }

    pub fn highlighted_count(&self) -> usize {
        self.elements.iter().filter(|e| e.highlighted).count()
    }
}

/// Real parts within this fraction of the spectral radius are rounding noise
/// and count as zero.
const MARGINAL_TOLERANCE: f64 = 1e-9;

pub fn verdict_for(eigenvalues: &[na::Complex<f64>]) -> Stability {
    let radius = eigenvalues
        .iter()
        .map(|lambda| lambda.norm())
        .fold(0.0, f64::max);
    let margin = MARGINAL_TOLERANCE * radius;

    if eigenvalues.iter().all(|lambda| lambda.re <= margin) {
        Stability::Stable
    } else {
        Stability::Unstable
    }
}

/// Turns the model's eigenvalues into a verdict plus per-element highlights.
///
/// Instability is not attributed to individual gains: an unstable (or
/// indeterminate) loop flags every element.
#[derive(Debug, Clone, Copy, Default)]
pub struct StabilityClassifier;

impl StabilityClassifier {
    pub fn classify(&self, model: &StateSpaceModel, editor: &FeedbackEditor) -> StabilityReport {
        let (verdict, eigenvalues, reason) = match model.eigenvalues() {
            Ok(eigenvalues) => (verdict_for(&eigenvalues), eigenvalues, None),
            Err(err) => (Stability::Indeterminate, Vec::new(), Some(err.to_string())),
        };

        let highlighted = verdict != Stability::Stable;
        let mat_f = model.feedback_matrix();
        let mut elements = Vec::with_capacity(mat_f.len());
        for row in 0..mat_f.nrows() {
            for col in 0..mat_f.ncols() {
                let value = mat_f[(row, col)];
                let db = editor
                    .display_db(model, row, col)
                    .unwrap_or(editor.floor_db());
                let inverted = editor
                    .sign(model, row, col)
                    .map(|sign| sign.is_inverted())
                    .unwrap_or(value < 0.0);
                elements.push(ElementDisplay {
                    row,
                    col,
                    highlighted,
                    db,
                    inverted,
                });
            }
        }

        StabilityReport {
            verdict,
            eigenvalues,
            reason,
            refresh_values: verdict == Stability::Stable,
            elements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TunerConfig;

    #[test]
    fn verdict_rule() {
        let stable = [na::Complex::new(-1.0, 2.0), na::Complex::new(0.0, -3.0)];
        assert_eq!(verdict_for(&stable), Stability::Stable);
        let unstable = [na::Complex::new(-1.0, 0.0), na::Complex::new(1e-3, 0.0)];
        assert_eq!(verdict_for(&unstable), Stability::Unstable);
        assert_eq!(verdict_for(&[]), Stability::Stable);
    }

    #[test]
    fn rounding_noise_on_imaginary_axis_is_stable() {
        let rate = std::f64::consts::FRAC_PI_2 * 44_100.0;
        let marginal = [na::Complex::new(2.8e-11, rate), na::Complex::new(2.8e-11, -rate)];
        assert_eq!(verdict_for(&marginal), Stability::Stable);

        let growing = [na::Complex::new(1e-3, 1.0), na::Complex::new(1e-3, -1.0)];
        assert_eq!(verdict_for(&growing), Stability::Unstable);
    }

    #[test]
    fn strongly_coupled_contractive_plant_is_stable() {
        let model = StateSpaceModel::new(
            na::dmatrix![0.9, 2.0e6; 0.0, 0.01],
            na::dmatrix![0.0; 1.0],
            44_100.0,
        )
        .unwrap();
        let editor = FeedbackEditor::new(&TunerConfig::default(), &model);
        let report = StabilityClassifier.classify(&model, &editor);

        assert_eq!(report.reason, None);
        assert_eq!(report.verdict, Stability::Stable);
        assert_eq!(report.highlighted_count(), 0);
    }

    #[test]
    fn contractive_plant_is_stable_and_unflagged() {
        let model = StateSpaceModel::new(
            na::dmatrix![0.5, 0.1; 0.0, 0.8],
            na::dmatrix![0.0; 1.0],
            100.0,
        )
        .unwrap();
        let editor = FeedbackEditor::new(&TunerConfig::default(), &model);
        let report = StabilityClassifier.classify(&model, &editor);

        assert_eq!(report.verdict, Stability::Stable);
        assert!(report.refresh_values);
        assert_eq!(report.highlighted_count(), 0);
        assert_eq!(report.eigenvalues.len(), 2);
        let element = report.element(0, 1).unwrap();
        assert_eq!(element.db, -36.0);
        assert!(!element.inverted);
    }

    #[test]
    fn expanding_plant_flags_every_element() {
        let model = StateSpaceModel::new(
            na::dmatrix![1.2, 0.0; 0.0, 0.5],
            na::DMatrix::<f64>::identity(2, 2),
            100.0,
        )
        .unwrap();
        let editor = FeedbackEditor::new(&TunerConfig::default(), &model);
        let report = StabilityClassifier.classify(&model, &editor);

        assert_eq!(report.verdict, Stability::Unstable);
        assert!(!report.refresh_values);
        assert_eq!(report.highlighted_count(), 4);
    }

    #[test]
    fn singular_loop_is_indeterminate() {
        let model = StateSpaceModel::new(
            na::dmatrix![1.0, 1.0; 1.0, 1.0],
            na::dmatrix![0.0; 1.0],
            100.0,
        )
        .unwrap();
        let editor = FeedbackEditor::new(&TunerConfig::default(), &model);
        let report = StabilityClassifier.classify(&model, &editor);

        assert_eq!(report.verdict, Stability::Indeterminate);
        assert!(report.eigenvalues.is_empty());
        assert!(report.reason.is_some());
        assert_eq!(report.highlighted_count(), 2);
    }
}
