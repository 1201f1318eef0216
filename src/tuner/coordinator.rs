use crate::control::model::StateSpaceModel;
use crate::tuner::classifier::{Stability, StabilityClassifier, StabilityReport};
use crate::tuner::editor::FeedbackEditor;

/// Consumer of stability reports, typically a UI.
pub trait StabilityRenderer {
    fn render(&mut self, report: &StabilityReport);
}

impl<F: FnMut(&StabilityReport)> StabilityRenderer for F {
    fn render(&mut self, report: &StabilityReport) {
        self(report)
    }
}

/// Writes every report to the log.
#[derive(Debug, Default)]
pub struct LogRenderer;

impl StabilityRenderer for LogRenderer {
    fn render(&mut self, report: &StabilityReport) {
        match report.verdict {
            Stability::Indeterminate => log::info!(
                "closed loop: {:?} ({})",
                report.verdict,
                report.reason.as_deref().unwrap_or("no reason")
            ),
            _ => {
                let max_re = report
                    .eigenvalues
                    .iter()
                    .map(|lambda| lambda.re)
                    .fold(f64::NEG_INFINITY, f64::max);
                log::info!(
                    "closed loop: {:?}, max real part {max_re:.3}",
                    report.verdict
                );
            }
        }
    }
}

/// Recompute, classify, render: run synchronously after every committed edit.
pub struct UpdateCoordinator<R: StabilityRenderer> {
    classifier: StabilityClassifier,
    renderer: R,
    last_verdict: Option<Stability>,
}

impl<R: StabilityRenderer> UpdateCoordinator<R> {
    pub fn new(renderer: R) -> UpdateCoordinator<R> {
        UpdateCoordinator {
            classifier: StabilityClassifier,
            renderer,
            last_verdict: None,
        }
    }

    /// The renderer is always called, also when the transform fails, so a
    /// stale verdict never stays on screen.
    pub fn notify(&mut self, model: &StateSpaceModel, editor: &FeedbackEditor) -> StabilityReport {
        let report = self.classifier.classify(model, editor);

        if let Some(reason) = &report.reason {
            log::warn!("stability cannot be evaluated: {reason}");
        }
        if self.last_verdict != Some(report.verdict) {
            log::info!(
                "stability changed: {:?} -> {:?}",
                self.last_verdict,
                report.verdict
            );
            self.last_verdict = Some(report.verdict);
        }

        self.renderer.render(&report);
        report
    }

    pub fn last_verdict(&self) -> Option<Stability> {
        self.last_verdict
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TunerConfig;
    use nalgebra as na;

    #[test]
    fn closure_renderer_sees_every_notification() {
        let mut model = StateSpaceModel::new(
            na::dmatrix![0.9],
            na::dmatrix![1.0],
            10.0,
        )
        .unwrap();
        let editor = FeedbackEditor::new(&TunerConfig::default(), &model);

        let mut verdicts = Vec::new();
        {
            let mut coordinator = UpdateCoordinator::new(|report: &StabilityReport| {
                verdicts.push(report.verdict)
            });
            coordinator.notify(&model, &editor);
            model.set_feedback_matrix(na::dmatrix![0.9]).unwrap();
            coordinator.notify(&model, &editor);
            model.set_feedback_matrix(na::dmatrix![-0.5]).unwrap();
            coordinator.notify(&model, &editor);
            assert_eq!(coordinator.last_verdict(), Some(Stability::Unstable));
        }

        assert_eq!(
            verdicts,
            vec![
                Stability::Stable,
                Stability::Indeterminate,
                Stability::Unstable
            ]
        );
    }
}
