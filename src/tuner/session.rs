use std::sync::Arc;

use nalgebra as na;
use parking_lot::Mutex;

use crate::config::TunerConfig;
use crate::control::model::StateSpaceModel;
use crate::error::TunerResult;
use crate::tuner::classifier::{Stability, StabilityClassifier, StabilityReport};
use crate::tuner::coordinator::{StabilityRenderer, UpdateCoordinator};
use crate::tuner::editor::{FeedbackEditor, Sign};

/// One interactive tuning session: the model, its editor and the
/// coordinator that reports every edit.
///
/// Each mutating call commits the edit, then recomputes, classifies and
/// renders before it returns. A failed edit leaves the model unchanged and
/// triggers no notification.
pub struct TuningSession<R: StabilityRenderer> {
    model: StateSpaceModel,
    editor: FeedbackEditor,
    coordinator: UpdateCoordinator<R>,
}

impl<R: StabilityRenderer> TuningSession<R> {
    /// The magnitude range comes from `config`; the sampling frequency is the model's.
    pub fn new(
        model: StateSpaceModel,
        config: &TunerConfig,
        renderer: R,
    ) -> TunerResult<TuningSession<R>> {
        config.validate()?;
        let editor = FeedbackEditor::new(config, &model);

        Ok(TuningSession {
            model,
            editor,
            coordinator: UpdateCoordinator::new(renderer),
        })
    }

    pub fn from_matrices(
        mat_a: na::DMatrix<f64>,
        mat_b: na::DMatrix<f64>,
        config: &TunerConfig,
        renderer: R,
    ) -> TunerResult<TuningSession<R>> {
        config.validate()?;
        let model = StateSpaceModel::new(mat_a, mat_b, config.sampling_frequency)?;
        Self::new(model, config, renderer)
    }

    pub fn model(&self) -> &StateSpaceModel {
        &self.model
    }

    pub fn editor(&self) -> &FeedbackEditor {
        &self.editor
    }

    pub fn renderer(&self) -> &R {
        self.coordinator.renderer()
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        self.coordinator.renderer_mut()
    }

    pub fn last_verdict(&self) -> Option<Stability> {
        self.coordinator.last_verdict()
    }

    pub fn set_magnitude_db(&mut self, row: usize, col: usize, db: f64) -> TunerResult<Stability> {
        self.editor.set_magnitude_db(&mut self.model, row, col, db)?;
        Ok(self.notify().verdict)
    }

    pub fn set_sign(&mut self, row: usize, col: usize, inverted: bool) -> TunerResult<Stability> {
        self.editor.set_sign(&mut self.model, row, col, inverted)?;
        Ok(self.notify().verdict)
    }

    pub fn set_feedback_matrix(&mut self, mat_f: na::DMatrix<f64>) -> TunerResult<Stability> {
        self.model.set_feedback_matrix(mat_f)?;
        self.editor.sync_signs(&self.model);
        Ok(self.notify().verdict)
    }

    /// Back to the open loop, `F = 0`.
    pub fn reset(&mut self) -> TunerResult<Stability> {
        let zeros = na::DMatrix::<f64>::zeros(self.model.n_inputs(), self.model.n_states());
        self.set_feedback_matrix(zeros)
    }

    /// Re-renders the current state without editing anything.
    pub fn notify(&mut self) -> StabilityReport {
        self.coordinator.notify(&self.model, &self.editor)
    }

    /// Classification of the current gain, without rendering.
    pub fn classify(&self) -> StabilityReport {
        StabilityClassifier.classify(&self.model, &self.editor)
    }

    pub fn display_db(&self, row: usize, col: usize) -> TunerResult<f64> {
        self.editor.display_db(&self.model, row, col)
    }

    pub fn sign(&self, row: usize, col: usize) -> TunerResult<Sign> {
        self.editor.sign(&self.model, row, col)
    }

    /// Copy of `F` for persistence by the caller.
    pub fn export_gain(&self) -> na::DMatrix<f64> {
        self.model.feedback_matrix().clone()
    }

    pub fn into_renderer(self) -> R {
        self.coordinator.into_renderer()
    }
}

/// A session behind one lock, for hosts that drive it from several threads.
/// Every operation holds the lock for the whole edit-and-notify cycle.
pub struct SharedSession<R: StabilityRenderer> {
    inner: Arc<Mutex<TuningSession<R>>>,
}

impl<R: StabilityRenderer> Clone for SharedSession<R> {
    fn clone(&self) -> Self {
        SharedSession {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: StabilityRenderer> SharedSession<R> {
    pub fn new(session: TuningSession<R>) -> SharedSession<R> {
        SharedSession {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn set_magnitude_db(&self, row: usize, col: usize, db: f64) -> TunerResult<Stability> {
        self.inner.lock().set_magnitude_db(row, col, db)
    }

    pub fn set_sign(&self, row: usize, col: usize, inverted: bool) -> TunerResult<Stability> {
        self.inner.lock().set_sign(row, col, inverted)
    }

    pub fn set_feedback_matrix(&self, mat_f: na::DMatrix<f64>) -> TunerResult<Stability> {
        self.inner.lock().set_feedback_matrix(mat_f)
    }

    pub fn classify(&self) -> StabilityReport {
        self.inner.lock().classify()
    }

    pub fn export_gain(&self) -> na::DMatrix<f64> {
        self.inner.lock().export_gain()
    }

    /// Runs `f` with the session locked.
    pub fn with<T>(&self, f: impl FnOnce(&mut TuningSession<R>) -> T) -> T {
        f(&mut self.inner.lock())
    }
}
