use std::sync::Arc;
use std::time::Duration;
use notes_core::{IdentityVerifier, NoteStore};
use notes_inference::{AnnotationService, ModelHandle, NoteAnnotationWorkflow};

#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    /// Soft delete
    pub request: Duration,
    /// Wait for a single model reply inside the annotation service
    pub model: Duration,
    /// Summarize / extract-todos endpoints and the post-create workflow
    pub annotation: Duration,
}

/// Gap between the model wait and the annotation boundary. The service's timeout fallback
/// must land before the boundary fires.
pub const ANNOTATION_MARGIN: Duration = Duration::from_secs(5);

impl Timeouts {
    /// Timeouts for a given model wait, with the annotation boundary `ANNOTATION_MARGIN` past it.
    pub fn for_model(model: Duration) -> Self {
        Self {
            request: Duration::from_secs(10),
            model,
            annotation: model + ANNOTATION_MARGIN,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::for_model(Duration::from_secs(35))
    }
}

pub struct AppState {
    pub store: Arc<dyn NoteStore>,
    pub model: Arc<ModelHandle>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub workflow: NoteAnnotationWorkflow,
    pub timeouts: Timeouts,
}

impl AppState {
    pub fn new(
        store: Arc<dyn NoteStore>,
        model: Arc<ModelHandle>,
        verifier: Arc<dyn IdentityVerifier>,
        timeouts: Timeouts,
    ) -> Self {
        let workflow = NoteAnnotationWorkflow::new(store.clone(), model.clone(), timeouts.model, timeouts.annotation);
        Self {
            store,
            model,
            verifier,
            workflow,
            timeouts,
        }
    }

    pub async fn annotation_service(&self) -> notes_core::Result<AnnotationService> {
        let model = self.model.get().await?;
        Ok(AnnotationService::new(model, self.timeouts.model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_boundary_outlasts_model_wait() {
        let timeouts = Timeouts::default();
        assert_eq!(timeouts.model, Duration::from_secs(35));
        assert_eq!(timeouts.annotation, Duration::from_secs(40));
        assert_eq!(timeouts.request, Duration::from_secs(10));

        let short = Timeouts::for_model(Duration::from_millis(200));
        assert_eq!(short.annotation, Duration::from_millis(200) + ANNOTATION_MARGIN);
    }
}
