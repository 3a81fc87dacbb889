use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use notes_core::{Note, NoteCreate, NoteStore, Result};
use tracing::{info, warn};
use crate::models::ModelHandle;
use crate::service::AnnotationService;

/// Notes shorter than this (after trimming) are stored without to-do extraction.
pub const MIN_CONTENT_CHARS: usize = 5;

/// Creates notes and attaches the to-dos the model finds in them.
///
/// Extraction is best effort: it runs under its own deadline and any failure leaves the
/// freshly created note as it was.
pub struct NoteAnnotationWorkflow {
    store: Arc<dyn NoteStore>,
    model: Arc<ModelHandle>,
    model_timeout: Duration,
    timeout: Duration,
}

impl fmt::Debug for NoteAnnotationWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoteAnnotationWorkflow")
            .field("store", &"<dyn NoteStore>")
            .field("model", &self.model)
            .field("model_timeout", &self.model_timeout)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl NoteAnnotationWorkflow {
    /// `model_timeout` bounds the model call inside the service, `timeout` bounds the whole
    /// extraction as seen from note creation.
    pub fn new(store: Arc<dyn NoteStore>, model: Arc<ModelHandle>, model_timeout: Duration, timeout: Duration) -> Self {
        Self {
            store,
            model,
            model_timeout,
            timeout,
        }
    }

    pub async fn create_note(&self, input: NoteCreate, owner_uid: &str) -> Result<Note> {
        let note = self.store.create(input, owner_uid).await?;
        Ok(self.annotate(note).await)
    }

    /// Returns `note` with its to-dos attached, or unchanged when there are none or extraction failed.
    pub async fn annotate(&self, note: Note) -> Note {
        if note.content.trim().chars().count() < MIN_CONTENT_CHARS {
            return note;
        }

        let todos = match tokio::time::timeout(self.timeout, self.extract(&note.content)).await {
            Ok(Ok(todos)) => todos,
            Ok(Err(e)) => {
                warn!("⚠️ AI todo extraction error for note {}: {}", note.id, e);
                return note;
            }
            Err(_) => {
                warn!("⏱️ AI todo extraction timeout for note {}", note.id);
                return note;
            }
        };

        if todos.is_empty() {
            return note;
        }

        match self.store.set_todos(&note.id, &note.owner_uid, todos).await {
            Ok(updated) => {
                info!("📝 Attached {} todos to note {}", updated.todos.len(), updated.id);
                updated
            }
            Err(e) => {
                warn!("⚠️ Failed to store todos for note {}: {}", note.id, e);
                note
            }
        }
    }

    async fn extract(&self, content: &str) -> Result<Vec<String>> {
        let model = self.model.get().await?;
        let result = AnnotationService::new(model, self.model_timeout)
            .extract_todos(content)
            .await
            .into_value();
        Ok(if result.has_todos { result.todos } else { Vec::new() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::tests::ScriptedModel;
    use crate::Config;
    use notes_storage::MemoryStorage;

    fn input(content: &str) -> NoteCreate {
        NoteCreate {
            id: Some("n1".to_string()),
            title: "Plan".to_string(),
            content: content.to_string(),
        }
    }

    fn workflow(model: Arc<ModelHandle>, timeout: Duration) -> (NoteAnnotationWorkflow, Arc<MemoryStorage>) {
        let store = Arc::new(MemoryStorage::new());
        let workflow = NoteAnnotationWorkflow::new(store.clone(), model, Duration::from_secs(5), timeout);
        (workflow, store)
    }

    #[tokio::test]
    async fn test_create_note_attaches_todos() {
        let model = ScriptedModel::replying("TODOS:\n- Sunum dosyasını tamamla\n- Ali'ye gönder");
        let (workflow, store) = workflow(Arc::new(ModelHandle::with_model(model)), Duration::from_secs(5));

        let note = workflow
            .create_note(input("Yarın sunum dosyasını tamamla ve Ali'ye gönder"), "alice")
            .await
            .unwrap();
        assert!(note.has_todos);
        assert_eq!(note.todos, vec!["Sunum dosyasını tamamla", "Ali'ye gönder"]);

        let stored = store.get("n1", "alice").await.unwrap().unwrap();
        assert_eq!(stored, note);
    }

    #[tokio::test]
    async fn test_short_content_is_not_sent() {
        let model = ScriptedModel::replying("TODOS:\n- hiç");
        let (workflow, _) = workflow(Arc::new(ModelHandle::with_model(model.clone())), Duration::from_secs(5));

        let note = workflow.create_note(input("  ab  "), "alice").await.unwrap();
        assert!(!note.has_todos);
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_todos_leaves_note_untouched() {
        let model = ScriptedModel::replying("NO_TODOS");
        let (workflow, _) = workflow(Arc::new(ModelHandle::with_model(model)), Duration::from_secs(5));

        let note = workflow.create_note(input("Dün sinemaya gittim, çok güzeldi"), "alice").await.unwrap();
        assert!(!note.has_todos);
        assert!(note.todos.is_empty());
    }

    #[tokio::test]
    async fn test_boundary_timeout_returns_original_note() {
        let model = ScriptedModel::slow("TODOS:\n- geç kaldı", Duration::from_secs(10));
        let (workflow, store) = workflow(Arc::new(ModelHandle::with_model(model)), Duration::from_millis(50));

        let note = workflow.create_note(input("Bu hafta proje raporunu hazırla"), "alice").await.unwrap();
        assert!(!note.has_todos);
        assert!(!store.get("n1", "alice").await.unwrap().unwrap().has_todos);
    }

    #[tokio::test]
    async fn test_model_construction_failure_is_absorbed() {
        let (workflow, store) = workflow(Arc::new(ModelHandle::new(Config::default())), Duration::from_secs(5));

        let note = workflow.create_note(input("Bugün markete git, süt al"), "alice").await.unwrap();
        assert!(!note.has_todos);
        assert!(store.get("n1", "alice").await.unwrap().is_some());
    }
}
