use std::sync::Arc;
use std::time::Duration;
use notes_core::{LanguageModel, SummaryResult, TodoResult};
use thiserror::Error;
use tracing::{debug, warn};
use crate::parser::{parse_summary, parse_todos, preview, word_count};
use crate::prompts;

/// Inputs with fewer words than this never reach the model.
pub const MIN_WORDS: usize = 3;

/// Why an annotation carries a substitute value instead of a parsed reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FallbackReason {
    #[error("content has {words} words, at least 3 are needed")]
    InputTooShort { words: usize },

    #[error("model call timed out after {0:?}")]
    ModelTimeout(Duration),

    #[error("{0}")]
    ModelUnavailable(String),
}

/// Outcome of an annotation call. Both variants carry a usable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation<T> {
    Parsed(T),
    Fallback { reason: FallbackReason, value: T },
}

impl<T> Annotation<T> {
    pub fn value(&self) -> &T {
        match self {
            Annotation::Parsed(value) | Annotation::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Annotation::Parsed(value) | Annotation::Fallback { value, .. } => value,
        }
    }

    pub fn reason(&self) -> Option<&FallbackReason> {
        match self {
            Annotation::Parsed(_) => None,
            Annotation::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.reason().is_some()
    }
}

fn summary_result(summary: String, key_points: Vec<String>, original_word_count: usize) -> SummaryResult {
    SummaryResult {
        word_count: word_count(&summary),
        summary,
        key_points,
        original_word_count,
    }
}

/// The summary returned in place of a model answer.
///
/// For timeouts and model errors `word_count` covers the quoted excerpt only, not the notice.
pub fn summary_fallback(reason: &FallbackReason, content: &str) -> SummaryResult {
    let original_word_count = word_count(content);
    let (summary, excerpt) = match reason {
        FallbackReason::InputTooShort { .. } => {
            return summary_result(prompts::SHORT_CONTENT_SUMMARY.to_string(), Vec::new(), original_word_count);
        }
        FallbackReason::ModelTimeout(_) => {
            let excerpt = preview(content);
            (prompts::timeout_summary(&excerpt), excerpt)
        }
        FallbackReason::ModelUnavailable(error) => {
            let excerpt = preview(content);
            (prompts::error_summary(error, &excerpt), excerpt)
        }
    };
    SummaryResult {
        word_count: word_count(&excerpt),
        summary,
        key_points: Vec::new(),
        original_word_count,
    }
}

/// The to-do result returned in place of a model answer, whatever the reason.
pub fn todo_fallback(_reason: &FallbackReason, content: &str) -> TodoResult {
    TodoResult::empty(content)
}

/// Summarises notes and extracts to-dos through a language model.
///
/// Neither operation fails: every error path yields a [`Annotation::Fallback`].
#[derive(Debug, Clone)]
pub struct AnnotationService {
    model: Arc<dyn LanguageModel>,
    timeout: Duration,
}

impl AnnotationService {
    pub fn new(model: Arc<dyn LanguageModel>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn summarize(&self, content: &str) -> Annotation<SummaryResult> {
        let original_word_count = word_count(content);
        if original_word_count < MIN_WORDS {
            return self.fallback_summary(FallbackReason::InputTooShort { words: original_word_count }, content);
        }

        match self.generate(prompts::summary_prompt(content)).await {
            Ok(reply) => {
                let (summary, key_points) = parse_summary(&reply);
                debug!("✨ Summary parsed with {} key points", key_points.len());
                Annotation::Parsed(summary_result(summary, key_points, original_word_count))
            }
            Err(reason) => {
                warn!("⚠️ Summarization fell back: {}", reason);
                self.fallback_summary(reason, content)
            }
        }
    }

    pub async fn extract_todos(&self, content: &str) -> Annotation<TodoResult> {
        let words = word_count(content);
        if words < MIN_WORDS {
            let reason = FallbackReason::InputTooShort { words };
            let value = todo_fallback(&reason, content);
            return Annotation::Fallback { reason, value };
        }

        match self.generate(prompts::todo_prompt(content)).await {
            Ok(reply) => {
                let todos = parse_todos(&reply);
                debug!("✨ Extracted {} todos", todos.len());
                Annotation::Parsed(TodoResult::new(todos, content))
            }
            Err(reason) => {
                warn!("⚠️ Todo extraction fell back: {}", reason);
                let value = todo_fallback(&reason, content);
                Annotation::Fallback { reason, value }
            }
        }
    }

    fn fallback_summary(&self, reason: FallbackReason, content: &str) -> Annotation<SummaryResult> {
        let value = summary_fallback(&reason, content);
        Annotation::Fallback { reason, value }
    }

    /// Runs the model call on its own task and waits at most `self.timeout` for it.
    ///
    /// On timeout the task is detached, not aborted; whatever it returns later is dropped.
    async fn generate(&self, prompt: String) -> std::result::Result<String, FallbackReason> {
        let model = self.model.clone();
        let call = tokio::spawn(async move { model.generate(&prompt).await });

        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(Ok(reply))) => Ok(reply),
            Ok(Ok(Err(e))) => Err(FallbackReason::ModelUnavailable(e.to_string())),
            Ok(Err(join_error)) => Err(FallbackReason::ModelUnavailable(format!("model task failed: {}", join_error))),
            Err(_) => Err(FallbackReason::ModelTimeout(self.timeout)),
        }
    }
}
