use std::time::Duration;

pub mod models;
pub mod parser;
pub mod prompts;
pub mod service;
pub mod workflow;

pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(35);

/// Settings for the language model client.
#[derive(Clone)]
pub struct Config {
    pub provider: String,
    pub api_key: Option<String>,
    pub model_name: String,
    pub base_url: String,
    /// How long the annotation service waits for a reply.
    pub timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            api_key: None,
            model_name: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

pub mod prelude {
    pub use super::Config;
    pub use super::models::{create_model, ModelFactory, ModelHandle};
    pub use super::service::{Annotation, AnnotationService, FallbackReason};
    pub use super::workflow::NoteAnnotationWorkflow;
    pub use notes_core::{LanguageModel, Result, Error, SummaryResult, TodoResult};
}

pub use models::{create_model, ModelFactory, ModelHandle};
pub use service::{Annotation, AnnotationService, FallbackReason};
pub use workflow::NoteAnnotationWorkflow;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_redacts_api_key() {
        let config = Config {
            api_key: Some("secret-key".to_string()),
            ..Config::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("gemini-1.5-flash"));
        assert_eq!(config.timeout, Duration::from_secs(35));
    }
}
