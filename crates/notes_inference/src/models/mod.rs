use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use notes_core::{LanguageModel, Result};
use tokio::sync::OnceCell;
use crate::Config;

pub mod gemini;

pub use gemini::GeminiModel;

/// Builds the model client named by `config.provider`.
pub async fn create_model(config: &Config) -> Result<Arc<dyn LanguageModel>> {
    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiModel::new(config)?)),
        other => Err(notes_core::Error::Config(format!("Unknown model provider: {}", other))),
    }
}

/// Something that can build a model client, possibly failing.
#[async_trait]
pub trait ModelFactory: Send + Sync {
    async fn build(&self) -> Result<Arc<dyn LanguageModel>>;
}

#[async_trait]
impl ModelFactory for Config {
    async fn build(&self) -> Result<Arc<dyn LanguageModel>> {
        create_model(self).await
    }
}

/// Process-wide model client, constructed on first use.
///
/// A failed construction is returned to that caller and attempted again on the next
/// call; only a successfully built client is kept.
pub struct ModelHandle {
    config: Config,
    factory: Arc<dyn ModelFactory>,
    cell: OnceCell<Arc<dyn LanguageModel>>,
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("provider", &self.config.provider)
            .field("initialized", &self.cell.initialized())
            .finish()
    }
}

impl ModelHandle {
    pub fn new(config: Config) -> Self {
        let factory = Arc::new(config.clone());
        Self::with_factory(config, factory)
    }

    /// A handle that builds its client through `factory` instead of `create_model`.
    pub fn with_factory(config: Config, factory: Arc<dyn ModelFactory>) -> Self {
        Self {
            config,
            factory,
            cell: OnceCell::new(),
        }
    }

    /// A handle around an already constructed client.
    pub fn with_model(model: Arc<dyn LanguageModel>) -> Self {
        let config = Config::default();
        Self {
            factory: Arc::new(config.clone()),
            config,
            cell: OnceCell::new_with(Some(model)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn get(&self) -> Result<Arc<dyn LanguageModel>> {
        let model = self
            .cell
            .get_or_try_init(|| async {
                let model = self.factory.build().await?;
                tracing::info!("🧠 Inference model initialized successfully (using {})", model.name());
                Ok::<_, notes_core::Error>(model)
            })
            .await?;
        Ok(model.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct EchoModel;

    #[async_trait]
    impl LanguageModel for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, prompt: &str) -> Result<String> {
            Ok(prompt.to_string())
        }
    }

    #[tokio::test]
    async fn test_create_model_rejects_unknown_provider() {
        let config = Config {
            provider: "ollama".to_string(),
            ..Config::default()
        };
        let err = create_model(&config).await.unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: Unknown model provider: ollama");
    }

    /// Fails the first `failures` builds, then hands out an `EchoModel`.
    struct FlakyFactory {
        failures: usize,
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl ModelFactory for FlakyFactory {
        async fn build(&self) -> Result<Arc<dyn LanguageModel>> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures {
                return Err(notes_core::Error::Config("GEMINI_API_KEY is not set".to_string()));
            }
            Ok(Arc::new(EchoModel))
        }
    }

    #[tokio::test]
    async fn test_handle_retries_failed_construction() {
        let factory = Arc::new(FlakyFactory {
            failures: 1,
            attempts: AtomicUsize::new(0),
        });
        let handle = ModelHandle::with_factory(Config::default(), factory.clone());

        assert!(handle.get().await.is_err());
        assert!(!handle.is_initialized());

        let model = handle.get().await.unwrap();
        assert_eq!(model.name(), "echo");
        assert!(handle.is_initialized());

        handle.get().await.unwrap();
        assert_eq!(factory.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_handle_without_key_fails_every_time() {
        let handle = ModelHandle::new(Config::default());
        assert!(handle.get().await.is_err());
        assert!(handle.get().await.is_err());
        assert!(!handle.is_initialized());
    }

    #[tokio::test]
    async fn test_handle_builds_once() {
        let config = Config {
            api_key: Some("test-key".to_string()),
            ..Config::default()
        };
        let handle = ModelHandle::new(config);
        let first = handle.get().await.unwrap();
        let second = handle.get().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "gemini-1.5-flash");
    }

    #[tokio::test]
    async fn test_handle_with_injected_model() {
        let handle = ModelHandle::with_model(Arc::new(EchoModel));
        let model = handle.get().await.unwrap();
        assert_eq!(model.generate("ping").await.unwrap(), "ping");
    }
}
