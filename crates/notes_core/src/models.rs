use async_trait::async_trait;
use std::fmt;
use crate::Result;

/// A generative-language endpoint: one prompt in, raw reply text out.
#[async_trait]
pub trait LanguageModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Send `prompt` to the model and return its raw text reply.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
