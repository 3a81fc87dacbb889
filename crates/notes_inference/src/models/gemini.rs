use async_trait::async_trait;
use notes_core::{LanguageModel, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use url::Url;
use crate::Config;

const PLACEHOLDER_API_KEY: &str = "YOUR_GEMINI_API_KEY_HERE";

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let text = parts.into_iter().filter_map(|p| p.text).collect::<String>();
        (!text.is_empty()).then_some(text)
    }
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiModel {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    model_name: String,
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl GeminiModel {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != PLACEHOLDER_API_KEY)
            .ok_or_else(|| notes_core::Error::Config("GEMINI_API_KEY is not set".to_string()))?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| notes_core::Error::Config(format!("Invalid model URL {}: {}", config.base_url, e)))?;

        // Outlives the annotation timeout; detached calls end here at the latest.
        let client = Client::builder().timeout(config.timeout * 2).build()?;

        Ok(Self {
            client: Arc::new(client),
            api_key: api_key.to_string(),
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            model_name: config.model_name.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model_name)
    }
}

#[async_trait]
impl LanguageModel for GeminiModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![Part { text: prompt.to_string() }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(notes_core::Error::Inference(format!(
                "Gemini API error {}: {}",
                status,
                body.trim()
            )));
        }

        let reply = response.json::<GenerateResponse>().await?;
        tracing::debug!("Gemini ({}) answered", self.model_name);
        reply
            .into_text()
            .ok_or_else(|| notes_core::Error::Inference("Gemini response contained no text".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str, api_key: Option<&str>) -> Config {
        Config {
            api_key: api_key.map(str::to_string),
            base_url: base_url.to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_model_requires_api_key() {
        let err = GeminiModel::new(&config("http://localhost", None)).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: GEMINI_API_KEY is not set");

        assert!(GeminiModel::new(&config("http://localhost", Some(PLACEHOLDER_API_KEY))).is_err());
        assert!(GeminiModel::new(&config("not a url", Some("key"))).is_err());

        let model = GeminiModel::new(&config("http://localhost/v1beta/", Some("test-key"))).unwrap();
        assert_eq!(model.endpoint(), "http://localhost/v1beta/models/gemini-1.5-flash:generateContent");
        assert!(!format!("{:?}", model).contains("test-key"));
    }

    #[tokio::test]
    async fn test_generate_returns_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({ "contents": [{ "parts": [{ "text": "Merhaba" }] }] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "Özet: " }, { "text": "selam" }], "role": "model" }
                }]
            })))
            .mount(&server)
            .await;

        let model = GeminiModel::new(&config(&server.uri(), Some("test-key"))).unwrap();
        let reply = model.generate("Merhaba").await.unwrap();
        assert_eq!(reply, "Özet: selam");
    }

    #[tokio::test]
    async fn test_generate_surfaces_provider_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let model = GeminiModel::new(&config(&server.uri(), Some("test-key"))).unwrap();
        let err = model.generate("Merhaba").await.unwrap_err();
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let model = GeminiModel::new(&config(&server.uri(), Some("test-key"))).unwrap();
        assert!(model.generate("Merhaba").await.is_err());
    }
}
