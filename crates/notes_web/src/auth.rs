use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use notes_core::{Error, Identity, IdentityVerifier, Result};
use std::collections::HashMap;
use std::sync::Arc;
use crate::error::ApiError;
use crate::AppState;

/// Verifies bearer tokens against a fixed table loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }

    /// Parses a comma-separated list of `token=uid` or `token=uid:email` entries.
    pub fn parse(entries: &str) -> Result<Self> {
        let mut verifier = Self::new();
        for entry in entries.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (token, subject) = entry
                .split_once('=')
                .ok_or_else(|| Error::Config(format!("Invalid auth token entry: {}", entry)))?;
            let (uid, email) = match subject.split_once(':') {
                Some((uid, email)) => (uid.trim(), Some(email.trim().to_string())),
                None => (subject.trim(), None),
            };
            if token.trim().is_empty() || uid.is_empty() {
                return Err(Error::Config(format!("Invalid auth token entry: {}", entry)));
            }
            let identity = Identity {
                uid: uid.to_string(),
                email_verified: email.is_some(),
                email,
                name: None,
            };
            verifier = verifier.with_token(token.trim(), identity);
        }
        Ok(verifier)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl IdentityVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| Error::Unauthorized("Invalid authentication token".to_string()))
    }
}

/// The verified caller of a request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> std::result::Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Unauthorized("Not authenticated".to_string()))?;

        let identity = state.verifier.verify(token).await?;
        Ok(CurrentUser(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_tokens() {
        let verifier = StaticTokenVerifier::parse("t1=alice:alice@example.com, t2=bob").unwrap();
        assert_eq!(verifier.len(), 2);

        let alice = verifier.verify("t1").await.unwrap();
        assert_eq!(alice.uid, "alice");
        assert_eq!(alice.email.as_deref(), Some("alice@example.com"));
        assert!(alice.email_verified);

        let bob = verifier.verify("t2").await.unwrap();
        assert_eq!(bob.email, None);

        let err = verifier.verify("t3").await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[test]
    fn test_parse_rejects_malformed_entries() {
        assert!(StaticTokenVerifier::parse("").unwrap().is_empty());
        assert!(StaticTokenVerifier::parse("no-separator").is_err());
        assert!(StaticTokenVerifier::parse("=alice").is_err());
        assert!(StaticTokenVerifier::parse("t1=").is_err());
    }
}
