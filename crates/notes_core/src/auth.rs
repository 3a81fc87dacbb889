use async_trait::async_trait;
use crate::types::Identity;
use crate::Result;

/// Resolves a request credential to the caller's identity.
///
/// Implementations return `Error::Unauthorized` for unknown, malformed or expired credentials.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity>;
}
