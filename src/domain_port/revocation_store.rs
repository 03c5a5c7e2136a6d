use std::time::Duration;

/// Value written under every revocation key.
pub const REVOKED_MARKER: &str = "revoked";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RevocationStoreError {
    #[error("revocation store unavailable: {0}")]
    Unavailable(String),
}

/// A key-expiry map. Entries disappear on their own once `ttl` elapses.
#[async_trait::async_trait]
pub trait RevocationStore: Send + Sync {
    async fn put(&self, key: &str, ttl: Duration) -> Result<(), RevocationStoreError>;
    async fn exists(&self, key: &str) -> Result<bool, RevocationStoreError>;
    async fn delete(&self, key: &str) -> Result<(), RevocationStoreError>;
}
