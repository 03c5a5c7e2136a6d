use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(500);

pub struct RealSessionService {
    token_codec: Arc<dyn TokenCodec>,
    revocation_store: Arc<dyn RevocationStore>,
    clock: Arc<dyn Clock>,
    policy: RevocationPolicy,
    store_timeout: Duration,
}

impl RealSessionService {
    pub fn new(
        token_codec: Arc<dyn TokenCodec>,
        revocation_store: Arc<dyn RevocationStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            token_codec,
            revocation_store,
            clock,
            policy: RevocationPolicy::default(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_policy(mut self, policy: RevocationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    async fn bounded<T, F>(&self, op: &'static str, call: F) -> Result<T, SessionError>
    where
        F: Future<Output = Result<T, RevocationStoreError>>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(op, error = %e, "revocation store call failed");
                Err(SessionError::RevocationCheckUnavailable(e.to_string()))
            }
            Err(_) => {
                warn!(op, timeout = ?self.store_timeout, "revocation store call timed out");
                Err(SessionError::RevocationCheckUnavailable(format!(
                    "{op} timed out after {:?}",
                    self.store_timeout
                )))
            }
        }
    }

    /// Collapse codec failures into what callers may see. Only expiry stays distinct.
    fn reject(error: TokenError) -> SessionError {
        match error {
            TokenError::Expired => SessionError::Expired,
            TokenError::Mint(e) | TokenError::InvalidConfig(e) => SessionError::Internal(e),
            other => {
                debug!(reason = %other, "token rejected");
                SessionError::InvalidCredentials
            }
        }
    }

    fn fold_revoked(error: SessionError) -> SessionError {
        match error {
            SessionError::Revoked => {
                info!("revoked token presented");
                SessionError::InvalidCredentials
            }
            other => other,
        }
    }

    async fn ensure_not_revoked(&self, token: &str) -> Result<(), SessionError> {
        if self.is_revoked(token).await? {
            return Err(SessionError::Revoked);
        }
        Ok(())
    }

    async fn revoke_until(&self, token: &str, expires_at: DateTime<Utc>) -> Result<(), SessionError> {
        let ttl = match (expires_at - self.clock.now()).to_std() {
            Ok(ttl) if !ttl.is_zero() => ttl,
            _ => {
                debug!(%expires_at, "token already expired, nothing to revoke");
                return Ok(());
            }
        };
        self.bounded("put", self.revocation_store.put(token, ttl)).await
    }
}

#[async_trait::async_trait]
impl SessionService for RealSessionService {
    async fn issue(&self, subject: &str) -> Result<TokenPair, SessionError> {
        self.token_codec.mint_pair(subject).map_err(Self::reject)
    }

    async fn authenticate(&self, token: &str) -> Result<TokenPayload, SessionError> {
        let payload = self
            .token_codec
            .parse_as_type(token, TokenType::Access)
            .map_err(Self::reject)?;

        match self.ensure_not_revoked(token).await {
            Ok(()) => {}
            Err(SessionError::RevocationCheckUnavailable(e))
                if self.policy == RevocationPolicy::FailOpen =>
            {
                warn!(subject = %payload.subject, error = %e, "accepting token without revocation check");
            }
            Err(e) => return Err(Self::fold_revoked(e)),
        }

        Ok(payload)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, SessionError> {
        let payload = self
            .token_codec
            .parse_as_type(refresh_token, TokenType::Refresh)
            .map_err(Self::reject)?;

        self.ensure_not_revoked(refresh_token)
            .await
            .map_err(Self::fold_revoked)?;

        let pair = self
            .token_codec
            .mint_pair(&payload.subject)
            .map_err(Self::reject)?;

        // Only after the new pair exists.
        self.revoke_until(refresh_token, payload.expires_at).await?;

        info!(subject = %payload.subject, "refresh token rotated");
        Ok(pair)
    }

    async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        let payload = match self.token_codec.parse(token) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(reason = %e, "ignoring revocation of unusable token");
                return Ok(());
            }
        };

        self.revoke_until(token, payload.expires_at).await?;
        debug!(subject = %payload.subject, token_type = %payload.token_type, "token revoked");
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, SessionError> {
        self.bounded("exists", self.revocation_store.exists(token)).await
    }
}
