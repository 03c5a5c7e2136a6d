use crate::domain_model::*;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token expired")]
    Expired,
    /// Never returned by `authenticate` or `refresh`; both fold it into
    /// `InvalidCredentials`.
    #[error("token revoked")]
    Revoked,
    #[error("revocation check unavailable: {0}")]
    RevocationCheckUnavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// What `authenticate` does when the revocation store cannot answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RevocationPolicy {
    #[default]
    FailClosed,
    FailOpen,
}

impl FromStr for RevocationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail_closed" => Ok(RevocationPolicy::FailClosed),
            "fail_open" => Ok(RevocationPolicy::FailOpen),
            other => Err(format!("unknown revocation policy: {other}")),
        }
    }
}

#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    async fn issue(&self, subject: &str) -> Result<TokenPair, SessionError>;

    /// Accept a bearer access token that is well formed, unexpired and not revoked.
    async fn authenticate(&self, token: &str) -> Result<TokenPayload, SessionError>;

    /// Exchange a refresh token for a new pair and retire the presented one.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, SessionError>;

    /// Deny `token` for the rest of its lifetime. Unparseable tokens are ignored.
    async fn revoke(&self, token: &str) -> Result<(), SessionError>;

    async fn is_revoked(&self, token: &str) -> Result<bool, SessionError>;
}
