use crate::domain_model::*;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("expected a {expected} token, found a {found} token")]
    WrongTokenType {
        expected: TokenType,
        found: TokenType,
    },
    #[error("cannot mint token: {0}")]
    Mint(String),
    #[error("invalid token configuration: {0}")]
    InvalidConfig(String),
}

/// Mints and parses signed tokens. Implementations hold no mutable state.
pub trait TokenCodec: Send + Sync {
    fn mint(
        &self,
        subject: &str,
        token_type: TokenType,
        lifetime: Duration,
    ) -> Result<String, TokenError>;

    /// Mint an access and a refresh token for `subject` from a single clock read.
    fn mint_pair(&self, subject: &str) -> Result<TokenPair, TokenError>;

    /// Verify the signature, then the expiry. Fields are never inspected
    /// before the signature check passes.
    fn parse(&self, token: &str) -> Result<TokenPayload, TokenError>;

    fn parse_as_type(
        &self,
        token: &str,
        expected: TokenType,
    ) -> Result<TokenPayload, TokenError> {
        let payload = self.parse(token)?;
        if payload.token_type != expected {
            return Err(TokenError::WrongTokenType {
                expected,
                found: payload.token_type,
            });
        }
        Ok(payload)
    }
}
