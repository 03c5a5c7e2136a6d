use super::SessionError;
use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token expired")]
    TokenExpired,
    #[error("email already registered")]
    EmailTaken,
    #[error("validation error: {0}")]
    Validation(String),
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<SessionError> for AuthError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::InvalidCredentials | SessionError::Revoked => {
                AuthError::InvalidCredentials
            }
            SessionError::Expired => AuthError::TokenExpired,
            SessionError::RevocationCheckUnavailable(e) => AuthError::Unavailable(e),
            SessionError::Internal(e) => AuthError::InternalError(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn signup(&self, request: SignupInput) -> Result<Principal, AuthError>;
    async fn login(&self, request: LoginInput) -> Result<TokenPair, AuthError>;
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;
    /// Resolve a bearer access token to the principal it was minted for.
    async fn verify_token(&self, token: &str) -> Result<Principal, AuthError>;
    async fn update(
        &self,
        principal: &Principal,
        request: UpdateInput,
    ) -> Result<Principal, AuthError>;
    async fn history(&self, principal: &Principal) -> Result<Vec<LoginRecord>, AuthError>;
    async fn logout(&self, token: &str) -> Result<(), AuthError>;
}
