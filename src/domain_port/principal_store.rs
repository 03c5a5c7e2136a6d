use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct PrincipalRecord {
    pub user_id: UserId,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<PrincipalRecord> for Principal {
    fn from(record: PrincipalRecord) -> Self {
        Principal {
            id: record.user_id,
            email: record.email,
            created_at: record.created_at,
        }
    }
}

#[async_trait::async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Fails with `AuthError::EmailTaken` when the email is already registered.
    async fn create(&self, record: &PrincipalRecord) -> Result<(), AuthError>;

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<PrincipalRecord>, AuthError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<PrincipalRecord>, AuthError>;

    /// Overwrite email and password hash. Fails with `AuthError::EmailTaken`
    /// when another principal owns the new email.
    async fn update(&self, record: &PrincipalRecord) -> Result<(), AuthError>;
}
