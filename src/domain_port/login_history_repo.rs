use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[async_trait::async_trait]
pub trait LoginHistoryRepo: Send + Sync {
    async fn record(
        &self,
        user_id: UserId,
        user_agent: &str,
        login_time: DateTime<Utc>,
    ) -> Result<LoginRecord, AuthError>;

    /// Newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<LoginRecord>, AuthError>;
}
