use super::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const UNKNOWN_USER_AGENT: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRecord {
    pub id: i64,
    #[serde(skip)]
    pub user_id: UserId,
    pub user_agent: String,
    pub login_time: DateTime<Utc>,
}
