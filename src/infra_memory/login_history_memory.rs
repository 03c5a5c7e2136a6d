use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

pub struct MemoryLoginHistoryRepo {
    next_id: AtomicI64,
    records: DashMap<UserId, Vec<LoginRecord>>,
}

impl MemoryLoginHistoryRepo {
    pub fn new() -> Self {
        MemoryLoginHistoryRepo {
            next_id: AtomicI64::new(1),
            records: DashMap::new(),
        }
    }
}

impl Default for MemoryLoginHistoryRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LoginHistoryRepo for MemoryLoginHistoryRepo {
    async fn record(
        &self,
        user_id: UserId,
        user_agent: &str,
        login_time: DateTime<Utc>,
    ) -> Result<LoginRecord, AuthError> {
        let record = LoginRecord {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            user_id,
            user_agent: user_agent.to_string(),
            login_time,
        };
        self.records.entry(user_id).or_default().push(record.clone());
        Ok(record)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<LoginRecord>, AuthError> {
        let mut history = self
            .records
            .get(&user_id)
            .map(|entry| entry.clone())
            .unwrap_or_default();
        history.sort_by(|a, b| b.login_time.cmp(&a.login_time).then(b.id.cmp(&a.id)));
        Ok(history)
    }
}
