use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use std::sync::Mutex;

/// In-process principal store for development and tests.
pub struct MemoryPrincipalStore {
    by_id: DashMap<UserId, PrincipalRecord>,
    // Serialises writes so the email uniqueness check and insert are atomic.
    write_lock: Mutex<()>,
}

impl MemoryPrincipalStore {
    pub fn new() -> Self {
        MemoryPrincipalStore {
            by_id: DashMap::new(),
            write_lock: Mutex::new(()),
        }
    }

    fn email_owner(&self, email: &str) -> Option<UserId> {
        self.by_id
            .iter()
            .find(|entry| entry.email.eq_ignore_ascii_case(email))
            .map(|entry| entry.user_id)
    }
}

impl Default for MemoryPrincipalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PrincipalStore for MemoryPrincipalStore {
    async fn create(&self, record: &PrincipalRecord) -> Result<(), AuthError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| AuthError::Store(e.to_string()))?;
        if self.email_owner(&record.email).is_some() {
            return Err(AuthError::EmailTaken);
        }
        self.by_id.insert(record.user_id, record.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<PrincipalRecord>, AuthError> {
        Ok(self.by_id.get(&user_id).map(|entry| entry.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<PrincipalRecord>, AuthError> {
        Ok(self
            .by_id
            .iter()
            .find(|entry| entry.email.eq_ignore_ascii_case(email))
            .map(|entry| entry.clone()))
    }

    async fn update(&self, record: &PrincipalRecord) -> Result<(), AuthError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| AuthError::Store(e.to_string()))?;
        match self.email_owner(&record.email) {
            Some(owner) if owner != record.user_id => return Err(AuthError::EmailTaken),
            _ => {}
        }
        match self.by_id.get_mut(&record.user_id) {
            Some(mut entry) => {
                *entry = record.clone();
                Ok(())
            }
            None => Err(AuthError::Store(format!("no principal {}", record.user_id))),
        }
    }
}
