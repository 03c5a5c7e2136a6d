use crate::domain_port::*;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;

pub const DEFAULT_REVOCATION_PREFIX: &str = "revoked";

/// Revocation entries as `<prefix>:<token>` keys with a millisecond TTL.
pub struct RedisRevocationStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisRevocationStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisRevocationStore {
            conn,
            prefix: prefix.into(),
        }
    }

    fn key(&self, token: &str) -> String {
        revocation_key(&self.prefix, token)
    }
}

fn revocation_key(prefix: &str, token: &str) -> String {
    format!("{}:{}", prefix, token)
}

/// Rounded up so the key never expires before the token does.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_nanos().div_ceil(1_000_000))
        .unwrap_or(u64::MAX)
        .max(1)
}

fn unavailable(e: redis::RedisError) -> RevocationStoreError {
    RevocationStoreError::Unavailable(e.to_string())
}

#[async_trait::async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn put(&self, key: &str, ttl: Duration) -> Result<(), RevocationStoreError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let _: () = conn
            .pset_ex(&key, REVOKED_MARKER, ttl_millis(ttl))
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, RevocationStoreError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let found: bool = conn.exists(&key).await.map_err(unavailable)?;
        Ok(found)
    }

    async fn delete(&self, key: &str) -> Result<(), RevocationStoreError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let _: () = conn.del(&key).await.map_err(unavailable)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(revocation_key("revoked", "a.b.c"), "revoked:a.b.c");
    }

    #[test]
    fn ttl_is_rounded_up_to_whole_milliseconds() {
        assert_eq!(ttl_millis(Duration::from_micros(10)), 1);
        assert_eq!(ttl_millis(Duration::from_secs(90)), 90_000);
        assert_eq!(ttl_millis(Duration::from_micros(1_799_999_500)), 1_800_000);
        assert_eq!(ttl_millis(Duration::from_nanos(2_000_001)), 3);
    }

    #[test]
    fn entry_never_outlived_by_token() {
        for remaining in [
            Duration::from_micros(1_799_999_500),
            Duration::from_nanos(1),
            Duration::new(604_799, 999_999_999),
        ] {
            assert!(Duration::from_millis(ttl_millis(remaining)) >= remaining);
        }
    }
}
