use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

pub struct MySqlLoginHistoryRepo {
    pool: MySqlPool,
}

impl MySqlLoginHistoryRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlLoginHistoryRepo { pool }
    }
}

#[async_trait::async_trait]
impl LoginHistoryRepo for MySqlLoginHistoryRepo {
    async fn record(
        &self,
        user_id: UserId,
        user_agent: &str,
        login_time: DateTime<Utc>,
    ) -> Result<LoginRecord, AuthError> {
        let result = sqlx::query(
            r#"
INSERT INTO login_history (user_id, user_agent, login_time)
VALUES (?, ?, ?)
"#,
        )
        .bind(user_id)
        .bind(user_agent)
        .bind(login_time)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|e| AuthError::Store(format!("login_history id: {e}")))?;

        Ok(LoginRecord {
            id,
            user_id,
            user_agent: user_agent.to_string(),
            login_time,
        })
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<LoginRecord>, AuthError> {
        let rows = sqlx::query(
            r#"
SELECT id, user_agent, login_time
FROM login_history
WHERE user_id = ?
ORDER BY login_time DESC, id DESC
"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AuthError::Store(format!("query login history: {e}")))?;

        rows.into_iter()
            .map(|row| -> Result<LoginRecord, AuthError> {
                let user_agent: Option<String> = row
                    .try_get("user_agent")
                    .map_err(|e| AuthError::Store(e.to_string()))?;
                Ok(LoginRecord {
                    id: row.try_get("id").map_err(|e| AuthError::Store(e.to_string()))?,
                    user_id,
                    user_agent: user_agent.unwrap_or_else(|| UNKNOWN_USER_AGENT.to_string()),
                    login_time: row
                        .try_get("login_time")
                        .map_err(|e| AuthError::Store(e.to_string()))?,
                })
            })
            .collect()
    }
}
