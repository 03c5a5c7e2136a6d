use super::util::is_dup_key;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlPrincipalStore {
    pool: MySqlPool,
}

impl MySqlPrincipalStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlPrincipalStore { pool }
    }

    fn row_to_record(row: MySqlRow) -> Result<PrincipalRecord, AuthError> {
        let user_id: UserId = row
            .try_get("user_id")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let email: String = row
            .try_get("email")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(PrincipalRecord {
            user_id,
            email,
            password_hash,
            created_at,
        })
    }

    fn write_error(e: sqlx::Error) -> AuthError {
        if is_dup_key(&e) {
            AuthError::EmailTaken
        } else {
            AuthError::Store(e.to_string())
        }
    }
}

#[async_trait::async_trait]
impl PrincipalStore for MySqlPrincipalStore {
    async fn create(&self, record: &PrincipalRecord) -> Result<(), AuthError> {
        sqlx::query(
            r#"
INSERT INTO principal (user_id, email, password_hash, created_at)
VALUES (?, ?, ?, ?)
"#,
        )
        .bind(record.user_id)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(Self::write_error)?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<PrincipalRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT user_id, email, password_hash, created_at
FROM principal
WHERE user_id = ?
"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<PrincipalRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT user_id, email, password_hash, created_at
FROM principal
WHERE email = ?
"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn update(&self, record: &PrincipalRecord) -> Result<(), AuthError> {
        let result = sqlx::query(
            r#"
UPDATE principal
SET email = ?, password_hash = ?
WHERE user_id = ?
"#,
        )
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.user_id)
        .execute(&self.pool)
        .await
        .map_err(Self::write_error)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::Store(format!("no principal {}", record.user_id)));
        }
        Ok(())
    }
}
