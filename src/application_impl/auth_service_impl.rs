use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::Arc;
use tracing::info;
use validator::ValidateEmail;

pub struct Argon2PasswordHasher;

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = argon2::password_hash::SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::InternalError(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| AuthError::InternalError(format!("invalid PHC hash: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::InternalError(format!("verify error: {e}"))),
        }
    }
}

pub struct RealAuthService {
    principal_store: Arc<dyn PrincipalStore>,
    login_history: Arc<dyn LoginHistoryRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
    session_service: Arc<dyn SessionService>,
    clock: Arc<dyn Clock>,
}

impl RealAuthService {
    pub fn new(
        principal_store: Arc<dyn PrincipalStore>,
        login_history: Arc<dyn LoginHistoryRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
        session_service: Arc<dyn SessionService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            principal_store,
            login_history,
            credential_hasher,
            session_service,
            clock,
        }
    }

    fn validate_email(email: &str) -> Result<(), AuthError> {
        if !email.validate_email() {
            return Err(AuthError::Validation("invalid email address".to_string()));
        }
        Ok(())
    }

    fn validate_password(password: &str) -> Result<(), AuthError> {
        if password.is_empty() {
            return Err(AuthError::Validation("password must not be empty".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn signup(&self, request: SignupInput) -> Result<Principal, AuthError> {
        let SignupInput { email, password } = request;
        Self::validate_email(&email)?;
        Self::validate_password(&password)?;

        if self.principal_store.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let record = PrincipalRecord {
            user_id: UserId::new_v4(),
            email,
            password_hash: self.credential_hasher.hash_password(&password).await?,
            created_at: self.clock.now(),
        };
        self.principal_store.create(&record).await?;

        info!(email = %record.email, "principal registered");
        Ok(record.into())
    }

    async fn login(&self, request: LoginInput) -> Result<TokenPair, AuthError> {
        let LoginInput {
            email,
            password,
            user_agent,
        } = request;

        let rec = self
            .principal_store
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let ok = self
            .credential_hasher
            .verify_password(&password, &rec.password_hash)
            .await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        let user_agent = user_agent
            .filter(|ua| !ua.is_empty())
            .unwrap_or_else(|| UNKNOWN_USER_AGENT.to_string());
        self.login_history
            .record(rec.user_id, &user_agent, self.clock.now())
            .await?;

        let tokens = self.session_service.issue(&rec.email).await?;

        info!(email = %rec.email, "principal logged in");
        Ok(tokens)
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        Ok(self.session_service.refresh(refresh_token).await?)
    }

    async fn verify_token(&self, token: &str) -> Result<Principal, AuthError> {
        let payload = self.session_service.authenticate(token).await?;
        let rec = self
            .principal_store
            .find_by_email(&payload.subject)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        Ok(rec.into())
    }

    async fn update(
        &self,
        principal: &Principal,
        request: UpdateInput,
    ) -> Result<Principal, AuthError> {
        let mut rec = self
            .principal_store
            .find_by_id(principal.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if let Some(email) = request.email {
            Self::validate_email(&email)?;
            if let Some(owner) = self.principal_store.find_by_email(&email).await? {
                if owner.user_id != rec.user_id {
                    return Err(AuthError::EmailTaken);
                }
            }
            rec.email = email;
        }

        if let Some(password) = request.password {
            Self::validate_password(&password)?;
            rec.password_hash = self.credential_hasher.hash_password(&password).await?;
        }

        self.principal_store.update(&rec).await?;

        info!(email = %rec.email, "principal updated");
        Ok(rec.into())
    }

    async fn history(&self, principal: &Principal) -> Result<Vec<LoginRecord>, AuthError> {
        self.login_history.list_for_user(principal.id).await
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let payload = self.session_service.authenticate(token).await?;
        self.session_service.revoke(token).await?;

        info!(email = %payload.subject, "principal logged out");
        Ok(())
    }
}
