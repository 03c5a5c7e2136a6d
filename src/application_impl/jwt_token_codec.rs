use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::Clock;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SigningAlgorithm {
    #[default]
    Hs256,
    Hs384,
    Hs512,
}

impl From<SigningAlgorithm> for Algorithm {
    fn from(algorithm: SigningAlgorithm) -> Self {
        match algorithm {
            SigningAlgorithm::Hs256 => Algorithm::HS256,
            SigningAlgorithm::Hs384 => Algorithm::HS384,
            SigningAlgorithm::Hs512 => Algorithm::HS512,
        }
    }
}

impl FromStr for SigningAlgorithm {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HS256" => Ok(SigningAlgorithm::Hs256),
            "HS384" => Ok(SigningAlgorithm::Hs384),
            "HS512" => Ok(SigningAlgorithm::Hs512),
            other => Err(TokenError::InvalidConfig(format!(
                "unsupported signing algorithm: {other}"
            ))),
        }
    }
}

/// Loaded once at start-up and handed to [`JwtTokenCodec::try_new`].
#[derive(Clone)]
pub struct TokenConfig {
    pub shared_secret: Vec<u8>,
    pub algorithm: SigningAlgorithm,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    pub fn new(shared_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            shared_secret: shared_secret.into(),
            algorithm: SigningAlgorithm::default(),
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
        }
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("shared_secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(rename = "type")]
    token_type: TokenType,
    exp: i64,
    iat: i64,
    jti: String,
}

pub struct JwtTokenCodec {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenCodec {
    pub fn try_new(cfg: TokenConfig, clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        if cfg.shared_secret.is_empty() {
            return Err(TokenError::InvalidConfig(
                "shared secret must not be empty".to_string(),
            ));
        }
        if cfg.access_ttl.is_zero() {
            return Err(TokenError::InvalidConfig(
                "access token lifetime must be positive".to_string(),
            ));
        }
        if cfg.refresh_ttl <= cfg.access_ttl {
            return Err(TokenError::InvalidConfig(
                "refresh token lifetime must exceed access token lifetime".to_string(),
            ));
        }

        let algorithm = Algorithm::from(cfg.algorithm);
        // Expiry is checked against our own clock after the signature passes.
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(JwtTokenCodec {
            header: Header::new(algorithm),
            encoding_key: EncodingKey::from_secret(&cfg.shared_secret),
            decoding_key: DecodingKey::from_secret(&cfg.shared_secret),
            validation,
            access_ttl: cfg.access_ttl,
            refresh_ttl: cfg.refresh_ttl,
            clock,
        })
    }

    fn mint_at(
        &self,
        subject: &str,
        token_type: TokenType,
        lifetime: Duration,
        now: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), TokenError> {
        if subject.is_empty() {
            return Err(TokenError::Mint("subject must not be empty".to_string()));
        }
        let lifetime = TimeDelta::from_std(lifetime).map_err(|e| TokenError::Mint(e.to_string()))?;
        if lifetime <= TimeDelta::zero() {
            return Err(TokenError::Mint("lifetime must be positive".to_string()));
        }
        let exp_dt = now
            .checked_add_signed(lifetime)
            .ok_or_else(|| TokenError::Mint("expiry out of range".to_string()))?;

        let claims = Claims {
            sub: subject.to_string(),
            token_type,
            exp: exp_dt.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::Mint(e.to_string()))?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| TokenError::Mint("expiry out of range".to_string()))?;
        Ok((token, expires_at))
    }
}

fn classify(error: jsonwebtoken::errors::Error) -> TokenError {
    match error.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    }
}

impl TokenCodec for JwtTokenCodec {
    fn mint(
        &self,
        subject: &str,
        token_type: TokenType,
        lifetime: Duration,
    ) -> Result<String, TokenError> {
        let (token, _) = self.mint_at(subject, token_type, lifetime, self.clock.now())?;
        Ok(token)
    }

    fn mint_pair(&self, subject: &str) -> Result<TokenPair, TokenError> {
        let now = self.clock.now();
        let (access_token, access_exp) =
            self.mint_at(subject, TokenType::Access, self.access_ttl, now)?;
        let (refresh_token, refresh_exp) =
            self.mint_at(subject, TokenType::Refresh, self.refresh_ttl, now)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: BEARER.to_string(),
            access_token_expires_at: access_exp,
            refresh_token_expires_at: refresh_exp,
        })
    }

    fn parse(&self, token: &str) -> Result<TokenPayload, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(classify)?;
        let claims = data.claims;
        if claims.sub.is_empty() {
            return Err(TokenError::Malformed);
        }

        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::Malformed)?;
        let issued_at = DateTime::from_timestamp(claims.iat, 0).ok_or(TokenError::Malformed)?;
        if self.clock.now() >= expires_at {
            return Err(TokenError::Expired);
        }

        Ok(TokenPayload {
            subject: claims.sub,
            token_type: claims.token_type,
            expires_at,
            issued_at,
            id: claims.jti,
        })
    }
}
