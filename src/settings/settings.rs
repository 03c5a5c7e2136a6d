use crate::infra_redis::DEFAULT_REVOCATION_PREFIX;
use anyhow::{Result, anyhow};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub token: Token,
    #[serde(default)]
    pub revocation: Revocation,
    #[serde(default)]
    pub account: Account,
    #[serde(default)]
    pub http: Http,
    #[serde(default)]
    pub log: Log,
}

#[derive(Deserialize)]
pub struct Token {
    pub shared_secret: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: String, // "HS256", "HS384" or "HS512"
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: u64,
    #[serde(default = "default_refresh_ttl_secs")]
    pub refresh_ttl_secs: u64,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("shared_secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(default)]
pub struct Revocation {
    pub backend: String, // "memory" or "redis"
    pub redis_url: String,
    pub prefix: String,
    pub timeout_ms: u64,
    pub policy: String, // "fail_closed" or "fail_open"
    pub sweep_interval_secs: u64,
}

impl fmt::Debug for Revocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Revocation")
            .field("backend", &self.backend)
            .field("redis_url", &"<redacted>")
            .field("prefix", &self.prefix)
            .field("timeout_ms", &self.timeout_ms)
            .field("policy", &self.policy)
            .field("sweep_interval_secs", &self.sweep_interval_secs)
            .finish()
    }
}

impl Default for Revocation {
    fn default() -> Self {
        Revocation {
            backend: "memory".to_string(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            prefix: DEFAULT_REVOCATION_PREFIX.to_string(),
            timeout_ms: 500,
            policy: "fail_closed".to_string(),
            sweep_interval_secs: 60,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
pub struct Account {
    pub backend: String, // "memory" or "mysql"
    pub mysql_dsn: Option<String>,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("backend", &self.backend)
            .field("mysql_dsn", &self.mysql_dsn.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for Account {
    fn default() -> Self {
        Account {
            backend: "memory".to_string(),
            mysql_dsn: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Http {
    pub address: String,
}

impl Default for Http {
    fn default() -> Self {
        Http {
            address: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Log {
    pub filter: String,
}

impl Default for Log {
    fn default() -> Self {
        Log {
            filter: "info".to_string(),
        }
    }
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_access_ttl_secs() -> u64 {
    30 * 60
}

fn default_refresh_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

const ENV_PREFIX: &str = "LATCHKEY";

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Settings> {
    let settings: Settings = builder
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    if settings.token.shared_secret.is_empty() {
        return Err(anyhow!("token.shared_secret must be set"));
    }

    Ok(settings)
}

/// Read settings from `path` (or the build profile's default file), then
/// apply `LATCHKEY__SECTION__KEY` environment overrides.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);
    finish(Config::builder().add_source(File::with_name(path)))
}

pub fn parse_settings_str(toml: &str) -> Result<Settings> {
    finish(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let settings = parse_settings_str(
            r#"
[token]
shared_secret = "s3cret"
"#,
        )
        .unwrap();

        assert_eq!(settings.token.algorithm, "HS256");
        assert_eq!(settings.token.access_ttl_secs, 1800);
        assert_eq!(settings.token.refresh_ttl_secs, 604_800);
        assert_eq!(settings.revocation.backend, "memory");
        assert_eq!(settings.revocation.policy, "fail_closed");
        assert_eq!(settings.account.backend, "memory");
        assert_eq!(settings.http.address, "127.0.0.1:8080");
        assert_eq!(settings.log.filter, "info");
    }

    #[test]
    fn explicit_values_win() {
        let settings = parse_settings_str(
            r#"
[token]
shared_secret = "s3cret"
algorithm = "HS512"
access_ttl_secs = 60

[revocation]
backend = "redis"
timeout_ms = 100
"#,
        )
        .unwrap();

        assert_eq!(settings.token.algorithm, "HS512");
        assert_eq!(settings.token.access_ttl_secs, 60);
        assert_eq!(settings.revocation.backend, "redis");
        assert_eq!(settings.revocation.timeout_ms, 100);
        assert_eq!(settings.revocation.prefix, "revoked");
    }

    #[test]
    fn secret_is_required() {
        assert!(parse_settings_str("[token]\nshared_secret = \"\"\n").is_err());
        assert!(parse_settings_str("[http]\naddress = \"0.0.0.0:80\"\n").is_err());
        assert!(parse_settings(Some("")).is_err());
    }

    #[test]
    fn debug_output_hides_secret() {
        let settings = parse_settings_str("[token]\nshared_secret = \"s3cret\"\n").unwrap();
        assert!(!format!("{settings:?}").contains("s3cret"));
    }

    #[test]
    fn debug_output_hides_database_credentials() {
        let settings = parse_settings_str(
            r#"
[token]
shared_secret = "s3cret"

[account]
backend = "mysql"
mysql_dsn = "mysql://app:hunter22@db:3306/latchkey"

[revocation]
redis_url = "redis://:hunter22@cache:6379"
"#,
        )
        .unwrap();

        let rendered = format!("{settings:?}");
        assert!(rendered.contains("mysql"));
        assert!(!rendered.contains("hunter22"));
    }
}
