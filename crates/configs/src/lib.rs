//! # configs
//!
//! Layered settings for goalboard:
//! built-in defaults, then `config/default.toml`, then
//! `config/{GOALBOARD_ENV}.toml`, then `GOALBOARD__SECTION__KEY` variables.
//! A `.env` file, if present, is read before anything else.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

pub const ENV_PREFIX: &str = "GOALBOARD";
pub const JWT_SECRET_MIN_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub auth: AuthSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: Option<SecretString>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: Option<SecretString>,
    pub token_ttl_secs: u64,
}

impl AuthSettings {
    /// Signing key bytes. Empty only if validation was skipped.
    pub fn secret_bytes(&self) -> &[u8] {
        self.jwt_secret
            .as_ref()
            .map(|s| s.expose_secret().as_bytes())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
}

impl Settings {
    /// Reads every layer from the working directory and the process
    /// environment, then validates the result.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        let env = std::env::var(format!("{ENV_PREFIX}_ENV")).unwrap_or_else(|_| "development".into());

        let cfg = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Self::from_config(cfg)
    }

    /// Built-in defaults, the bottom layer of every load.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("database.max_connections", 10)?
            .set_default("storage.backend", "memory")?
            .set_default("auth.token_ttl_secs", 86_400)?
            .set_default("log.level", "info")?
            .set_default("log.format", "pretty")?)
    }

    pub fn from_config(cfg: Config) -> Result<Self, ConfigError> {
        let settings: Settings = cfg.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }
        match &self.auth.jwt_secret {
            None => return Err(ConfigError::Invalid("auth.jwt_secret is required".into())),
            Some(secret) if secret.expose_secret().len() < JWT_SECRET_MIN_LEN => {
                return Err(ConfigError::Invalid(format!(
                    "auth.jwt_secret must be at least {JWT_SECRET_MIN_LEN} bytes"
                )));
            }
            Some(_) => {}
        }
        if self.auth.token_ttl_secs == 0 {
            return Err(ConfigError::Invalid("auth.token_ttl_secs must be non-zero".into()));
        }
        if self.storage.backend == StorageBackend::Postgres
            && self
                .database
                .url
                .as_ref()
                .is_none_or(|url| url.expose_secret().trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "database.url is required when storage.backend = \"postgres\"".into(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn build(toml: &str) -> Result<Settings, ConfigError> {
        let cfg = Settings::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Settings::from_config(cfg)
    }

    #[test]
    fn defaults_need_only_a_secret() {
        let settings = build(&format!("[auth]\njwt_secret = \"{SECRET}\"")).unwrap();

        assert_eq!(settings.server.bind_addr(), "0.0.0.0:8000");
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.log.format, LogFormat::Pretty);
        assert_eq!(settings.auth.token_ttl_secs, 86_400);
        assert_eq!(settings.auth.secret_bytes(), SECRET.as_bytes());
    }

    #[test]
    fn missing_secret_is_rejected() {
        let err = build("").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("jwt_secret")));
    }

    #[test]
    fn short_secret_is_rejected() {
        let err = build("[auth]\njwt_secret = \"too-short\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("32 bytes")));
    }

    #[test]
    fn postgres_backend_requires_url() {
        let toml = format!("[auth]\njwt_secret = \"{SECRET}\"\n[storage]\nbackend = \"postgres\"");
        assert!(matches!(build(&toml), Err(ConfigError::Invalid(_))));

        let toml = format!(
            "{toml}\n[database]\nurl = \"postgres://localhost/goalboard\"\nmax_connections = 4"
        );
        let settings = build(&toml).unwrap();
        assert_eq!(settings.storage.backend, StorageBackend::Postgres);
        assert_eq!(settings.database.max_connections, 4);
    }

    #[test]
    fn zero_port_is_rejected() {
        let toml = format!("[auth]\njwt_secret = \"{SECRET}\"\n[server]\nport = 0");
        assert!(matches!(build(&toml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unknown_backend_fails_to_load() {
        let toml = format!("[auth]\njwt_secret = \"{SECRET}\"\n[storage]\nbackend = \"sqlite\"");
        assert!(matches!(build(&toml), Err(ConfigError::Load(_))));
    }
}
