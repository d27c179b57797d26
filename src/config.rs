use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub root: RootConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub subscription: SubscriptionConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on handling a single request, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

fn default_request_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiration_days: i64,
}

/// Admin account created on first start if missing.
#[derive(Debug, Deserialize, Clone)]
pub struct RootConfig {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AdminConfig {
    /// Code employees enter to sign up as admin. Empty disables it.
    #[serde(default)]
    pub signup_code: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubscriptionConfig {
    #[serde(default = "default_barrels")]
    pub default_barrels: u32,
    #[serde(default = "default_validity_days")]
    pub validity_days: u32,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            default_barrels: default_barrels(),
            validity_days: default_validity_days(),
        }
    }
}

fn default_barrels() -> u32 {
    12
}

fn default_validity_days() -> u32 {
    365
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DGAS__DATABASE__URL, etc.)
    /// 2. Config file specified by path
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        builder = builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "sqlite:dgas.db")?
            .set_default("database.max_connections", 5)?
            .set_default("jwt.issuer", "dgas")?
            .set_default("jwt.audience", "dgas")?
            .set_default("jwt.expiration_days", 7)?
            .set_default("root.email", "admin@dgas.localhost")?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("DGAS")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt.secret.len() < 32 {
            return Err("JWT secret must be at least 32 characters long".to_string());
        }
        if self.jwt.expiration_days < 1 {
            return Err("JWT expiration_days must be at least 1".to_string());
        }
        if self.database.max_connections < 1 {
            return Err("Database max_connections must be at least 1".to_string());
        }
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if self.root.password.len() < 6 {
            return Err("Root password must be at least 6 characters long".to_string());
        }
        if self.subscription.default_barrels < 1 || self.subscription.validity_days < 1 {
            return Err("Subscription defaults must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn identity_policy(&self) -> dgas_identity::Policy {
        dgas_identity::Policy {
            admin_signup_code: Some(self.admin.signup_code.to_owned())
                .filter(|code| !code.is_empty()),
            default_barrels: self.subscription.default_barrels,
            validity_days: self.subscription.validity_days,
            session_ttl_secs: self.jwt.expiration_days * 24 * 60 * 60,
        }
    }
}
