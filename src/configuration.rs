use config::{self, ConfigError, Environment};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use sqlx::ConnectOptions;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationConfig,
    pub database: DatabaseConfig,
    pub shopee: ShopeeConfig,
    pub headless: HeadlessConfig,
    pub bank: BankConfig,
    pub storefront: StorefrontConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationConfig {
    pub port: u16,
    pub host: String,
    pub name: String,
    pub workers: usize,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Rest,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub rest: RestDatabaseConfig,
    pub postgres: PostgresConfig,
}

/// Hosted database reached through its REST interface.
#[derive(Debug, Deserialize, Clone)]
pub struct RestDatabaseConfig {
    pub url: String,
    pub service_role_key: SecretString,
    pub timeout_milliseconds: u64,
}

impl RestDatabaseConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }

    /// Base url without trailing slashes.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url().is_empty() && !self.service_role_key.expose_secret().is_empty()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PostgresConfig {
    pub username: String,
    pub password: SecretString,
    pub port: u16,
    pub host: String,
    pub name: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
    #[serde(default)]
    pub run_migrations: bool,
}

impl PostgresConfig {
    pub fn without_db(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db()
            .database(&self.name)
            .log_statements(tracing::log::LevelFilter::Trace)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ShopeeConfig {
    /// Origin used for the item APIs, e.g. `https://shopee.vn`.
    pub base_url: String,
    /// Prefix turning an image hash into a CDN url.
    pub cdn_base_url: String,
    pub timeout_milliseconds: u64,
}

impl ShopeeConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HeadlessConfig {
    pub enabled: bool,
    pub chrome_path: Option<std::path::PathBuf>,
    pub navigation_timeout_seconds: u64,
    pub settle_milliseconds: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BankConfig {
    #[serde(default)]
    pub bin: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub account_name: String,
    #[serde(default)]
    pub bank_name: String,
}

impl BankConfig {
    pub fn is_configured(&self) -> bool {
        !self.bin.trim().is_empty() && !self.account.trim().is_empty()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorefrontConfig {
    pub fallback_image: String,
    pub default_category: String,
    pub default_deal_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub api_key: SecretString,
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| ConfigError::Message(format!("Failed to determine the current directory: {}", e)))?;
    let configuration_directory = base_path.join("configuration");
    let builder = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("configuration.yaml"),
        ))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;
    builder.try_deserialize::<Settings>()
}
