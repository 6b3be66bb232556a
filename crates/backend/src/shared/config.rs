use contracts::domain::a005_order::checkout::CheckoutPolicy;
use contracts::shared::money::{BasisPoints, Money};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// When absent a secret is generated once and kept in sys_settings
    pub jwt_secret: Option<String>,
    #[serde(default = "default_token_lifetime_hours")]
    pub token_lifetime_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutConfig {
    #[serde(default = "default_tax_rate_bps")]
    pub tax_rate_bps: BasisPoints,
    #[serde(default = "default_delivery_fee")]
    pub delivery_fee: Money,
    #[serde(default = "default_free_delivery_threshold")]
    pub free_delivery_threshold: Money,
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Bootstrap administrator, created when the users table is empty
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    #[serde(default = "default_admin_email")]
    pub email: String,
    #[serde(default = "default_admin_password")]
    pub password: String,
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3000
}

fn default_token_lifetime_hours() -> i64 {
    24
}

fn default_tax_rate_bps() -> BasisPoints {
    CheckoutPolicy::default().tax_rate_bps
}

fn default_delivery_fee() -> Money {
    CheckoutPolicy::default().delivery_fee
}

fn default_free_delivery_threshold() -> Money {
    CheckoutPolicy::default().free_delivery_threshold
}

fn default_currency() -> String {
    "INR".into()
}

fn default_admin_email() -> String {
    "admin@quickcart.local".into()
}

fn default_admin_password() -> String {
    "admin123".into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_lifetime_hours: default_token_lifetime_hours(),
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            tax_rate_bps: default_tax_rate_bps(),
            delivery_fee: default_delivery_fee(),
            free_delivery_threshold: default_free_delivery_threshold(),
            currency: default_currency(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: default_admin_email(),
            password: default_admin_password(),
        }
    }
}

impl CheckoutConfig {
    pub fn policy(&self) -> CheckoutPolicy {
        CheckoutPolicy {
            tax_rate_bps: self.tax_rate_bps,
            delivery_fee: self.delivery_fee,
            free_delivery_threshold: self.free_delivery_threshold,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "data/quickcart.db"

[server]
host = "0.0.0.0"
port = 3000

[auth]
token_lifetime_hours = 24

[checkout]
tax_rate_bps = 500
delivery_fee = 2500
free_delivery_threshold = 49900
currency = "INR"
"#;

/// Load configuration from config.toml
///
/// Search order:
/// 1. Next to the executable
/// 2. Falls back to the embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    if config.checkout.delivery_fee < 0 || config.checkout.free_delivery_threshold < 0 {
        anyhow::bail!("checkout amounts must not be negative");
    }
    if config.auth.token_lifetime_hours <= 0 {
        anyhow::bail!("auth.token_lifetime_hours must be positive");
    }
    Ok(config)
}

/// Makes the configuration available through [`get`]
pub fn install(config: Config) -> anyhow::Result<()> {
    CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("Configuration already installed"))
}

/// Installed configuration, or the embedded default when none was installed
pub fn get() -> &'static Config {
    CONFIG.get_or_init(|| {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|_| Config {
            database: DatabaseConfig {
                path: "data/quickcart.db".into(),
            },
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            checkout: CheckoutConfig::default(),
            admin: AdminConfig::default(),
        })
    })
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> PathBuf {
    let db_path = Path::new(&config.database.path);

    if db_path.is_absolute() {
        return db_path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(db_path);
        }
    }

    PathBuf::from(&config.database.path)
}
