//! Configuration for the standalone server.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use manageusers::ManageUsersConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub manage_users: ManageUsersConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Send SIGUSR1 to this process after each user change.
    #[serde(default = "default_true")]
    pub reload_signal: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            reload_signal: default_true(),
        }
    }
}

/// Content served behind the middleware.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SiteConfig {
    /// Directory of static files. Without one, unmatched paths get a 404.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    2015
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file, environment variables and directive arguments.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Positional arguments: route, htpasswd file, user info file
    /// 2. Environment variables (MANAGEUSERS__SECTION__KEY format)
    /// 3. config.toml file (if present)
    /// 4. Built-in defaults
    pub fn load(args: &[String]) -> Result<Self, ConfigError> {
        let loader = ConfigLoader::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("MANAGEUSERS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = loader.try_deserialize()?;
        config.manage_users.apply_directive_args(args);
        Ok(config)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
