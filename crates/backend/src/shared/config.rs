use crate::shared::months::MonthPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub commission: CommissionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Tuning knobs of the commission engine
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CommissionConfig {
    /// Write a progress checkpoint every N orders
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
    /// Rows per delete batch when purging a month
    #[serde(default = "default_delete_chunk_size")]
    pub delete_chunk_size: u64,
    /// Orders fetched per page while streaming a month
    #[serde(default = "default_order_page_size")]
    pub order_page_size: u64,
    /// Prior orders inspected when classifying a customer
    #[serde(default = "default_history_window")]
    pub history_window: u64,
    #[serde(default = "default_worker_interval")]
    pub worker_interval_seconds: u64,
    #[serde(default)]
    pub month_policy: MonthPolicy,
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self {
            progress_every: default_progress_every(),
            delete_chunk_size: default_delete_chunk_size(),
            order_page_size: default_order_page_size(),
            history_window: default_history_window(),
            worker_interval_seconds: default_worker_interval(),
            month_policy: MonthPolicy::default(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_progress_every() -> usize {
    5
}

fn default_delete_chunk_size() -> u64 {
    450
}

fn default_order_page_size() -> u64 {
    500
}

fn default_history_window() -> u64 {
    10
}

fn default_worker_interval() -> u64 {
    5
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/commissions.db"

[server]
port = 3000

[commission]
progress_every = 5
delete_chunk_size = 450
order_page_size = 500
history_window = 10
worker_interval_seconds = 5
month_policy = "thirty_day"
"#;

/// Load configuration from config.toml
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    Ok(PathBuf::from(db_path_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Result<Config, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.database.path, "target/db/commissions.db");
        assert_eq!(config.commission, CommissionConfig::default());
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_partial_commission_section() {
        let src = r#"
            [database]
            path = "x.db"

            [commission]
            progress_every = 25
            month_policy = "calendar"
        "#;
        let config: Config = toml::from_str(src).unwrap();
        assert_eq!(config.commission.progress_every, 25);
        assert_eq!(config.commission.month_policy, MonthPolicy::Calendar);
        assert_eq!(config.commission.delete_chunk_size, 450);
        assert_eq!(config.server.port, 3000);
    }
}
