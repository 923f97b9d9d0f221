use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration problems caught at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var} must be at least 1 second")]
    ZeroInterval { var: &'static str },
}

/// Runtime configuration, loaded from the environment. A `.env` file is
/// honored via dotenv in `main`; every variable has a default, so the
/// daemon runs unconfigured against a local backend.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Metrics backend base URL
    pub base_url: String,
    /// Directory the chart PNGs are written into
    pub output_dir: PathBuf,
    /// Period of the system charts family
    pub system_interval: Duration,
    /// Period of the snapshot and per-symbol chart families
    pub stock_interval: Duration,
    /// History window for the system charts, in hours
    pub system_window_hours: u32,
    /// Optional history window for the per-symbol charts
    pub stock_window_hours: Option<u32>,
    /// Fixed symbol list; `None` means fetch the list from the backend
    pub symbols: Option<Vec<String>>,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            output_dir: PathBuf::from("charts"),
            system_interval: Duration::from_secs(60),
            stock_interval: Duration::from_secs(300),
            system_window_hours: 24,
            stock_window_hours: None,
            symbols: None,
            chart_width: 1024,
            chart_height: 768,
        }
    }
}

impl DashboardConfig {
    /// Read the full configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            base_url: env::var("METRICS_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            output_dir: env::var("CHART_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            system_interval: refresh_period("SYSTEM_REFRESH_SECS", 60)?,
            stock_interval: refresh_period("STOCK_REFRESH_SECS", 300)?,
            system_window_hours: parse_var("SYSTEM_HISTORY_HOURS", 24)?,
            stock_window_hours: parse_optional("STOCK_HISTORY_HOURS")?,
            symbols: env::var("STOCK_SYMBOLS")
                .ok()
                .map(|raw| parse_symbol_list(&raw))
                .filter(|list| !list.is_empty()),
            chart_width: parse_var("CHART_WIDTH", 1024)?,
            chart_height: parse_var("CHART_HEIGHT", 768)?,
        })
    }
}

/// Parse a refresh period. The interval loops require a period of at
/// least one second; zero is rejected here so it can never reach them.
fn refresh_period(var: &'static str, default: u64) -> Result<Duration, ConfigError> {
    let secs = parse_var(var, default)?;
    if secs == 0 {
        return Err(ConfigError::ZeroInterval { var });
    }
    Ok(Duration::from_secs(secs))
}

fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
        Err(_) => Ok(default),
    }
}

fn parse_optional<T: FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
        Err(_) => Ok(None),
    }
}

/// Split a comma-separated symbol override, trimming and uppercasing
fn parse_symbol_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
