use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "MedStock";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Search radius used when the caller does not supply one.
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// Upper bound (inclusive) for stock and discount prices.
pub const MAX_STOCK_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 2);

pub const MAX_BATCH_NUMBER_LEN: usize = 50;

/// Cap on lexical candidates loaded before distance filtering.
pub const MAX_SEARCH_CANDIDATES: usize = 1000;

pub const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 8080));
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

pub const ENV_DB_PATH: &str = "MEDSTOCK_DB_PATH";
pub const ENV_BIND_ADDR: &str = "MEDSTOCK_BIND_ADDR";
pub const ENV_MAX_CANDIDATES: &str = "MEDSTOCK_MAX_CANDIDATES";
pub const ENV_BUSY_TIMEOUT_MS: &str = "MEDSTOCK_BUSY_TIMEOUT_MS";

/// Filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "medstock_lib=info,medstock=info,tower_http=warn"
}

/// Get the application data directory
/// Falls back to the working directory when the platform has no data dir.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default SQLite file location.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("medstock.db")
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Runtime settings for the binary and the HTTP boundary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub max_candidates: usize,
    pub busy_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source; unset variables take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_path = lookup(ENV_DB_PATH)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let bind_addr = parse_var(&lookup, ENV_BIND_ADDR, DEFAULT_BIND_ADDR)?;
        let max_candidates = parse_var(&lookup, ENV_MAX_CANDIDATES, MAX_SEARCH_CANDIDATES)?;
        if max_candidates == 0 {
            return Err(ConfigError::InvalidValue {
                var: ENV_MAX_CANDIDATES,
                value: "0".into(),
            });
        }
        let busy_timeout_ms = parse_var(&lookup, ENV_BUSY_TIMEOUT_MS, DEFAULT_BUSY_TIMEOUT_MS)?;

        Ok(Self {
            db_path,
            bind_addr,
            max_candidates,
            busy_timeout: Duration::from_millis(busy_timeout_ms),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            bind_addr: DEFAULT_BIND_ADDR,
            max_candidates: MAX_SEARCH_CANDIDATES,
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
        _ => Ok(default),
    }
}
