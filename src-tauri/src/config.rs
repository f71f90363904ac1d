use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{PosError, Result};
use crate::models::TaxSettings;

pub const DEFAULT_TAX_RATE_BPS: u32 = 1_000;
pub const DEFAULT_SERVICE_FEE_BPS: u32 = 500;
pub const DEFAULT_LOGIN_DELAY_MS: u64 = 800;
pub const DEFAULT_STOCK_THRESHOLD: u32 = 10;
pub const DEFAULT_LOG_FILTER: &str = "info,resto_pos_lib=debug";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub tax_rate_bps: u32,
    pub service_fee_rate_bps: u32,
    pub login_delay: Duration,
    /// Threshold for the kitchen stock view when a menu item has none.
    pub stock_threshold: u32,
    /// Session record file; `None` keeps the session in memory.
    pub session_file: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            tax_rate_bps: DEFAULT_TAX_RATE_BPS,
            service_fee_rate_bps: DEFAULT_SERVICE_FEE_BPS,
            login_delay: Duration::from_millis(DEFAULT_LOGIN_DELAY_MS),
            stock_threshold: DEFAULT_STOCK_THRESHOLD,
            session_file: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `POS_*` variables, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();
        Ok(AppConfig {
            tax_rate_bps: parse_var(&lookup, "POS_TAX_RATE_BPS")?.unwrap_or(defaults.tax_rate_bps),
            service_fee_rate_bps: parse_var(&lookup, "POS_SERVICE_FEE_BPS")?.unwrap_or(defaults.service_fee_rate_bps),
            login_delay: parse_var::<u64, _>(&lookup, "POS_LOGIN_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.login_delay),
            stock_threshold: parse_var(&lookup, "POS_STOCK_THRESHOLD")?.unwrap_or(defaults.stock_threshold),
            session_file: lookup("POS_SESSION_FILE").filter(|v| !v.is_empty()).map(PathBuf::from),
            log_filter: lookup("POS_LOG").unwrap_or(defaults.log_filter),
        })
    }

    pub fn tax_settings(&self) -> TaxSettings {
        TaxSettings {
            tax_rate_bps: self.tax_rate_bps,
            service_fee_rate_bps: self.service_fee_rate_bps,
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| PosError::Config(format!("{} has invalid value '{}'", key, raw))),
    }
}
