use crate::errors::{Result, TrendBotError};
use crate::sheets::range;
use log::LevelFilter;
use secrecy::SecretString;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_SYMBOL: &str = "ALPACA_SYMBOL";
pub const ENV_MA_WINDOW: &str = "MA_WINDOW";
pub const ENV_SHEET_NAME: &str = "GOOGLE_SHEET_NAME";
pub const ENV_TAB_NAME: &str = "DASHBOARD_TAB_NAME";
pub const ENV_TARGET_CELL: &str = "TARGET_CELL";
pub const ENV_REFRESH_INTERVAL: &str = "REFRESH_INTERVAL_SECONDS";
pub const ENV_DATA_BASE_URL: &str = "ALPACA_DATA_BASE_URL";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_ALPACA_KEY_ID: &str = "ALPACA_API_KEY_ID";
pub const ENV_ALPACA_SECRET_KEY: &str = "ALPACA_API_SECRET_KEY";
pub const ENV_SERVICE_ACCOUNT_JSON: &str = "GOOGLE_SERVICE_ACCOUNT_JSON";

const DEFAULT_SYMBOL: &str = "RSP";
const DEFAULT_MA_WINDOW: usize = 960;
const DEFAULT_SHEET_NAME: &str = "Active-Investing";
const DEFAULT_TAB_NAME: &str = "Dashboard";
const DEFAULT_TARGET_CELL: &str = "T3";
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3600;
const DEFAULT_DATA_BASE_URL: &str = "https://data.alpaca.markets";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Process-wide settings, resolved once at startup and shared read-only.
///
/// Credentials are optional here: a missing key only fails the cycle that
/// needs it, so the process keeps running and picks up nothing new until it
/// is restarted with the secret in place.
#[derive(Debug)]
pub struct Config {
    pub symbol: String,
    pub ma_window: usize,
    pub sheet_name: String,
    pub tab_name: String,
    pub target_cell: String,
    pub refresh_interval: Duration,
    pub data_base_url: String,
    pub log_level: String,
    pub alpaca_key_id: Option<SecretString>,
    pub alpaca_secret_key: Option<SecretString>,
    pub service_account_json: Option<SecretString>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            ma_window: DEFAULT_MA_WINDOW,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            tab_name: DEFAULT_TAB_NAME.to_string(),
            target_cell: DEFAULT_TARGET_CELL.to_string(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            data_base_url: DEFAULT_DATA_BASE_URL.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            alpaca_key_id: None,
            alpaca_secret_key: None,
            service_account_json: None,
        }
    }

    /// Reads every setting from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary name -> value lookup.
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let secret = |name: &str| get(name).map(|v| SecretString::new(v.into()));

        let mut config = Self::new();

        if let Some(symbol) = get(ENV_SYMBOL) {
            config = config.with_symbol(&symbol);
        }
        if let Some(window) = get(ENV_MA_WINDOW) {
            config = config.with_ma_window(parse_positive(ENV_MA_WINDOW, &window)? as usize);
        }
        if let Some(sheet) = get(ENV_SHEET_NAME) {
            config = config.with_sheet_name(&sheet);
        }
        if let Some(tab) = get(ENV_TAB_NAME) {
            config = config.with_tab_name(&tab);
        }
        if let Some(cell) = get(ENV_TARGET_CELL) {
            config = config.with_target_cell(&cell);
        }
        if let Some(secs) = get(ENV_REFRESH_INTERVAL) {
            let secs = parse_positive(ENV_REFRESH_INTERVAL, &secs)?;
            config = config.with_refresh_interval(Duration::from_secs(secs));
        }
        if let Some(url) = get(ENV_DATA_BASE_URL) {
            config = config.with_data_base_url(&url);
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            config.log_level = normalize_log_level(&level);
        }

        config.alpaca_key_id = secret(ENV_ALPACA_KEY_ID);
        config.alpaca_secret_key = secret(ENV_ALPACA_SECRET_KEY);
        config.service_account_json = secret(ENV_SERVICE_ACCOUNT_JSON);

        config.validate()?;
        Ok(config)
    }

    pub fn with_symbol(mut self, symbol: &str) -> Self {
        self.symbol = symbol.to_string();
        self
    }

    pub fn with_ma_window(mut self, window: usize) -> Self {
        self.ma_window = window;
        self
    }

    pub fn with_sheet_name(mut self, name: &str) -> Self {
        self.sheet_name = name.to_string();
        self
    }

    pub fn with_tab_name(mut self, name: &str) -> Self {
        self.tab_name = name.to_string();
        self
    }

    pub fn with_target_cell(mut self, cell: &str) -> Self {
        self.target_cell = cell.to_uppercase();
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_data_base_url(mut self, url: &str) -> Self {
        self.data_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_alpaca_credentials(mut self, key_id: &str, secret_key: &str) -> Self {
        self.alpaca_key_id = Some(SecretString::new(key_id.into()));
        self.alpaca_secret_key = Some(SecretString::new(secret_key.into()));
        self
    }

    pub fn with_service_account_json(mut self, json: &str) -> Self {
        self.service_account_json = Some(SecretString::new(json.into()));
        self
    }

    /// Checks the non-secret settings. Credentials are checked by the
    /// component that uses them.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(TrendBotError::Configuration("symbol must not be empty".into()));
        }
        if self.ma_window == 0 {
            return Err(TrendBotError::Configuration(format!(
                "{} must be at least 1",
                ENV_MA_WINDOW
            )));
        }
        if self.refresh_interval.is_zero() {
            return Err(TrendBotError::Configuration(format!(
                "{} must be at least 1 second",
                ENV_REFRESH_INTERVAL
            )));
        }
        if self.sheet_name.trim().is_empty() || self.tab_name.trim().is_empty() {
            return Err(TrendBotError::Configuration(
                "sheet and tab names must not be empty".into(),
            ));
        }
        range::validate_cell_address(&self.target_cell)?;
        validate_log_filter(&self.log_level)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_positive(name: &str, raw: &str) -> Result<u64> {
    raw.parse::<u64>().map_err(|e| {
        TrendBotError::Configuration(format!("{} must be a positive integer, got '{}': {}", name, raw, e))
    })
}

/// Lowercases a level name and maps the aliases `warning`, `critical` and
/// `fatal` onto the logger's own level names.
fn normalize_log_level(raw: &str) -> String {
    let level = raw.to_lowercase();
    match level.as_str() {
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        _ => level,
    }
}

/// A bare word must be a level name. Directive lists such as
/// `ma_trend_sheet=debug,reqwest=warn` are passed through.
fn validate_log_filter(filter: &str) -> Result<()> {
    if filter.contains('=') || filter.contains(',') || filter.contains('/') {
        return Ok(());
    }
    LevelFilter::from_str(filter).map(|_| ()).map_err(|_| {
        TrendBotError::Configuration(format!(
            "{} must be one of off, error, warn, info, debug, trace; got '{}'",
            ENV_LOG_LEVEL, filter
        ))
    })
}
