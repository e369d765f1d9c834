use crate::config::{Config, ENV_ALPACA_KEY_ID, ENV_ALPACA_SECRET_KEY};
use crate::errors::{Result, TrendBotError};
use crate::market_data::base::BarSource;
use crate::market_data::response::parse_bars_body;
use crate::models::bar::BarSeries;
use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use log::{debug, error, info, warn};
use reqwest::Client;
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;

const KEY_ID_HEADER: &str = "APCA-API-KEY-ID";
const SECRET_KEY_HEADER: &str = "APCA-API-SECRET-KEY";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest `limit` the bars endpoint serves in one page.
pub const MAX_BARS_PER_REQUEST: usize = 10_000;

/// Alpaca market data client for daily stock bars
pub struct AlpacaClient {
    client: Client,
    config: Arc<Config>,
}

impl AlpacaClient {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(TrendBotError::Request)?;

        Ok(Self::with_client(config, client))
    }

    /// Uses a caller-built HTTP client instead of the default one.
    pub fn with_client(config: Arc<Config>, client: Client) -> Self {
        Self { client, config }
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        match (&self.config.alpaca_key_id, &self.config.alpaca_secret_key) {
            (Some(key), Some(secret)) => Ok((key.expose_secret(), secret.expose_secret())),
            _ => Err(TrendBotError::Configuration(format!(
                "Missing Alpaca API credentials. Ensure {} and {} are set.",
                ENV_ALPACA_KEY_ID, ENV_ALPACA_SECRET_KEY
            ))),
        }
    }
}

/// Query for the `limit` most recent daily bars.
///
/// Without a `start` the API only returns today's bar, so the range is
/// opened far enough back to cover `limit` trading days and sorted newest
/// first; the caller re-sorts ascending.
pub fn daily_bars_query(limit: usize, today: NaiveDate) -> Result<Vec<(&'static str, String)>> {
    let start = (limit as u64)
        .checked_mul(3)
        .and_then(|days| (days / 2).checked_add(14))
        .and_then(|days| today.checked_sub_days(Days::new(days)))
        .ok_or_else(|| {
            TrendBotError::Configuration(format!(
                "bar limit {} reaches past the earliest representable date",
                limit
            ))
        })?;

    Ok(vec![
        ("timeframe", "1Day".to_string()),
        ("limit", limit.to_string()),
        ("adjustment", "all".to_string()),
        ("sort", "desc".to_string()),
        ("start", start.format("%Y-%m-%d").to_string()),
    ])
}

#[async_trait]
impl BarSource for AlpacaClient {
    fn provider_name(&self) -> &'static str {
        "Alpaca"
    }

    async fn fetch_daily_bars(&self, symbol: &str, limit: usize) -> Result<BarSeries> {
        if symbol.trim().is_empty() {
            return Err(TrendBotError::Configuration("symbol must not be empty".into()));
        }
        if limit == 0 {
            return Err(TrendBotError::Configuration("bar limit must be at least 1".into()));
        }
        let (key_id, secret_key) = self.credentials()?;

        let limit = if limit > MAX_BARS_PER_REQUEST {
            warn!(
                "Requested {} bars; {} serves at most {} per request.",
                limit,
                self.provider_name(),
                MAX_BARS_PER_REQUEST
            );
            MAX_BARS_PER_REQUEST
        } else {
            limit
        };

        let url = format!("{}/v2/stocks/{}/bars", self.config.data_base_url, symbol);
        let query = daily_bars_query(limit, Utc::now().date_naive())?;

        info!(
            "Requesting {} daily bars for {} from {}: {} with params {:?}",
            limit,
            symbol,
            self.provider_name(),
            url,
            query
        );

        let response = self
            .client
            .get(&url)
            .query(&query)
            .header(KEY_ID_HEADER, key_id)
            .header(SECRET_KEY_HEADER, secret_key)
            .send()
            .await?;

        let status = response.status();
        debug!("{} response status: {}", self.provider_name(), status);

        let body = response.text().await?;
        if !status.is_success() {
            error!("Error response from {}: {}", self.provider_name(), body);
            return Err(TrendBotError::Upstream(format!(
                "{} returned {} for {}: {}",
                self.provider_name(),
                status,
                symbol,
                body
            )));
        }

        let series = parse_bars_body(symbol, &body)?;
        info!("Received {} bars for {}.", series.len(), symbol);

        if series.is_empty() {
            warn!("No bars returned for {}. Check symbol or permissions.", symbol);
            return Ok(series);
        }

        if let (Some(first), Some(last)) = (series.first(), series.last()) {
            debug!(
                "First bar: t={} o={:.4} h={:.4} l={:.4} c={:.4} v={}",
                first.timestamp, first.open, first.high, first.low, first.close, first.volume
            );
            debug!(
                "Last bar: t={} o={:.4} h={:.4} l={:.4} c={:.4} v={}",
                last.timestamp, last.open, last.high, last.low, last.close, last.volume
            );
        }
        debug!("Last 5 closes for {}:", symbol);
        for bar in series.tail(5) {
            debug!("  t={} c={:.4}", bar.timestamp, bar.close);
        }

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_bars_query() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let query = daily_bars_query(960, today).unwrap();

        let get = |key: &str| {
            query
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
                .unwrap()
        };
        assert_eq!(get("timeframe"), "1Day");
        assert_eq!(get("limit"), "960");
        assert_eq!(get("adjustment"), "all");
        assert_eq!(get("sort"), "desc");
        // 960 * 3 / 2 + 14 = 1454 days back
        assert_eq!(get("start"), "2021-06-09");
    }

    #[test]
    fn test_daily_bars_query_out_of_range_is_error() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        let err = daily_bars_query(100_000_000, today).unwrap_err();
        assert!(matches!(err, TrendBotError::Configuration(_)));

        let err = daily_bars_query(usize::MAX, today).unwrap_err();
        assert!(matches!(err, TrendBotError::Configuration(_)));

        // The page maximum still maps to a real date.
        assert!(daily_bars_query(MAX_BARS_PER_REQUEST, today).is_ok());
    }

    #[tokio::test]
    async fn test_missing_credentials_is_configuration_error() {
        let client = AlpacaClient::new(Arc::new(Config::new())).unwrap();
        let err = client.fetch_daily_bars("RSP", 10).await.unwrap_err();
        assert!(matches!(err, TrendBotError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_rejects_empty_symbol_and_zero_limit() {
        let config = Config::new().with_alpaca_credentials("k", "s");
        let client = AlpacaClient::new(Arc::new(config)).unwrap();

        let err = client.fetch_daily_bars("  ", 10).await.unwrap_err();
        assert!(matches!(err, TrendBotError::Configuration(_)));

        let err = client.fetch_daily_bars("RSP", 0).await.unwrap_err();
        assert!(matches!(err, TrendBotError::Configuration(_)));
    }
}
