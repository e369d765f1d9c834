use crate::errors::Result;
use crate::models::bar::BarSeries;
use async_trait::async_trait;

/// Source of daily price bars
#[async_trait]
pub trait BarSource {
    /// Name of the upstream provider, for logs
    fn provider_name(&self) -> &'static str;

    /// Fetch up to `limit` of the most recent daily bars for `symbol`.
    /// Returns them oldest first. An empty series is a valid answer.
    async fn fetch_daily_bars(&self, symbol: &str, limit: usize) -> Result<BarSeries>;
}
