use crate::analysis;
use crate::config::Config;
use crate::errors::Result;
use crate::market_data::base::BarSource;
use crate::models::analysis::AnalysisResult;
use crate::sheets::publisher::LabelPublisher;
use log::{info, warn};
use std::sync::Arc;

/// What a successful cycle did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Upstream had no bars; nothing was published.
    NoData,
    /// The label was written to the target.
    Published(AnalysisResult),
}

/// One fetch -> analyze -> publish pass
pub struct TrendService {
    config: Arc<Config>,
    source: Box<dyn BarSource + Send + Sync>,
    publisher: Box<dyn LabelPublisher + Send + Sync>,
}

impl TrendService {
    pub fn new(
        config: Arc<Config>,
        source: Box<dyn BarSource + Send + Sync>,
        publisher: Box<dyn LabelPublisher + Send + Sync>,
    ) -> Self {
        Self {
            config,
            source,
            publisher,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs one full cycle. An empty bar series ends the cycle early without
    /// touching the target.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let symbol = &self.config.symbol;
        let window = self.config.ma_window;
        info!(
            "Starting {} MA update cycle via {}...",
            symbol,
            self.source.provider_name()
        );

        let series = self.source.fetch_daily_bars(symbol, window).await?;
        if series.is_empty() {
            warn!("No bars returned for {}; skipping sheet update.", symbol);
            return Ok(CycleOutcome::NoData);
        }

        let result = analysis::analyze(&series, window)?;

        self.publisher.publish_label(result.label).await?;

        info!(
            "Finished cycle. {} is now '{}' (diff vs MA: {:.2}%).",
            self.publisher.target(),
            result.label,
            result.diff_percent
        );
        Ok(CycleOutcome::Published(result))
    }
}
