use ma_trend_sheet::market_data::alpaca::AlpacaClient;
use ma_trend_sheet::sheets::publisher::SheetPublisher;
use ma_trend_sheet::{Config, Scheduler, TokioSleeper, TrendService};

use anyhow::Context;
use log::info;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration from environment")?;

    // Initialize logger
    env_logger::Builder::new()
        .parse_filters(&config.log_level)
        .format_timestamp_secs()
        .init();

    let config = Arc::new(config);

    info!(
        "{} MA bot starting. Sheet='{}', tab='{}', cell='{}', window={}, interval={}s",
        config.symbol,
        config.sheet_name,
        config.tab_name,
        config.target_cell,
        config.ma_window,
        config.refresh_interval.as_secs()
    );

    let source = AlpacaClient::new(Arc::clone(&config)).context("failed to build market data client")?;
    let publisher = SheetPublisher::new(Arc::clone(&config)).context("failed to build sheet publisher")?;

    let service = TrendService::new(config, Box::new(source), Box::new(publisher));
    let scheduler = Scheduler::new(service, TokioSleeper);

    scheduler.run_forever().await;
    Ok(())
}
