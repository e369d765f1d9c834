use crate::errors::{Result, TrendBotError};
use crate::models::analysis::{AnalysisResult, TrendLabel};
use crate::models::bar::BarSeries;
use log::{debug, info, warn};

/// Prices strictly above `moving_average * WEAK_THRESHOLD` are labelled WEAK.
pub const WEAK_THRESHOLD: f64 = 1.10;

/// Arithmetic mean of the trailing `window` closes.
///
/// If the series is shorter than `window`, the window shrinks to the
/// number of bars available instead of failing.
pub fn compute_moving_average(series: &BarSeries, window: usize) -> Result<f64> {
    if series.is_empty() {
        return Err(TrendBotError::InsufficientData(format!(
            "no bars available for {} to compute moving average",
            series.symbol()
        )));
    }
    if window == 0 {
        return Err(TrendBotError::InsufficientData(
            "moving average window must be at least 1".into(),
        ));
    }

    let mut window = window;
    if series.len() < window {
        warn!(
            "Only {} closes available; requested window is {}. Will compute MA over available closes.",
            series.len(),
            window
        );
        window = series.len();
    }

    let used = series.tail(window);
    let sum: f64 = used.iter().map(|b| b.close).sum();
    let ma = sum / window as f64;

    if let (Some(first), Some(last)) = (used.first(), used.last()) {
        debug!(
            "MA window for {}: {} bars from {} (c={:.4}) to {} (c={:.4})",
            series.symbol(),
            window,
            first.timestamp,
            first.close,
            last.timestamp,
            last.close
        );
    }
    info!("Computed {}-day MA for {} closes: MA={:.4}", window, series.symbol(), ma);

    Ok(ma)
}

/// Labels `last_price` against `moving_average` and returns the label with
/// the percentage deviation from the average.
pub fn classify_trend(last_price: f64, moving_average: f64) -> Result<(TrendLabel, f64)> {
    if !moving_average.is_finite() || moving_average <= 0.0 {
        return Err(TrendBotError::DegenerateInput(format!(
            "moving average must be a positive number, got {}",
            moving_average
        )));
    }

    let diff_percent = (last_price - moving_average) / moving_average * 100.0;

    // +10% exactly stays MODERATE: the WEAK test is strict.
    let label = if last_price > moving_average * WEAK_THRESHOLD {
        TrendLabel::Weak
    } else if last_price >= moving_average {
        TrendLabel::Moderate
    } else {
        TrendLabel::Strong
    };

    Ok((label, diff_percent))
}

/// Runs the full analysis: trailing MA, then classification of the latest
/// close against it.
pub fn analyze(series: &BarSeries, window: usize) -> Result<AnalysisResult> {
    let moving_average = compute_moving_average(series, window)?;
    let window_used = window.min(series.len());
    let last_bar = series.last().ok_or_else(|| {
        TrendBotError::InsufficientData(format!("no latest bar for {}", series.symbol()))
    })?;

    info!(
        "Latest {} bar: t={} close={:.4} (compared with {}-day MA).",
        series.symbol(),
        last_bar.timestamp,
        last_bar.close,
        window_used
    );

    let (label, diff_percent) = classify_trend(last_bar.close, moving_average)?;
    info!(
        "Classification for {}: last_price={:.4}, MA={:.4}, diff={:.2}% => {}",
        series.symbol(),
        last_bar.close,
        moving_average,
        diff_percent,
        label
    );

    Ok(AnalysisResult {
        moving_average,
        last_price: last_bar.close,
        diff_percent,
        label,
        window_used,
        last_timestamp: last_bar.timestamp,
    })
}
