use chrono::{DateTime, Utc};
use serde::Serialize;

/// One trading day's OHLCV record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Daily bars for a single symbol, ordered oldest to newest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Builds a series from bars in any order. The sort is stable, so bars
    /// sharing a timestamp keep the order the source gave them.
    pub fn new(symbol: &str, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        Self {
            symbol: symbol.to_string(),
            bars,
        }
    }

    pub fn empty(symbol: &str) -> Self {
        Self::new(symbol, Vec::new())
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    /// Most recent trading day available.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// The trailing `count` bars, clamped to the series length.
    pub fn tail(&self, count: usize) -> &[Bar] {
        let start = self.bars.len().saturating_sub(count);
        &self.bars[start..]
    }
}
