use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Position of the current price relative to the long moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendLabel {
    /// More than 10% above the average.
    Weak,
    /// At or above the average, up to and including +10%.
    Moderate,
    /// Below the average.
    Strong,
}

impl TrendLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendLabel::Weak => "WEAK",
            TrendLabel::Moderate => "MODERATE",
            TrendLabel::Strong => "STRONG",
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one analysis pass. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub moving_average: f64,
    pub last_price: f64,
    pub diff_percent: f64,
    pub label: TrendLabel,
    pub window_used: usize,
    pub last_timestamp: DateTime<Utc>,
}
