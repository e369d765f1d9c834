use crate::errors::{Result, TrendBotError};
use crate::models::bar::{Bar, BarSeries};
use chrono::{DateTime, Utc};
use log::warn;
use serde::Deserialize;

/// One bar as the data API sends it. Extra keys (`n`, `vw`) are ignored.
#[derive(Deserialize, Debug)]
pub struct AlpacaBar {
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "v")]
    pub volume: u64,
}

/// Body of `GET /v2/stocks/{symbol}/bars`. `bars` is `null` when the
/// symbol has no data in the requested range.
#[derive(Deserialize, Debug)]
pub struct AlpacaBarsResponse {
    #[serde(default)]
    pub bars: Option<Vec<AlpacaBar>>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl From<AlpacaBar> for Bar {
    fn from(ab: AlpacaBar) -> Self {
        Bar {
            timestamp: ab.timestamp,
            open: ab.open,
            high: ab.high,
            low: ab.low,
            close: ab.close,
            volume: ab.volume,
        }
    }
}

/// Parses a bars response body into a sorted series.
pub fn parse_bars_body(symbol: &str, body: &str) -> Result<BarSeries> {
    let response: AlpacaBarsResponse = serde_json::from_str(body).map_err(|e| {
        TrendBotError::Upstream(format!("malformed bars response for {}: {}", symbol, e))
    })?;

    if let Some(token) = response.next_page_token.as_deref() {
        warn!(
            "Bars response for {} was truncated (next_page_token={}); using the first page only.",
            symbol, token
        );
    }

    let bars = response
        .bars
        .unwrap_or_default()
        .into_iter()
        .map(Bar::from)
        .collect();

    Ok(BarSeries::new(symbol, bars))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sorts_unordered_bars() {
        let body = r#"{
            "symbol": "RSP",
            "next_page_token": null,
            "bars": [
                {"t": "2024-03-06T05:00:00Z", "o": 3, "h": 3, "l": 3, "c": 3.5, "v": 30, "n": 1, "vw": 3},
                {"t": "2024-03-04T05:00:00Z", "o": 1, "h": 1, "l": 1, "c": 1.5, "v": 10, "n": 1, "vw": 1},
                {"t": "2024-03-05T05:00:00Z", "o": 2, "h": 2, "l": 2, "c": 2.5, "v": 20, "n": 1, "vw": 2}
            ]
        }"#;

        let series = parse_bars_body("RSP", body).unwrap();
        let closes: Vec<f64> = series.bars().iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![1.5, 2.5, 3.5]);
        assert_eq!(series.last().unwrap().volume, 30);
        assert_eq!(
            series.last().unwrap().timestamp.to_rfc3339(),
            "2024-03-06T05:00:00+00:00"
        );
    }

    #[test]
    fn test_parse_null_or_missing_bars_is_empty() {
        assert!(parse_bars_body("RSP", r#"{"bars": null}"#).unwrap().is_empty());
        assert!(parse_bars_body("RSP", r#"{"bars": []}"#).unwrap().is_empty());
        assert!(parse_bars_body("RSP", r#"{"symbol": "RSP"}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_truncated_response_keeps_first_page() {
        let body = r#"{
            "bars": [{"t": "2024-03-04T05:00:00Z", "o": 1, "h": 1, "l": 1, "c": 1, "v": 10}],
            "next_page_token": "UlNQfDIwMjQtMDMtMDQ="
        }"#;
        let series = parse_bars_body("RSP", body).unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_parse_missing_field_is_upstream_error() {
        let body = r#"{"bars": [{"t": "2024-03-06T05:00:00Z", "o": 1, "h": 1, "l": 1, "v": 3}]}"#;
        let err = parse_bars_body("RSP", body).unwrap_err();
        match err {
            TrendBotError::Upstream(msg) => assert!(msg.contains("missing field `c`"), "{}", msg),
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_garbage_is_upstream_error() {
        let err = parse_bars_body("RSP", "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, TrendBotError::Upstream(_)));
    }
}
