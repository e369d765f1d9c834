use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrendBotError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Tab not found: {0}")]
    TabNotFound(String),

    #[error("Write error: {0}")]
    Write(String),

    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrendBotError>;

impl TrendBotError {
    /// Short name of the error kind, used in cycle failure logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TrendBotError::Configuration(_) => "ConfigurationError",
            TrendBotError::Upstream(_) => "UpstreamError",
            TrendBotError::InsufficientData(_) => "InsufficientDataError",
            TrendBotError::DegenerateInput(_) => "DegenerateInputError",
            TrendBotError::Authentication(_) => "AuthenticationError",
            TrendBotError::DocumentNotFound(_) => "DocumentNotFoundError",
            TrendBotError::TabNotFound(_) => "TabNotFoundError",
            TrendBotError::Write(_) => "WriteError",
            TrendBotError::Request(_) => "RequestError",
            TrendBotError::Json(_) => "JsonError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_detail() {
        let err = TrendBotError::TabNotFound("Dashboard".to_string());
        assert_eq!(err.to_string(), "Tab not found: Dashboard");
        assert_eq!(err.kind(), "TabNotFoundError");
    }

    #[test]
    fn test_json_error_converts() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: TrendBotError = parse_err.into();
        assert!(matches!(err, TrendBotError::Json(_)));
    }
}
