use crate::config::{Config, ENV_SERVICE_ACCOUNT_JSON};
use crate::errors::{Result, TrendBotError};
use crate::models::analysis::TrendLabel;
use crate::sheets::auth::{self, ServiceAccountKey, DRIVE_METADATA_SCOPE, SPREADSHEETS_SCOPE};
use crate::sheets::client::SheetsClient;
use crate::sheets::range::a1_range;
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Destination for the computed label
#[async_trait]
pub trait LabelPublisher {
    /// Human-readable target, for logs
    fn target(&self) -> String;

    /// Overwrite the target with `label`.
    async fn publish_label(&self, label: TrendLabel) -> Result<()>;
}

/// Writes the label into one fixed cell of a Google Sheets document.
pub struct SheetPublisher {
    http: Client,
    config: Arc<Config>,
}

impl SheetPublisher {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(TrendBotError::Request)?;

        Ok(Self { http, config })
    }

    fn service_account(&self) -> Result<ServiceAccountKey> {
        let raw = self.config.service_account_json.as_ref().ok_or_else(|| {
            TrendBotError::Authentication(format!(
                "Missing Google service account JSON in env var {}",
                ENV_SERVICE_ACCOUNT_JSON
            ))
        })?;
        ServiceAccountKey::from_json(raw.expose_secret())
    }
}

#[async_trait]
impl LabelPublisher for SheetPublisher {
    fn target(&self) -> String {
        format!(
            "{}/{}!{}",
            self.config.sheet_name, self.config.tab_name, self.config.target_cell
        )
    }

    async fn publish_label(&self, label: TrendLabel) -> Result<()> {
        let key = self.service_account()?;
        let token = auth::fetch_access_token(
            &self.http,
            &key,
            &[SPREADSHEETS_SCOPE, DRIVE_METADATA_SCOPE],
        )
        .await?;
        debug!("Authorized as {}.", key.client_email);

        let sheets = SheetsClient::new(&self.http, token);

        debug!("Opening spreadsheet '{}'...", self.config.sheet_name);
        let spreadsheet_id = sheets.find_spreadsheet_id(&self.config.sheet_name).await?;
        sheets.ensure_tab(&spreadsheet_id, &self.config.tab_name).await?;

        let range = a1_range(&self.config.tab_name, &self.config.target_cell);

        // Best effort, only for the log line.
        let previous = match sheets.read_cell(&spreadsheet_id, &range).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Could not read previous value of {}: {}", range, e);
                None
            }
        };
        info!(
            "Previous value in {}!{} was: {}",
            self.config.tab_name,
            self.config.target_cell,
            previous.as_deref().unwrap_or("None")
        );

        info!(
            "Updating {}!{} with value '{}'.",
            self.config.tab_name, self.config.target_cell, label
        );
        sheets.write_cell(&spreadsheet_id, &range, label.as_str()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_service_account_is_authentication_error() {
        let publisher = SheetPublisher::new(Arc::new(Config::new())).unwrap();
        let err = publisher.publish_label(TrendLabel::Weak).await.unwrap_err();
        assert!(matches!(err, TrendBotError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_malformed_service_account_is_authentication_error() {
        let config = Config::new().with_service_account_json("{\"client_email\": 1}");
        let publisher = SheetPublisher::new(Arc::new(config)).unwrap();
        let err = publisher.publish_label(TrendLabel::Strong).await.unwrap_err();
        assert!(matches!(err, TrendBotError::Authentication(_)));
    }

    #[test]
    fn test_target_names_cell() {
        let publisher = SheetPublisher::new(Arc::new(Config::new())).unwrap();
        assert_eq!(publisher.target(), "Active-Investing/Dashboard!T3");
    }
}
