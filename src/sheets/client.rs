use crate::errors::{Result, TrendBotError};
use crate::sheets::auth::AccessToken;
use log::{debug, warn};
use reqwest::{Client, StatusCode, Url};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
pub const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

#[derive(Deserialize, Debug)]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize, Debug)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize, Debug)]
struct SheetProperties {
    title: String,
}

#[derive(Deserialize, Debug)]
struct Sheet {
    properties: SheetProperties,
}

#[derive(Deserialize, Debug)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    pub fn single(range: &str, value: &str) -> Self {
        Self {
            range: Some(range.to_string()),
            major_dimension: Some("ROWS".to_string()),
            values: vec![vec![Value::String(value.to_string())]],
        }
    }

    /// Top-left value as text, if the range holds anything.
    pub fn first_value(&self) -> Option<String> {
        self.values.first().and_then(|row| row.first()).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// Drive search expression matching a spreadsheet by exact name.
pub fn drive_name_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        escaped, SPREADSHEET_MIME_TYPE
    )
}

/// Thin authenticated wrapper over the Drive and Sheets REST endpoints.
pub struct SheetsClient<'a> {
    http: &'a Client,
    token: AccessToken,
    drive_files_url: String,
    sheets_base_url: String,
}

impl<'a> SheetsClient<'a> {
    pub fn new(http: &'a Client, token: AccessToken) -> Self {
        Self {
            http,
            token,
            drive_files_url: DRIVE_FILES_URL.to_string(),
            sheets_base_url: SHEETS_BASE_URL.to_string(),
        }
    }

    /// Points the client at other Drive and Sheets endpoints.
    pub fn with_endpoints(mut self, drive_files_url: &str, sheets_base_url: &str) -> Self {
        self.drive_files_url = drive_files_url.trim_end_matches('/').to_string();
        self.sheets_base_url = sheets_base_url.trim_end_matches('/').to_string();
        self
    }

    fn bearer(&self) -> &str {
        self.token.token.expose_secret()
    }

    /// Resolves a spreadsheet id from its human-readable name.
    pub async fn find_spreadsheet_id(&self, name: &str) -> Result<String> {
        let query = drive_name_query(name);
        let response = self
            .http
            .get(&self.drive_files_url)
            .bearer_auth(self.bearer())
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("pageSize", "10"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TrendBotError::Authentication(format!(
                "file lookup for '{}' rejected with {}: {}",
                name, status, body
            )));
        }
        if !status.is_success() {
            return Err(TrendBotError::DocumentNotFound(format!(
                "file lookup for '{}' failed with {}: {}",
                name, status, body
            )));
        }

        let list: DriveFileList = serde_json::from_str(&body)?;
        if list.files.len() > 1 {
            warn!(
                "{} spreadsheets are named '{}'; using the first ({})",
                list.files.len(),
                name,
                list.files[0].id
            );
        }
        let file = list
            .files
            .into_iter()
            .next()
            .ok_or_else(|| TrendBotError::DocumentNotFound(name.to_string()))?;

        debug!("Opened spreadsheet '{}' ({})", file.name, file.id);
        Ok(file.id)
    }

    /// Fails with `TabNotFound` unless the spreadsheet has a tab titled `tab`.
    pub async fn ensure_tab(&self, spreadsheet_id: &str, tab: &str) -> Result<()> {
        let url = format!("{}/{}", self.sheets_base_url, spreadsheet_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.bearer())
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TrendBotError::Authentication(format!(
                "tab lookup in {} rejected with {}: {}",
                spreadsheet_id, status, body
            )));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(TrendBotError::DocumentNotFound(format!(
                "spreadsheet {} is not accessible: {}",
                spreadsheet_id, body
            )));
        }
        if !status.is_success() {
            return Err(TrendBotError::TabNotFound(format!(
                "could not list tabs of {} ({}): {}",
                spreadsheet_id, status, body
            )));
        }

        let meta: SpreadsheetMeta = serde_json::from_str(&body)?;
        if meta.sheets.iter().any(|s| s.properties.title == tab) {
            debug!("Using worksheet '{}'.", tab);
            Ok(())
        } else {
            Err(TrendBotError::TabNotFound(tab.to_string()))
        }
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url> {
        let mut url = Url::parse(&self.sheets_base_url)
            .map_err(|e| TrendBotError::Write(format!("bad sheets endpoint: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| TrendBotError::Write("sheets endpoint cannot be a base".into()))?
            .extend(&[spreadsheet_id, "values", range]);
        Ok(url)
    }

    pub async fn read_cell(&self, spreadsheet_id: &str, range: &str) -> Result<Option<String>> {
        let url = self.values_url(spreadsheet_id, range)?;
        let response = self
            .http
            .get(url)
            .bearer_auth(self.bearer())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TrendBotError::Upstream(format!(
                "reading {} returned {}: {}",
                range, status, body
            )));
        }

        let values: ValueRange = serde_json::from_str(&body)?;
        Ok(values.first_value())
    }

    /// Overwrites exactly one cell. Values are stored as entered (`RAW`).
    pub async fn write_cell(&self, spreadsheet_id: &str, range: &str, value: &str) -> Result<()> {
        let url = self.values_url(spreadsheet_id, range)?;
        let response = self
            .http
            .put(url)
            .bearer_auth(self.bearer())
            .query(&[("valueInputOption", "RAW")])
            .json(&ValueRange::single(range, value))
            .send()
            .await
            .map_err(|e| TrendBotError::Write(format!("update of {} failed: {}", range, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrendBotError::Write(format!(
                "update of {} returned {}: {}",
                range, status, body
            )));
        }
        Ok(())
    }
}
