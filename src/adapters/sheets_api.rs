use crate::domain::ports::SheetStore;
use crate::utils::error::{JobsError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

/// Google Sheets v4 values API
pub struct SheetsApiStore {
    client: Client,
    api_base: String,
    spreadsheet_id: String,
    access_token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ValueRange {
    values: Vec<Vec<serde_json::Value>>,
}

impl SheetsApiStore {
    pub fn new(api_base: &str, spreadsheet_id: &str, access_token: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            access_token: access_token.to_string(),
        }
    }

    /// {base}/v4/spreadsheets/{id}/values/{range}
    fn values_url(&self, range: &str) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)?;
        url.path_segments_mut()
            .map_err(|_| JobsError::ConfigError {
                message: format!("Sheets API base cannot be a base URL: {}", self.api_base),
            })?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range]);
        Ok(url)
    }

    async fn check_status(response: reqwest::Response, sheet: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            // Sheets API 對不存在的工作表回傳 400 "Unable to parse range"
            return Err(JobsError::SheetNotFound {
                name: sheet.to_string(),
            });
        }
        let endpoint = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        Err(JobsError::UpstreamStatusError {
            endpoint,
            status: status.as_u16(),
            body,
        })
    }
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetStore for SheetsApiStore {
    async fn read_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(sheet)?;
        tracing::debug!("Reading sheet '{}' from {}", sheet, url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let response = Self::check_status(response, sheet).await?;
        let range: ValueRange = response.json().await?;

        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn append_row(&self, sheet: &str, row: Vec<String>) -> Result<()> {
        let mut url = self.values_url(&format!("{}:append", sheet))?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        tracing::debug!("Appending row to sheet '{}'", sheet);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({ "values": [row] }))
            .send()
            .await?;
        Self::check_status(response, sheet).await?;
        Ok(())
    }
}
