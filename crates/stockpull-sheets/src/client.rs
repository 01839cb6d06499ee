//! Minimal Google Drive v3 / Sheets v4 REST client.
//!
//! Authenticates with a bearer access token obtained out of band. Only the
//! three calls an export needs are exposed.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use serde_json::json;

use crate::error::SheetsError;

const DEFAULT_DRIVE_URL: &str = "https://www.googleapis.com/";
const DEFAULT_SHEETS_URL: &str = "https://sheets.googleapis.com/";

#[derive(Debug, Deserialize)]
struct CopiedFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

/// Client for the Drive and Sheets endpoints used by an export.
///
/// Use [`SheetsClient::new`] for production or
/// [`SheetsClient::with_base_urls`] to point both APIs at a mock server.
pub struct SheetsClient {
    client: Client,
    access_token: String,
    drive_url: Url,
    sheets_url: Url,
}

impl SheetsClient {
    /// Creates a client pointed at the production Google APIs.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(access_token: &str, timeout_secs: u64) -> Result<Self, SheetsError> {
        Self::with_base_urls(access_token, timeout_secs, DEFAULT_DRIVE_URL, DEFAULT_SHEETS_URL)
    }

    /// Creates a client with custom API roots (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SheetsError::InvalidUrl`] if either root is
    /// not a valid URL.
    pub fn with_base_urls(
        access_token: &str,
        timeout_secs: u64,
        drive_url: &str,
        sheets_url: &str,
    ) -> Result<Self, SheetsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("stockpull/0.1 (stock-export)")
            .build()?;

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            drive_url: parse_root(drive_url)?,
            sheets_url: parse_root(sheets_url)?,
        })
    }

    /// Copies `template_id` into a new file named `name` and returns the new
    /// file's id.
    ///
    /// # Errors
    ///
    /// - [`SheetsError::Api`] if Drive rejects the copy.
    /// - [`SheetsError::Http`] on network failure.
    /// - [`SheetsError::Deserialize`] if the response carries no file id.
    pub async fn copy_template(&self, template_id: &str, name: &str) -> Result<String, SheetsError> {
        let mut url = endpoint(&self.drive_url, &["drive", "v3", "files", template_id, "copy"])?;
        url.query_pairs_mut().append_pair("supportsAllDrives", "true");

        let body = self
            .send(self.client.post(url).json(&json!({ "name": name })))
            .await?;
        let copied: CopiedFile =
            serde_json::from_str(&body).map_err(|e| SheetsError::Deserialize {
                context: format!("files.copy({template_id})"),
                source: e,
            })?;

        tracing::debug!(template_id, file_id = %copied.id, "template copied");
        Ok(copied.id)
    }

    /// Grants write access to anyone holding the link.
    ///
    /// # Errors
    ///
    /// - [`SheetsError::Api`] if Drive rejects the permission.
    /// - [`SheetsError::Http`] on network failure.
    pub async fn share_with_anyone(&self, file_id: &str) -> Result<(), SheetsError> {
        let mut url = endpoint(&self.drive_url, &["drive", "v3", "files", file_id, "permissions"])?;
        url.query_pairs_mut().append_pair("supportsAllDrives", "true");

        self.send(
            self.client
                .post(url)
                .json(&json!({ "type": "anyone", "role": "writer" })),
        )
        .await?;
        Ok(())
    }

    /// Writes `rows` starting at `range` (A1 notation, e.g. `PEDIDO!A2`).
    /// Values are parsed as if typed by a user.
    ///
    /// # Errors
    ///
    /// - [`SheetsError::Api`] if Sheets rejects the update.
    /// - [`SheetsError::Http`] on network failure.
    pub async fn write_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<serde_json::Value>],
    ) -> Result<(), SheetsError> {
        let mut url = endpoint(
            &self.sheets_url,
            &["v4", "spreadsheets", spreadsheet_id, "values", range],
        )?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");

        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });
        self.send(self.client.put(url).json(&body)).await?;

        tracing::debug!(spreadsheet_id, range, rows = rows.len(), "rows written");
        Ok(())
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, SheetsError> {
        let response = request.bearer_auth(&self.access_token).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<GoogleErrorBody>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.chars().take(200).collect());
        Err(SheetsError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

fn parse_root(raw: &str) -> Result<Url, SheetsError> {
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| SheetsError::InvalidUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })
}

/// Appends percent-encoded path segments to `root`.
fn endpoint(root: &Url, segments: &[&str]) -> Result<Url, SheetsError> {
    let mut url = root.clone();
    url.path_segments_mut()
        .map_err(|()| SheetsError::InvalidUrl {
            url: root.to_string(),
            reason: "URL cannot be a base".to_owned(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
