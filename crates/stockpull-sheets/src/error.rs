use thiserror::Error;

/// Errors returned by the Drive and Sheets client.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Google answered with a non-success status.
    #[error("Google API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The workbook template could not be read from disk.
    #[error("failed to read workbook template '{path}': {source}")]
    Template {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The template has no sheet with the configured name.
    #[error("workbook template has no sheet named '{0}'")]
    MissingSheet(String),

    #[error("workbook error: {0}")]
    Workbook(String),
}
