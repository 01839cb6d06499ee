use thiserror::Error;

/// Errors returned by the Odoo XML-RPC client.
#[derive(Debug, Error)]
pub enum OdooError {
    /// Network or TLS failure, or a non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an XML-RPC `<fault>`.
    #[error("XML-RPC fault {code}: {message}")]
    Fault { code: String, message: String },

    /// The response body is not well-formed XML.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The XML parsed but does not have the shape the caller expected.
    #[error("unexpected response for {context}: {reason}")]
    Decode { context: String, reason: String },

    #[error("invalid Odoo URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl OdooError {
    pub(crate) fn decode(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            context: context.into(),
            reason: reason.into(),
        }
    }
}
