//! HTTP client for Odoo's XML-RPC API.
//!
//! Wraps `reqwest` with the XML-RPC codec. `authenticate` goes to
//! `/xmlrpc/2/common`; every model call goes through `execute_kw` on
//! `/xmlrpc/2/object`, carrying the database name and password alongside the uid.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::OdooError;
use crate::gateway::{ErpGateway, Uid};
use crate::value::Value;
use crate::xmlrpc::{decode_response, encode_call};

/// Database credentials bound into an [`OdooClient`].
#[derive(Clone)]
pub struct OdooCredentials {
    pub db: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for OdooCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OdooCredentials")
            .field("db", &self.db)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Client for an Odoo instance's XML-RPC endpoints.
///
/// One `reqwest::Client` is reused for every call, so concurrent price
/// lookups share its connection pool.
#[derive(Debug)]
pub struct OdooClient {
    client: Client,
    common_url: Url,
    object_url: Url,
    credentials: OdooCredentials,
}

impl OdooClient {
    /// Creates a client for the Odoo instance at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`OdooError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`OdooError::InvalidUrl`] if `base_url` is not a
    /// valid URL.
    pub fn new(
        base_url: &str,
        credentials: OdooCredentials,
        timeout_secs: u64,
    ) -> Result<Self, OdooError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("stockpull/0.1 (stock-export)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base = Url::parse(&normalised).map_err(|e| OdooError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        let join = |path: &str| {
            base.join(path).map_err(|e| OdooError::InvalidUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })
        };

        Ok(Self {
            common_url: join("xmlrpc/2/common")?,
            object_url: join("xmlrpc/2/object")?,
            client,
            credentials,
        })
    }

    /// POSTs one XML-RPC call and decodes the single return value.
    ///
    /// # Errors
    ///
    /// Returns [`OdooError::Http`] on network failure or a non-2xx status,
    /// [`OdooError::Fault`] when the server returns a fault, and
    /// [`OdooError::Xml`] / [`OdooError::Decode`] for unreadable bodies.
    async fn call(&self, url: &Url, method: &str, params: &[Value]) -> Result<Value, OdooError> {
        let body = encode_call(method, params);
        let response = self
            .client
            .post(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await?
            .error_for_status()?;
        let text = response.text().await?;
        decode_response(&text)
    }
}

impl ErpGateway for OdooClient {
    async fn authenticate(&self) -> Result<Option<Uid>, OdooError> {
        let params = [
            Value::from(self.credentials.db.as_str()),
            Value::from(self.credentials.username.as_str()),
            Value::from(self.credentials.password.as_str()),
            Value::structure(Vec::<(String, Value)>::new()),
        ];
        let result = self.call(&self.common_url, "authenticate", &params).await?;
        match result {
            Value::Int(uid) if uid > 0 => Ok(Some(uid)),
            Value::Int(_) | Value::Bool(false) | Value::Nil => Ok(None),
            other => Err(OdooError::Decode {
                context: "authenticate".to_owned(),
                reason: format!("expected uid or false, got {other:?}"),
            }),
        }
    }

    async fn execute(
        &self,
        uid: Uid,
        model: &str,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, OdooError> {
        tracing::debug!(model, method, "odoo execute_kw");
        let params = [
            Value::from(self.credentials.db.as_str()),
            Value::Int(uid),
            Value::from(self.credentials.password.as_str()),
            Value::from(model),
            Value::from(method),
            Value::Array(args),
        ];
        self.call(&self.object_url, "execute_kw", &params).await
    }
}
