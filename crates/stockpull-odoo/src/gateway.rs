use std::future::Future;

use crate::error::OdooError;
use crate::value::Value;

/// Authenticated ERP user id.
pub type Uid = i64;

/// The two remote capabilities the stock pipeline needs from an ERP.
///
/// Credentials are bound when the gateway is constructed; `authenticate`
/// exchanges them for a user id and `execute` runs a model method as that user.
pub trait ErpGateway: Send + Sync {
    /// Returns `Ok(None)` when the ERP rejects the credentials.
    fn authenticate(&self) -> impl Future<Output = Result<Option<Uid>, OdooError>> + Send;

    /// Calls `method` on `model` with positional `args`.
    fn execute(
        &self,
        uid: Uid,
        model: &str,
        method: &str,
        args: Vec<Value>,
    ) -> impl Future<Output = Result<Value, OdooError>> + Send;
}
