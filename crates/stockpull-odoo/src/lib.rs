//! XML-RPC access to an Odoo ERP.
//!
//! [`OdooClient`] speaks the `/xmlrpc/2/common` and `/xmlrpc/2/object`
//! endpoints and implements [`ErpGateway`], the two-call surface the stock
//! pipeline depends on. Tests substitute their own gateway.

pub mod client;
pub mod error;
pub mod gateway;
pub mod value;
pub mod xmlrpc;

pub use client::{OdooClient, OdooCredentials};
pub use error::OdooError;
pub use gateway::{ErpGateway, Uid};
pub use value::Value;
