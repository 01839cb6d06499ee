//! In-memory ERP used by the pipeline integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use stockpull_odoo::{ErpGateway, OdooError, Uid, Value};

type Handler = Box<dyn Fn(&[Value]) -> Result<Value, OdooError> + Send + Sync>;

/// Answers `execute` calls from per-(model, method) handlers and records every
/// call it receives. Unhandled calls come back as an XML-RPC fault.
pub struct FakeErp {
    uid: Option<Uid>,
    handlers: HashMap<(String, String), Handler>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeErp {
    pub fn new() -> Self {
        Self {
            uid: Some(2),
            handlers: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting_credentials() -> Self {
        Self {
            uid: None,
            ..Self::new()
        }
    }

    pub fn on<F>(mut self, model: &str, method: &str, handler: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, OdooError> + Send + Sync + 'static,
    {
        self.handlers
            .insert((model.to_owned(), method.to_owned()), Box::new(handler));
        self
    }

    pub fn returning(self, model: &str, method: &str, value: Value) -> Self {
        self.on(model, method, move |_| Ok(value.clone()))
    }

    pub fn failing(self, model: &str, method: &str, message: &str) -> Self {
        let message = message.to_owned();
        self.on(model, method, move |_| Err(fault(&message)))
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, model: &str, method: &str) -> usize {
        self.calls()
            .iter()
            .filter(|(m, n)| m == model && n == method)
            .count()
    }
}

impl ErpGateway for FakeErp {
    async fn authenticate(&self) -> Result<Option<Uid>, OdooError> {
        self.calls
            .lock()
            .unwrap()
            .push(("common".to_owned(), "authenticate".to_owned()));
        Ok(self.uid)
    }

    async fn execute(
        &self,
        _uid: Uid,
        model: &str,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, OdooError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_owned(), method.to_owned()));
        match self.handlers.get(&(model.to_owned(), method.to_owned())) {
            Some(handler) => handler(&args),
            None => Err(fault(&format!("no handler for {model}.{method}"))),
        }
    }
}

pub fn fault(message: &str) -> OdooError {
    OdooError::Fault {
        code: "1".to_owned(),
        message: message.to_owned(),
    }
}

pub fn ids(ids: &[i64]) -> Value {
    Value::from(ids.to_vec())
}

pub fn quant(product_id: i64, quantity: f64, reserved: f64) -> Value {
    Value::structure([
        (
            "product_id",
            Value::Array(vec![Value::Int(product_id), Value::from("product")]),
        ),
        ("quantity", Value::Double(quantity)),
        ("reserved_quantity", Value::Double(reserved)),
    ])
}

pub fn product(id: i64, name: &str, list_price: f64, category_id: i64) -> Value {
    Value::structure([
        ("id", Value::Int(id)),
        ("name", Value::from(name)),
        ("display_name", Value::from(name)),
        ("default_code", Value::Bool(false)),
        ("list_price", Value::Double(list_price)),
        (
            "categ_id",
            Value::Array(vec![Value::Int(category_id), Value::from("category")]),
        ),
    ])
}

pub fn percentage_rule(category_id: i64, percent: f64) -> Value {
    Value::structure([
        (
            "categ_id",
            Value::Array(vec![Value::Int(category_id), Value::from("category")]),
        ),
        ("compute_price", Value::from("percentage")),
        ("fixed_price", Value::Double(0.0)),
        ("percent_price", Value::Double(percent)),
        ("price_discount", Value::Double(0.0)),
    ])
}

/// Product id of a price-list quote call (`[pricelist, product, qty]`).
pub fn quoted_product(args: &[Value]) -> i64 {
    args.get(1).and_then(Value::as_i64).unwrap_or_default()
}
