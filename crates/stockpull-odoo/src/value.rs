//! XML-RPC value model.
//!
//! Odoo encodes "no value" as boolean `false` rather than `<nil/>`, and
//! many2one fields as a two-element array `[id, "display name"]`. The
//! accessors here fold those conventions in so callers can ask for what they
//! mean (`as_many2one_id`, `as_opt_str`) instead of matching raw shapes.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Double(f64),
    String(String),
    DateTime(String),
    Base64(String),
    Array(Vec<Value>),
    Struct(BTreeMap<String, Value>),
    Nil,
}

impl Value {
    /// Builds a struct value from `(key, value)` pairs.
    pub fn structure<K, I>(members: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Struct(members.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds a search-domain leaf `[field, operator, value]`.
    pub fn condition(field: &str, operator: &str, value: impl Into<Value>) -> Self {
        Value::Array(vec![field.into(), operator.into(), value.into()])
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of `Int` and `Double` values.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Double(d) if d.is_finite() => Some(*d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Like [`Value::as_str`], but treats Odoo's `false` and empty strings as absent.
    #[must_use]
    pub fn as_opt_str(&self) -> Option<&str> {
        self.as_str().filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_struct(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Struct(members) => Some(members),
            _ => None,
        }
    }

    /// Struct member lookup; `None` for missing keys and non-struct values.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_struct().and_then(|m| m.get(key))
    }

    /// Id half of a many2one pair (`[id, "name"]`). A bare integer is accepted too.
    #[must_use]
    pub fn as_many2one_id(&self) -> Option<i64> {
        match self {
            Value::Array(items) => items.first().and_then(Value::as_i64),
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn many2one_pair_yields_id() {
        let v = Value::Array(vec![Value::Int(42), Value::from("[SKU] Widget")]);
        assert_eq!(v.as_many2one_id(), Some(42));
    }

    #[test]
    fn many2one_false_is_absent() {
        assert_eq!(Value::Bool(false).as_many2one_id(), None);
    }

    #[test]
    fn opt_str_treats_false_and_empty_as_absent() {
        assert_eq!(Value::Bool(false).as_opt_str(), None);
        assert_eq!(Value::from("").as_opt_str(), None);
        assert_eq!(Value::from("ABC").as_opt_str(), Some("ABC"));
    }

    #[test]
    fn as_f64_widens_ints_and_rejects_non_finite() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Double(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::Double(f64::NAN).as_f64(), None);
        assert_eq!(Value::from("2.5").as_f64(), None);
    }

    #[test]
    fn condition_builds_domain_leaf() {
        let leaf = Value::condition("location_id", "=", 8);
        assert_eq!(
            leaf,
            Value::Array(vec![
                Value::from("location_id"),
                Value::from("="),
                Value::Int(8)
            ])
        );
    }

    #[test]
    fn get_reads_struct_members() {
        let v = Value::structure([("id", Value::Int(1)), ("name", Value::from("x"))]);
        assert_eq!(v.get("id"), Some(&Value::Int(1)));
        assert_eq!(v.get("missing"), None);
        assert_eq!(Value::Int(1).get("id"), None);
    }
}
