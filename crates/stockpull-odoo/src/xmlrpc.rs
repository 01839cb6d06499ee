//! XML-RPC wire codec.
//!
//! [`encode_call`] renders a `<methodCall>` document; [`decode_response`]
//! parses a `<methodResponse>` into either the single returned [`Value`] or an
//! [`OdooError::Fault`]. Decoding first builds a small element tree with
//! `quick_xml`'s event reader, then walks it.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::OdooError;
use crate::value::Value;

/// Renders an XML-RPC `methodCall` document.
#[must_use]
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        encode_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

fn encode_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Int(i) => {
            let _ = write!(out, "<int>{i}</int>");
        }
        Value::Bool(b) => {
            let _ = write!(out, "<boolean>{}</boolean>", u8::from(*b));
        }
        Value::Double(d) => {
            let _ = write!(out, "<double>{d}</double>");
        }
        Value::String(s) => {
            let _ = write!(out, "<string>{}</string>", escape(s.as_str()));
        }
        Value::DateTime(s) => {
            let _ = write!(
                out,
                "<dateTime.iso8601>{}</dateTime.iso8601>",
                escape(s.as_str())
            );
        }
        Value::Base64(s) => {
            let _ = write!(out, "<base64>{}</base64>", escape(s.as_str()));
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                encode_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                let _ = write!(out, "<member><name>{}</name>", escape(name.as_str()));
                encode_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
}

/// Parses a `methodResponse` document.
///
/// # Errors
///
/// - [`OdooError::Fault`] when the response carries a `<fault>`.
/// - [`OdooError::Xml`] when the body is not well-formed XML.
/// - [`OdooError::Decode`] when the document is not a valid `methodResponse`.
pub fn decode_response(xml: &str) -> Result<Value, OdooError> {
    let root = parse_tree(xml)?;
    if root.name != "methodResponse" {
        return Err(OdooError::decode(
            "methodResponse",
            format!("unexpected root element <{}>", root.name),
        ));
    }

    if let Some(fault) = root.child("fault") {
        let value = fault
            .child("value")
            .ok_or_else(|| OdooError::decode("fault", "missing <value>"))
            .and_then(to_value)?;
        return Err(fault_from_value(&value));
    }

    root.child("params")
        .and_then(|p| p.child("param"))
        .and_then(|p| p.child("value"))
        .ok_or_else(|| OdooError::decode("methodResponse", "missing params/param/value"))
        .and_then(to_value)
}

fn fault_from_value(value: &Value) -> OdooError {
    let code = match value.get("faultCode") {
        Some(Value::Int(i)) => i.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => "unknown".to_owned(),
    };
    let message = value
        .get("faultString")
        .and_then(Value::as_str)
        .unwrap_or("unknown fault")
        .to_owned();
    OdooError::Fault { code, message }
}

#[derive(Debug, Default)]
struct Node {
    name: String,
    children: Vec<Node>,
    text: String,
}

impl Node {
    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }
}

fn parse_tree(xml: &str) -> Result<Node, OdooError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Node> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                stack.push(Node {
                    name,
                    ..Node::default()
                });
            }
            Event::Empty(e) => {
                let node = Node {
                    name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    ..Node::default()
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => return Ok(node),
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| OdooError::decode("xml", "unbalanced closing tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => return Ok(node),
                }
            }
            Event::Text(e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::Eof => {
                return Err(OdooError::decode(
                    "xml",
                    "document ended before root closed",
                ));
            }
            _ => {}
        }
    }
}

/// Converts a `<value>` element into a [`Value`].
fn to_value(node: &Node) -> Result<Value, OdooError> {
    let Some(typed) = node.children.first() else {
        // An untyped <value> is a string.
        return Ok(Value::String(node.text.clone()));
    };

    let text = typed.text.trim();
    match typed.name.as_str() {
        "int" | "i4" | "i8" => text
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| OdooError::decode("int", format!("{text:?}: {e}"))),
        "boolean" => match text {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            other => Err(OdooError::decode("boolean", format!("{other:?}"))),
        },
        "double" => text
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|e| OdooError::decode("double", format!("{text:?}: {e}"))),
        "string" => Ok(Value::String(typed.text.clone())),
        "dateTime.iso8601" => Ok(Value::DateTime(text.to_owned())),
        "base64" => Ok(Value::Base64(text.to_owned())),
        "nil" => Ok(Value::Nil),
        "array" => {
            let Some(data) = typed.child("data") else {
                return Ok(Value::Array(Vec::new()));
            };
            data.children
                .iter()
                .filter(|c| c.name == "value")
                .map(to_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "struct" => {
            let mut members = BTreeMap::new();
            for member in typed.children.iter().filter(|c| c.name == "member") {
                let name = member
                    .child("name")
                    .map(|n| n.text.clone())
                    .ok_or_else(|| OdooError::decode("struct", "member without <name>"))?;
                let value = member
                    .child("value")
                    .ok_or_else(|| {
                        OdooError::decode("struct", format!("member {name} without <value>"))
                    })
                    .and_then(to_value)?;
                members.insert(name, value);
            }
            Ok(Value::Struct(members))
        }
        other => Err(OdooError::decode("value", format!("unsupported type <{other}>"))),
    }
}

#[cfg(test)]
#[path = "xmlrpc_test.rs"]
mod tests;
