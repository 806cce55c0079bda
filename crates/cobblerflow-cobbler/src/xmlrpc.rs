//! Minimal XML-RPC client
//!
//! Only what the Cobbler read path needs: encode a `methodCall`, POST it, and
//! decode the `methodResponse` into [`serde_json::Value`] (structs become
//! objects, arrays become arrays, `<nil/>` becomes `null`).

use crate::error::{CobblerError, Result};
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use serde_json::{Map, Number, Value};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct XmlRpc {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl XmlRpc {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call `method` with `params` and return the decoded result
    pub async fn call(&self, method: &str, params: &[Value]) -> Result<Value> {
        tracing::debug!("XML-RPC {} -> {}", method, self.url);

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "text/xml")
            .timeout(self.timeout)
            .body(encode_call(method, params))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?
            .error_for_status()?;

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        parse_response(&body)
    }

    fn transport_error(&self, err: reqwest::Error) -> CobblerError {
        if err.is_timeout() {
            CobblerError::Timeout(self.timeout)
        } else {
            CobblerError::Http(err)
        }
    }
}

/// Encode a `methodCall` document
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\"?><methodCall><methodName>");
    xml.push_str(&escape(method));
    xml.push_str("</methodName><params>");
    for param in params {
        xml.push_str("<param>");
        encode_value(param, &mut xml);
        xml.push_str("</param>");
    }
    xml.push_str("</params></methodCall>");
    xml
}

fn encode_value(value: &Value, xml: &mut String) {
    xml.push_str("<value>");
    match value {
        Value::Null => xml.push_str("<nil/>"),
        Value::Bool(b) => {
            let flag = if *b { "1" } else { "0" };
            xml.push_str(&format!("<boolean>{}</boolean>", flag));
        }
        Value::Number(n) if n.is_f64() => xml.push_str(&format!("<double>{}</double>", n)),
        Value::Number(n) => xml.push_str(&format!("<int>{}</int>", n)),
        Value::String(s) => xml.push_str(&format!("<string>{}</string>", escape(s))),
        Value::Array(items) => {
            xml.push_str("<array><data>");
            for item in items {
                encode_value(item, xml);
            }
            xml.push_str("</data></array>");
        }
        Value::Object(map) => {
            xml.push_str("<struct>");
            for (key, item) in map {
                xml.push_str(&format!("<member><name>{}</name>", escape(key)));
                encode_value(item, xml);
                xml.push_str("</member>");
            }
            xml.push_str("</struct>");
        }
    }
    xml.push_str("</value>");
}

/// Generic element tree; XML-RPC payloads are small enough to build fully
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn malformed(message: impl Into<String>) -> CobblerError {
    CobblerError::MalformedResponse(message.into())
}

fn parse_tree(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(Element {
                name: String::from_utf8_lossy(e.local_name().as_ref()).to_string(),
                ..Default::default()
            }),
            Event::Empty(e) => {
                let element = Element {
                    name: String::from_utf8_lossy(e.local_name().as_ref()).to_string(),
                    ..Default::default()
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(|e| malformed(e.to_string()))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| malformed("unbalanced end tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::Eof => return Err(malformed("unexpected end of document")),
            _ => {}
        }
    }
}

/// Decode a `methodResponse`; a `<fault>` becomes [`CobblerError::Fault`]
pub fn parse_response(xml: &str) -> Result<Value> {
    let root = parse_tree(xml)?;
    if root.name != "methodResponse" {
        return Err(malformed(format!("unexpected root <{}>", root.name)));
    }

    if let Some(fault) = root.child("fault") {
        let value = fault
            .child("value")
            .map(decode_value)
            .transpose()?
            .unwrap_or(Value::Null);
        return Err(CobblerError::Fault {
            code: value.get("faultCode").and_then(Value::as_i64).unwrap_or(0),
            message: value
                .get("faultString")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        });
    }

    root.child("params")
        .and_then(|p| p.child("param"))
        .and_then(|p| p.child("value"))
        .map(decode_value)
        .unwrap_or_else(|| Err(malformed("response has no value")))
}

fn decode_value(value: &Element) -> Result<Value> {
    // a bare <value>text</value> is a string
    let Some(typed) = value.children.first() else {
        return Ok(Value::String(value.text.clone()));
    };

    let text = typed.text.as_str();
    Ok(match typed.name.as_str() {
        "string" | "dateTime.iso8601" | "base64" => Value::String(text.to_string()),
        "int" | "i4" | "i8" => {
            let n: i64 = text
                .trim()
                .parse()
                .map_err(|_| malformed(format!("invalid int: {}", text)))?;
            Value::from(n)
        }
        "boolean" => Value::Bool(text.trim() == "1"),
        "double" => {
            let f: f64 = text
                .trim()
                .parse()
                .map_err(|_| malformed(format!("invalid double: {}", text)))?;
            Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
        }
        "nil" => Value::Null,
        "array" => {
            let items = match typed.child("data") {
                Some(data) => data
                    .children_named("value")
                    .map(decode_value)
                    .collect::<Result<Vec<_>>>()?,
                None => Vec::new(),
            };
            Value::Array(items)
        }
        "struct" => {
            let mut map = Map::new();
            for member in typed.children_named("member") {
                let name = member
                    .child("name")
                    .ok_or_else(|| malformed("struct member without a name"))?;
                let item = member
                    .child("value")
                    .map(decode_value)
                    .transpose()?
                    .unwrap_or(Value::Null);
                map.insert(name.text.clone(), item);
            }
            Value::Object(map)
        }
        other => return Err(malformed(format!("unsupported type <{}>", other))),
    })
}
