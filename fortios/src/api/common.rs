//! Common types and utilities for the FortiOS REST API

use serde::Deserialize;
use serde_json::{Map, Value};

/// Wire representation of one API object or one nested table row
pub type AttributeMap = Map<String, Value>;

/// Envelope wrapped around every FortiOS REST response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FortiResponse {
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub http_status: u16,
    #[serde(default)]
    pub results: Value,
    #[serde(default)]
    pub mkey: Option<Value>,
    #[serde(default)]
    pub vdom: Option<String>,
    #[serde(default)]
    pub revision: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub build: Option<u64>,
}

impl FortiResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// Object key of a created or updated object. Numeric keys are rendered as strings
    pub fn mkey_string(&self) -> Option<String> {
        match self.mkey.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// First object of `results`, which is a list for CMDB reads and an
    /// object for monitor endpoints
    pub fn first_result(&self) -> Option<&AttributeMap> {
        match &self.results {
            Value::Array(items) => items.first().and_then(Value::as_object),
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub error: Option<i64>,
    #[serde(default)]
    pub cli_error: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("API error details: code={code:?}, cli_error={cli_error:?}")]
pub struct ApiErrorDetails {
    pub code: Option<i64>,
    pub cli_error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ApiQueryParams {
    params: Vec<(String, String)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn add_optional<K: Into<String>, V: ToString>(mut self, key: K, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.params.push((key.into(), v.to_string()));
        }
        self
    }

    /// Scope the request to an administrative domain. Empty names are dropped
    pub fn vdom(self, vdom: Option<&str>) -> Self {
        self.add_optional("vdom", vdom.filter(|v| !v.is_empty()))
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}
