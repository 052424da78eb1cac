//! Invocation errors and the adapter turning any failure payload into a message.

use picker_catalog::TransportError;
use picker_core::Namespace;
use serde::{Deserialize, Serialize};

pub const GENERIC_MESSAGE: &str = "Something went wrong, please contact support.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HttpInfo {
    pub method: String,
    pub status: u16,
    pub request_id: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub is_operational: Option<bool>,
    pub message: String,
    #[serde(default)]
    pub error_details: Option<Vec<ErrorDetail>>,
    #[serde(default)]
    pub additional_info: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ErrorBody {
    pub fn render(&self) -> String {
        let mut out = self.message.clone();
        if let Some(kind) = &self.kind {
            out.push_str(" type: ");
            out.push_str(kind);
        }
        if let Some(code) = &self.code {
            out.push_str(" code: ");
            out.push_str(code);
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorMetas {
    #[serde(rename = "dateISOString")]
    pub date_iso_string: String,
    pub timestamp: i64,
}

/// Serialized HTTP failure as answered by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpFailure {
    pub http: HttpInfo,
    pub error: ErrorBody,
    pub metas: ErrorMetas,
}

impl HttpFailure {
    /// Parse the structured shape; `None` when any of `http`/`error`/`metas` is missing or malformed.
    pub fn from_payload(payload: &serde_json::Value) -> Option<Self> {
        let obj = payload.as_object()?;
        if !(obj.contains_key("http") && obj.contains_key("error") && obj.contains_key("metas")) {
            return None;
        }
        serde_json::from_value(payload.clone()).ok()
    }
}

/// Failure of an asynchronous picker operation (filters, search, load-more).
#[derive(Debug, Clone, thiserror::Error)]
pub enum InvokeError {
    /// Query of the wrong namespace handed to a handler; raised before any I/O.
    #[error("invalid {expected} query received: {query}")]
    NamespaceMismatch { expected: Namespace, query: String },
    /// Opaque failure payload (remote error body, thrown value, ...).
    #[error("{}", describe_payload(.0))]
    Payload(serde_json::Value),
    #[error("{0}")]
    Message(String),
}

impl InvokeError {
    pub fn mismatch(expected: Namespace, query: &impl Serialize) -> Self {
        let query = serde_json::to_string(query).unwrap_or_else(|_| "<unserializable>".to_string());
        InvokeError::NamespaceMismatch { expected, query }
    }

    /// User-facing message. Never fails, whatever the payload looks like.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Structured HTTP failure, when the payload has that shape.
    pub fn http_failure(&self) -> Option<HttpFailure> {
        match self {
            InvokeError::Payload(v) => HttpFailure::from_payload(v),
            _ => None,
        }
    }
}

impl From<TransportError> for InvokeError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Status { body: Some(body), .. } => InvokeError::Payload(body),
            other => InvokeError::Message(other.to_string()),
        }
    }
}

/// Human-readable message for an arbitrary failure payload.
///
/// Structured HTTP failures and bare `{ error: {...} }` objects render their
/// error body; otherwise a `message` field is used, then the generic text.
pub fn describe_payload(payload: &serde_json::Value) -> String {
    match payload {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(obj) => {
            if let Some(f) = HttpFailure::from_payload(payload) {
                return f.error.render();
            }
            if let Some(err) = obj.get("error").filter(|e| e.is_object()) {
                if let Ok(body) = serde_json::from_value::<ErrorBody>(err.clone()) {
                    return body.render();
                }
                if let Some(msg) = err.get("message") {
                    return scalar_text(msg);
                }
            }
            match obj.get("message") {
                Some(m) if !m.is_null() => scalar_text(m),
                _ => GENERIC_MESSAGE.to_string(),
            }
        }
        _ => GENERIC_MESSAGE.to_string(),
    }
}

fn scalar_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
