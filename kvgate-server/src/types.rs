//! Response bodies shared by the HTTP handlers
//!
//! Every response is a JSON object with a `message` field. Successful
//! responses add whichever of `key`, `value` and `data` the operation
//! produced; error responses carry only the message.

use kvgate::{KeyValueRecord, KvError};
use serde::Serialize;
use serde_json::Value;

/// Success body
///
/// # Example
///
/// ```json
/// {"message": "OK", "key": "user:1", "value": {"name": "ada"}}
/// ```
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OkResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<KeyValueRecord>>,
}

impl OkResponse {
    /// Bare `{"message":"OK"}`
    pub fn ok() -> Self {
        Self {
            message: "OK".to_string(),
            key: None,
            value: None,
            data: None,
        }
    }

    pub fn record(record: KeyValueRecord) -> Self {
        Self {
            key: Some(record.key),
            value: Some(record.value),
            ..Self::ok()
        }
    }

    pub fn value(value: Value) -> Self {
        Self {
            value: Some(value),
            ..Self::ok()
        }
    }

    pub fn data(records: Vec<KeyValueRecord>) -> Self {
        Self {
            data: Some(records),
            ..Self::ok()
        }
    }
}

/// Error body
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorResponse {
    pub message: String,
}

impl From<&KvError> for ErrorResponse {
    fn from(err: &KvError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}
