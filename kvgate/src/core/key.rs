//! Key normalization
//!
//! Keys arrive as arbitrary JSON in create requests but are stored as
//! strings. [`normalize_key`] defines the one canonical string for each
//! accepted input, so `1` and `"1"` address the same record.

use serde_json::Value;

/// Reason a JSON value cannot be used as a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyError {
    /// Arrays and objects have no canonical key form
    NotScalar,
}

/// Render a JSON key input as its canonical string
///
/// - strings pass through unchanged
/// - numbers use their JSON rendering (`1`, `-2`, `1.5`)
/// - booleans become `"true"` / `"false"`
/// - `null` and the empty string mean no key was given (`Ok(None)`)
/// - arrays and objects are rejected
///
/// # Example
///
/// ```
/// use kvgate::normalize_key;
/// use serde_json::json;
///
/// assert_eq!(normalize_key(&json!(42)).unwrap().as_deref(), Some("42"));
/// assert_eq!(normalize_key(&json!("42")).unwrap().as_deref(), Some("42"));
/// assert_eq!(normalize_key(&json!("")).unwrap(), None);
/// ```
pub fn normalize_key(raw: &Value) -> Result<Option<String>, KeyError> {
    let key = match raw {
        Value::Null => return Ok(None),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) | Value::Object(_) => return Err(KeyError::NotScalar),
    };

    if key.is_empty() { Ok(None) } else { Ok(Some(key)) }
}
