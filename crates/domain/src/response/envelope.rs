//! Backend response envelope.
//!
//! Standard endpoints wrap their payload as `{ data, message, success }`,
//! while the login and refresh endpoints return their payload at the top
//! level. Decoding is envelope-aware: a JSON object with a boolean `success`
//! field is treated as an envelope and unwrapped, anything else is decoded
//! as the payload itself.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Standard response wrapper used by the admin backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    /// The wrapped payload.
    pub data: Option<T>,
    /// Optional human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Whether the backend considers the call successful.
    pub success: bool,
    /// Status code echoed by the backend, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// Errors produced while decoding a response payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// The envelope reported `success: false`.
    #[error("request rejected: {message}")]
    Rejected {
        /// Message supplied by the backend.
        message: String,
    },

    /// The body is not valid JSON or does not match the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl<T: DeserializeOwned> ApiEnvelope<T> {
    /// Unwraps the payload.
    ///
    /// An envelope without `data` yields the payload decoded from `null`,
    /// which succeeds for unit, `Option` and `serde_json::Value` payloads.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError::Rejected` when `success` is false and
    /// `PayloadError::Malformed` when no data is present but `T` requires it.
    pub fn into_result(self) -> Result<T, PayloadError> {
        if !self.success {
            return Err(PayloadError::Rejected {
                message: self
                    .message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            });
        }

        match self.data {
            Some(data) => Ok(data),
            None => serde_json::from_value(Value::Null)
                .map_err(|_| PayloadError::Malformed("envelope carries no data".to_string())),
        }
    }
}

fn is_envelope(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| object.get("success").is_some_and(Value::is_boolean))
}

/// Decodes a response body, unwrapping the envelope when present.
///
/// An empty body decodes as `null`.
///
/// # Errors
///
/// See [`ApiEnvelope::into_result`]; invalid JSON is `PayloadError::Malformed`.
pub fn decode_payload<T: DeserializeOwned>(body: &[u8]) -> Result<T, PayloadError> {
    let value: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(body).map_err(|e| PayloadError::Malformed(e.to_string()))?
    };

    if is_envelope(&value) {
        let envelope: ApiEnvelope<T> =
            serde_json::from_value(value).map_err(|e| PayloadError::Malformed(e.to_string()))?;
        return envelope.into_result();
    }

    serde_json::from_value(value).map_err(|e| PayloadError::Malformed(e.to_string()))
}

/// Extracts the backend's error message from an error response body.
///
/// Recognizes `{ "message": "..." }`, validation-style
/// `{ "message": ["...", "..."] }` and `{ "error": "..." }`.
#[must_use]
pub fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let object = value.as_object()?;

    match object.get("message") {
        Some(Value::String(message)) if !message.is_empty() => return Some(message.clone()),
        Some(Value::Array(items)) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if !parts.is_empty() {
                return Some(parts.join(", "));
            }
        }
        _ => {}
    }

    object
        .get("error")
        .and_then(Value::as_str)
        .filter(|e| !e.is_empty())
        .map(String::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, PartialEq, Eq, Deserialize)]
    struct Tenant {
        id: String,
        name: String,
    }

    #[test]
    fn test_decode_unwraps_envelope() {
        let body = br#"{"data":{"id":"t1","name":"Acme"},"success":true,"message":"ok"}"#;
        let tenant: Tenant = decode_payload(body).unwrap();
        assert_eq!(
            tenant,
            Tenant {
                id: "t1".to_string(),
                name: "Acme".to_string()
            }
        );
    }

    #[test]
    fn test_envelope_missing_data_is_none() {
        let envelope: ApiEnvelope<Tenant> =
            serde_json::from_str(r#"{"success":true,"statusCode":200}"#).unwrap();
        assert_eq!(envelope.data, None);
        assert_eq!(envelope.status_code, Some(200));
    }

    #[test]
    fn test_decode_accepts_top_level_payload() {
        let body = br#"{"id":"t2","name":"Globex"}"#;
        let tenant: Tenant = decode_payload(body).unwrap();
        assert_eq!(tenant.id, "t2");
    }

    #[test]
    fn test_decode_rejected_envelope() {
        let body = br#"{"data":null,"success":false,"message":"Tenant suspended"}"#;
        let result = decode_payload::<Value>(body);
        assert_eq!(
            result,
            Err(PayloadError::Rejected {
                message: "Tenant suspended".to_string()
            })
        );
    }

    #[test]
    fn test_envelope_without_data_decodes_unit() {
        let body = br#"{"success":true,"message":"Logged out"}"#;
        assert!(decode_payload::<()>(body).is_ok());
    }

    #[test]
    fn test_envelope_without_data_fails_for_required_payload() {
        let body = br#"{"success":true}"#;
        let result = decode_payload::<Tenant>(body);
        assert!(matches!(result, Err(PayloadError::Malformed(_))));
    }

    #[test]
    fn test_empty_body_decodes_as_null() {
        let value: Value = decode_payload(b"").unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let result = decode_payload::<Value>(b"<html>");
        assert!(matches!(result, Err(PayloadError::Malformed(_))));
    }

    #[test]
    fn test_error_message_variants() {
        assert_eq!(
            error_message(br#"{"message":"Invalid credentials","statusCode":401}"#),
            Some("Invalid credentials".to_string())
        );
        assert_eq!(
            error_message(br#"{"message":["email must be an email","password is required"]}"#),
            Some("email must be an email, password is required".to_string())
        );
        assert_eq!(
            error_message(br#"{"error":"Bad Gateway"}"#),
            Some("Bad Gateway".to_string())
        );
        assert_eq!(error_message(b"upstream timed out"), None);
    }
}
