//! The `{code, msg, data}` response envelope returned by every platform endpoint.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{FeishuError, FeishuResult};

/// Longest body excerpt carried by parse errors.
const BODY_EXCERPT_LEN: usize = 512;

/// A decoded platform response.
///
/// Token endpoints put their payload next to `code` and `msg` instead of
/// under `data`; those fields are collected into `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    /// `Some(Value::Null)` when the body carried `"data": null`, `None` when
    /// the field was absent.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    /// Parses a raw response body.
    pub fn parse(body: &[u8]) -> FeishuResult<Self> {
        serde_json::from_slice(body).map_err(|_| FeishuError::UnparsableResponse {
            body: excerpt(body),
        })
    }

    /// Returns true when the platform reported success.
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Converts the envelope into its payload or the error it describes.
    pub fn into_result(self) -> FeishuResult<Value> {
        match (self.code, self.msg) {
            (Some(0), _) => Ok(match self.data {
                Some(data) => data,
                None => Value::Object(self.extra),
            }),
            (Some(code), Some(msg)) => Err(FeishuError::Api { code, msg }),
            (code, msg) => {
                let body = Value::Object(
                    [
                        ("code", code.map(Value::from)),
                        ("msg", msg.map(Value::from)),
                        ("data", self.data),
                    ]
                    .into_iter()
                    .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
                    .chain(self.extra)
                    .collect(),
                );
                Err(FeishuError::UnknownServerError {
                    code: code.unwrap_or(FeishuError::UNKNOWN_SERVER_ERROR),
                    body: body.to_string(),
                })
            }
        }
    }
}

/// Keeps an explicit `null` instead of folding it into `None`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// Parses a raw body and unwraps the envelope in one step.
pub fn unwrap_envelope(body: &[u8]) -> FeishuResult<Value> {
    Envelope::parse(body)?.into_result()
}

fn excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_returns_data_unchanged() {
        let body = br#"{"code":0,"msg":"ok","data":{"bot":{"app_name":"demo"}}}"#;
        let value = unwrap_envelope(body).unwrap();
        assert_eq!(value, json!({"bot": {"app_name": "demo"}}));
    }

    #[test]
    fn test_success_with_null_data_returns_null() {
        let value = unwrap_envelope(br#"{"code":0,"msg":"ok","data":null}"#).unwrap();
        assert_eq!(value, Value::Null);

        let envelope = Envelope::parse(br#"{"code":0,"msg":"ok","data":null}"#).unwrap();
        assert_eq!(envelope.data, Some(Value::Null));
        assert_eq!(Envelope::parse(br#"{"code":0,"msg":"ok"}"#).unwrap().data, None);
    }

    #[test]
    fn test_success_without_data_returns_top_level_fields() {
        let body = br#"{"code":0,"msg":"ok","tenant_access_token":"t1","expire":7200}"#;
        let value = unwrap_envelope(body).unwrap();
        assert_eq!(value, json!({"tenant_access_token": "t1", "expire": 7200}));
    }

    #[test]
    fn test_non_zero_code_is_api_error() {
        let err = unwrap_envelope(br#"{"code":99991663,"msg":"token invalid"}"#).unwrap_err();
        assert!(matches!(err, FeishuError::Api { code: 99991663, .. }));
        assert_eq!(err.code(), 99991663);
    }

    #[test]
    fn test_missing_msg_is_unknown_server_error() {
        let err = unwrap_envelope(br#"{"code":10012}"#).unwrap_err();
        assert!(matches!(err, FeishuError::UnknownServerError { code: 10012, .. }));
    }

    #[test]
    fn test_missing_code_is_unknown_server_error() {
        let err = unwrap_envelope(br#"{"data":{}}"#).unwrap_err();
        assert_eq!(err.code(), FeishuError::UNKNOWN_SERVER_ERROR);
    }

    #[test]
    fn test_non_json_is_unparsable() {
        let err = unwrap_envelope(b"<html>502 Bad Gateway</html>").unwrap_err();
        match err {
            FeishuError::UnparsableResponse { body } => assert!(body.contains("502")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_envelope_round_trips_through_serde() {
        let raw = json!({"code": 0, "msg": "ok", "data": {"message_id": "om_1"}});
        let envelope: Envelope = serde_json::from_value(raw.clone()).unwrap();
        assert!(envelope.is_success());
        assert_eq!(serde_json::to_value(&envelope).unwrap(), raw);
    }
}
