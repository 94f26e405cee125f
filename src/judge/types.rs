//! Wire types exchanged with the external judge

use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /submissions`, one per test case
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionRequest {
    pub source_code: String,
    pub language_id: i32,
    pub stdin: String,
    pub expected_output: String,
    /// Seconds
    pub cpu_time_limit: f64,
    /// Kilobytes
    pub memory_limit: i64,
    pub callback_url: String,
}

/// Body the judge sends to the callback URL when a test finishes
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallbackPayload {
    #[serde(default)]
    pub token: Option<String>,
    /// The judge reports time as a decimal string ("0.012"); numbers are accepted too
    #[serde(default, deserialize_with = "lenient_f64")]
    pub time: Option<f64>,
    #[serde(default)]
    pub memory: Option<i64>,
    pub status: CallbackStatus,
    #[serde(default)]
    pub compile_output: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallbackStatus {
    #[serde(default)]
    pub id: Option<i32>,
    pub description: String,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64()),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid time value '{}'", s))),
        Some(other) => Err(D::Error::custom(format!("invalid time value {}", other))),
    }
}

/// Why the judge refused one execution request
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRejection {
    /// HTTP status, `None` when the request never got a response
    pub status: Option<u16>,
    pub reasons: Vec<String>,
}

impl DispatchRejection {
    /// Network or timeout failure before any response arrived
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            reasons: vec![format!("request failed: {}", message.into())],
        }
    }

    /// Build from a non-success response, extracting field-level reasons
    pub fn from_response(status: u16, body: &str) -> Self {
        let reasons = serde_json::from_str::<serde_json::Value>(body)
            .map(|v| field_reasons(&v))
            .unwrap_or_default();

        let reasons = if reasons.is_empty() {
            let snippet: String = body.trim().chars().take(200).collect();
            if snippet.is_empty() {
                vec![format!("judge responded with HTTP {}", status)]
            } else {
                vec![format!("judge responded with HTTP {}: {}", status, snippet)]
            }
        } else {
            reasons
        };

        Self {
            status: Some(status),
            reasons,
        }
    }
}

/// Flatten `{"field": ["reason", ...]}` / `{"error": "reason"}` bodies
fn field_reasons(body: &serde_json::Value) -> Vec<String> {
    let Some(fields) = body.as_object() else {
        return Vec::new();
    };

    let mut reasons = Vec::new();
    for (field, value) in fields {
        match value {
            serde_json::Value::String(s) if field == "error" => reasons.push(s.clone()),
            serde_json::Value::String(s) => reasons.push(format!("{}: {}", field, s)),
            serde_json::Value::Array(items) => reasons.extend(
                items
                    .iter()
                    .filter_map(|i| i.as_str())
                    .map(|s| format!("{}: {}", field, s)),
            ),
            _ => {}
        }
    }
    reasons
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_payload_accepts_string_time() {
        let payload: CallbackPayload = serde_json::from_str(
            r#"{
                "token": "d85cd024-1548-4165-96c7-7bc88673f194",
                "time": "0.012",
                "memory": 3244,
                "status": {"id": 3, "description": "Accepted"},
                "compile_output": null
            }"#,
        )
        .unwrap();

        assert_eq!(payload.time, Some(0.012));
        assert_eq!(payload.memory, Some(3244));
        assert_eq!(payload.status.description, "Accepted");
    }

    #[test]
    fn test_callback_payload_minimal() {
        let payload: CallbackPayload =
            serde_json::from_str(r#"{"status": {"description": "Compilation Error"}}"#).unwrap();

        assert_eq!(payload.time, None);
        assert_eq!(payload.token, None);
        assert_eq!(payload.status.id, None);
    }

    #[test]
    fn test_rejection_collects_field_reasons() {
        let rejection = DispatchRejection::from_response(
            422,
            r#"{"language_id": ["language with id 999 doesn't exist"], "cpu_time_limit": ["must be less than or equal to 15"]}"#,
        );

        assert_eq!(rejection.status, Some(422));
        assert_eq!(rejection.reasons.len(), 2);
        assert!(rejection
            .reasons
            .contains(&"language_id: language with id 999 doesn't exist".to_string()));
    }

    #[test]
    fn test_rejection_falls_back_to_status() {
        let rejection = DispatchRejection::from_response(503, "");
        assert_eq!(rejection.reasons, vec!["judge responded with HTTP 503".to_string()]);

        let rejection = DispatchRejection::from_response(401, r#"{"error": "authentication failed"}"#);
        assert_eq!(rejection.reasons, vec!["authentication failed".to_string()]);
    }
}
