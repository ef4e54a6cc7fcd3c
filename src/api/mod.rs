pub mod department;
pub mod employee;
pub mod job;
pub mod resource;
pub mod user;

use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Value;

use crate::error::ApiError;

/// Trimmed, non-empty value of a required create field.
pub fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Validation(format!("{} is required.", name)))
}

/// Optional number that may arrive as a JSON number, a numeric string, or
/// an empty string (treated as absent).
pub fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| D::Error::custom("expected a number")),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("'{}' is not a number", s))),
        Some(other) => Err(D::Error::custom(format!("expected a number, got {}", other))),
    }
}

pub fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| D::Error::custom("expected a non-negative integer")),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("'{}' is not a non-negative integer", s))),
        Some(other) => Err(D::Error::custom(format!(
            "expected a non-negative integer, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "lenient_f64")]
        salary: Option<f64>,
        #[serde(default, deserialize_with = "lenient_u64")]
        manager_id: Option<u64>,
    }

    #[test]
    fn numbers_accept_strings_and_blanks() {
        let body: Body = serde_json::from_value(json!({ "salary": "9000", "manager_id": "" })).unwrap();
        assert_eq!(body.salary, Some(9000.0));
        assert_eq!(body.manager_id, None);

        let body: Body = serde_json::from_value(json!({})).unwrap();
        assert_eq!(body.salary, None);

        assert!(serde_json::from_value::<Body>(json!({ "manager_id": "abc" })).is_err());
        assert!(serde_json::from_value::<Body>(json!({ "salary": true })).is_err());
    }

    #[test]
    fn required_rejects_blank() {
        assert_eq!(required(Some(" IT_PROG ".into()), "job_id").unwrap(), "IT_PROG");
        let err = required(Some("  ".into()), "job_id").unwrap_err();
        assert_eq!(err.to_string(), "job_id is required.");
        assert!(required(None, "job_id").is_err());
    }
}
