pub mod disk;
pub mod resources;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("field '{0}' is missing")]
    Missing(&'static str),
    #[error("field '{field}' has unexpected value {value}")]
    Invalid { field: &'static str, value: String },
}

impl FieldError {
    fn invalid(field: &'static str, value: &Value) -> Self {
        FieldError::Invalid {
            field,
            value: value.to_string(),
        }
    }
}

// JSON null counts as absent.
fn require<'a>(value: Option<&'a Value>, field: &'static str) -> Result<&'a Value, FieldError> {
    match value {
        None | Some(Value::Null) => Err(FieldError::Missing(field)),
        Some(v) => Ok(v),
    }
}

fn parse_f64(value: &Value, field: &'static str) -> Result<f64, FieldError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim_end().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| FieldError::invalid(field, value))
}

fn parse_i64(value: &Value, field: &'static str) -> Result<i64, FieldError> {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().and_then(|u| i64::try_from(u).ok()))
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                    .map(|f| f.trunc() as i64)
            }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| FieldError::invalid(field, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_is_missing() {
        let v = Value::Null;
        assert_eq!(require(Some(&v), "x"), Err(FieldError::Missing("x")));
        assert_eq!(require(None, "x"), Err(FieldError::Missing("x")));
    }

    #[test]
    fn floats_from_numbers_and_strings() {
        assert_eq!(parse_f64(&json!(85), "f"), Ok(85.0));
        assert_eq!(parse_f64(&json!("85"), "f"), Ok(85.0));
        assert_eq!(parse_f64(&json!(" 12.5% "), "f"), Ok(12.5));
        assert!(parse_f64(&json!("n/a"), "f").is_err());
        assert!(parse_f64(&json!("NaN"), "f").is_err());
        assert!(parse_f64(&json!(true), "f").is_err());
    }

    #[test]
    fn integers_from_numbers_and_strings() {
        assert_eq!(parse_i64(&json!(1000), "i"), Ok(1000));
        assert_eq!(parse_i64(&json!(1000.9), "i"), Ok(1000));
        assert_eq!(parse_i64(&json!("4096"), "i"), Ok(4096));
        assert!(parse_i64(&json!("4.5G"), "i").is_err());
        assert!(parse_i64(&json!([1]), "i").is_err());
    }

    #[test]
    fn invalid_error_names_field_and_value() {
        let err = parse_f64(&json!("abc"), "used_pct").unwrap_err();
        assert_eq!(err.to_string(), "field 'used_pct' has unexpected value \"abc\"");
    }
}
