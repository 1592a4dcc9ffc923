//! Comparison values and their wire typing

use std::fmt;

use crate::wire::QueryOrdering;

/// A value on the right-hand side of a comparison
///
/// Numeric variants are compared as real numbers by the service, text is
/// compared lexicographically. `Bool` and `Json` have no ordering of their
/// own and are sent as their JSON text with lexicographic ordering.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bool(bool),
    Json(serde_json::Value),
}

impl QueryValue {
    /// Serialize the value and infer the ordering the service should use
    pub fn typify(&self) -> (String, QueryOrdering) {
        match self {
            QueryValue::Int(v) => (v.to_string(), QueryOrdering::RealNumbers),
            QueryValue::UInt(v) => (v.to_string(), QueryOrdering::RealNumbers),
            QueryValue::Float(v) => (format_float(*v), QueryOrdering::RealNumbers),
            QueryValue::Text(s) => (s.clone(), QueryOrdering::Lexicographic),
            QueryValue::Bool(b) => (b.to_string(), QueryOrdering::Lexicographic),
            QueryValue::Json(value) => typify_json(value),
        }
    }

    pub fn is_numeric(&self) -> bool {
        match self {
            QueryValue::Int(_) | QueryValue::UInt(_) | QueryValue::Float(_) => true,
            QueryValue::Json(serde_json::Value::Number(_)) => true,
            _ => false,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self,
            QueryValue::Text(_) | QueryValue::Json(serde_json::Value::String(_))
        )
    }
}

/// Fixed six-decimal rendering, the form the service indexes numbers in
fn format_float(v: f64) -> String {
    format!("{:.6}", v)
}

fn typify_json(value: &serde_json::Value) -> (String, QueryOrdering) {
    match value {
        serde_json::Value::String(s) => (s.clone(), QueryOrdering::Lexicographic),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                (i.to_string(), QueryOrdering::RealNumbers)
            } else if let Some(u) = n.as_u64() {
                (u.to_string(), QueryOrdering::RealNumbers)
            } else {
                let f = n.as_f64().unwrap_or_default();
                (format_float(f), QueryOrdering::RealNumbers)
            }
        }
        other => (other.to_string(), QueryOrdering::Lexicographic),
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Text(s) => write!(f, "{:?}", s),
            other => f.write_str(&other.typify().0),
        }
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for QueryValue {
            fn from(v: $t) -> Self {
                QueryValue::Int(v as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for QueryValue {
            fn from(v: $t) -> Self {
                QueryValue::UInt(v as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for QueryValue {
    fn from(v: f32) -> Self {
        QueryValue::Float(v as f64)
    }
}

impl From<f64> for QueryValue {
    fn from(v: f64) -> Self {
        QueryValue::Float(v)
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Text(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::Text(v)
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Bool(v)
    }
}

impl From<serde_json::Value> for QueryValue {
    fn from(v: serde_json::Value) -> Self {
        QueryValue::Json(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integers_are_real_numbers() {
        let cases: Vec<(QueryValue, &str)> = vec![
            (1i32.into(), "1"),
            ((-42i64).into(), "-42"),
            (7u8.into(), "7"),
            (u64::MAX.into(), "18446744073709551615"),
            (i64::MIN.into(), "-9223372036854775808"),
            (3usize.into(), "3"),
        ];
        for (value, expected) in cases {
            assert_eq!(
                value.typify(),
                (expected.to_string(), QueryOrdering::RealNumbers)
            );
        }
    }

    #[test]
    fn test_floats_use_six_decimals() {
        assert_eq!(
            QueryValue::from(30.0f64).typify(),
            ("30.000000".to_string(), QueryOrdering::RealNumbers)
        );
        assert_eq!(QueryValue::from(-0.5f32).typify().0, "-0.500000");
    }

    #[test]
    fn test_strings_are_lexicographic() {
        assert_eq!(
            QueryValue::from("jason").typify(),
            ("jason".to_string(), QueryOrdering::Lexicographic)
        );
    }

    #[test]
    fn test_fallback_is_json_text() {
        assert_eq!(
            QueryValue::from(true).typify(),
            ("true".to_string(), QueryOrdering::Lexicographic)
        );
        assert_eq!(
            QueryValue::from(json!({"a": [1, 2]})).typify(),
            (r#"{"a":[1,2]}"#.to_string(), QueryOrdering::Lexicographic)
        );
        assert_eq!(
            QueryValue::from(json!(12)).typify(),
            ("12".to_string(), QueryOrdering::RealNumbers)
        );
        assert_eq!(
            QueryValue::from(json!("x")).typify(),
            ("x".to_string(), QueryOrdering::Lexicographic)
        );
    }
}
