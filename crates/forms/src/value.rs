//! Scalar values held by fields and their conversion from loosely typed JSON.

use std::fmt;

use serde_json::Value;

use crate::field::FieldType;

/// One value of a field's declared scalar type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl Scalar {
    /// Zero value of a type, used when a schema declares no usable default.
    pub fn zero(field_type: FieldType) -> Scalar {
        match field_type {
            FieldType::Int => Scalar::Int(0),
            FieldType::Bool => Scalar::Bool(false),
            FieldType::Markdown | FieldType::Text | FieldType::Code | FieldType::String => {
                Scalar::Text(String::new())
            }
        }
    }

    /// Coerce a JSON value to `field_type`. `null` and structured values do not coerce.
    pub fn coerce(field_type: FieldType, value: &Value) -> Option<Scalar> {
        match field_type {
            FieldType::Int => match value {
                Value::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
                    .map(Scalar::Int),
                Value::String(s) => parse_int(s).map(Scalar::Int),
                Value::Bool(b) => Some(Scalar::Int(i64::from(*b))),
                _ => None,
            },
            FieldType::Bool => match value {
                Value::Bool(b) => Some(Scalar::Bool(*b)),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" => Some(Scalar::Bool(true)),
                    "false" | "" => Some(Scalar::Bool(false)),
                    _ => None,
                },
                Value::Number(n) => Some(Scalar::Bool(n.as_f64().is_some_and(|f| f != 0.0))),
                _ => None,
            },
            FieldType::Markdown | FieldType::Text | FieldType::Code | FieldType::String => {
                match value {
                    Value::String(s) => Some(Scalar::Text(s.clone())),
                    Value::Number(n) => Some(Scalar::Text(n.to_string())),
                    Value::Bool(b) => Some(Scalar::Text(b.to_string())),
                    _ => None,
                }
            }
        }
    }

    /// Blank values are suppressed in view mode: empty or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        matches!(self, Scalar::Text(s) if s.trim().is_empty())
    }

    /// Truthiness used when collecting list elements. Every integer counts, `0` included.
    pub fn is_kept_in_list(&self) -> bool {
        match self {
            Scalar::Text(s) => !s.is_empty(),
            Scalar::Int(_) => true,
            Scalar::Bool(b) => *b,
        }
    }

    pub fn to_json(&self) -> Value {
        Value::from(self.clone())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Text(s) => Value::String(s),
            Scalar::Int(n) => Value::from(n),
            Scalar::Bool(b) => Value::Bool(b),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// Parse user-entered integer text. Accepts surrounding whitespace and a
/// fractional part, which is truncated.
pub(crate) fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}
