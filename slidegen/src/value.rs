//! Scalar values carried by datasets and context variables.

use std::{cmp::Ordering, collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// We use [`std::collections::BTreeMap`] as our default map structure.
pub type Map<K, V> = BTreeMap<K, V>;

/// A single scalar value, either a dataset cell or a context variable.
///
/// Deserializes untagged from JSON and YAML, so `3` becomes
/// [`Value::Signed`], `3.5` becomes [`Value::Float`] and `null` becomes
/// [`Value::Null`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Signed(i64),
    Float(f64),
    String(String),
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl Value {
    /// Numeric view of this value. Strings are never coerced.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Signed(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Signed(_) | Self::Float(_))
    }

    /// Truthiness as used by conditional text blocks.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Signed(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) => !s.is_empty(),
        }
    }

    /// Human-readable name of this value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Signed(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }

    /// Equality where integers and floats compare by numeric value.
    pub fn loose_eq(&self, other: &Self) -> bool {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }

    /// Ordering between two numbers or two strings. Any other pairing has
    /// no ordering.
    pub fn partial_order(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }
}

/// Formats a float without a trailing `.0` for integral values and without
/// negative zero.
pub(crate) fn format_number(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    format!("{}", f)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Signed(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", format_number(*x)),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Signed(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Signed(i as i64)
    }
}

impl From<u32> for Value {
    fn from(u: u32) -> Self {
        Self::Signed(u as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn deserializes_untagged_from_json() {
        let values: Vec<Value> =
            serde_json::from_str(r#"[null, true, 3, 3.5, "three"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Signed(3),
                Value::Float(3.5),
                Value::String("three".to_string()),
            ]
        );
    }

    #[test]
    fn deserializes_untagged_from_yaml() {
        let values: Vec<Value> = serde_yaml::from_str("- ~\n- 2023\n- 0.25\n- Beijing\n").unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Signed(2023),
                Value::Float(0.25),
                Value::from("Beijing"),
            ]
        );
    }

    #[test]
    fn display_drops_integral_fraction() {
        assert_eq!(Value::Float(2023.0).to_string(), "2023");
        assert_eq!(Value::Float(12.5).to_string(), "12.5");
        assert_eq!(Value::Float(-0.0).to_string(), "0");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn numbers_compare_across_representations() {
        assert!(Value::Signed(3).loose_eq(&Value::Float(3.0)));
        assert!(!Value::from("3").loose_eq(&Value::Signed(3)));
        assert_eq!(
            Value::Signed(2).partial_order(&Value::Float(2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(Value::from("a").partial_order(&Value::Signed(1)), None);
    }
}
