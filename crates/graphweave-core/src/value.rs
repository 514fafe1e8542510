//! Parameter values for compiled queries
//!
//! Every literal from a client filter is interned as a [`CypherValue`] in the
//! flat parameter map of a compiled program.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A literal value bound to a query parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CypherValue {
    /// Null/missing value
    Null,

    /// Boolean value
    Boolean(bool),

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit floating point
    Float(f64),

    /// UTF-8 string
    String(String),

    /// List of values
    List(Vec<CypherValue>),

    /// Map of string keys to values
    Map(BTreeMap<String, CypherValue>),
}

impl CypherValue {
    /// Convert a JSON value from the client boundary into a parameter value.
    ///
    /// Integers are kept exact when they fit in `i64`; larger numbers fall
    /// back to floating point.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CypherValue::Null,
            serde_json::Value::Bool(b) => CypherValue::Boolean(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CypherValue::Integer(i)
                } else {
                    CypherValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => CypherValue::String(s.clone()),
            serde_json::Value::Array(items) => {
                CypherValue::List(items.iter().map(CypherValue::from_json).collect())
            }
            serde_json::Value::Object(map) => CypherValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), CypherValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Returns true if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, CypherValue::Null)
    }

    /// Try to get as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CypherValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CypherValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<i64> for CypherValue {
    fn from(i: i64) -> Self {
        CypherValue::Integer(i)
    }
}

impl From<bool> for CypherValue {
    fn from(b: bool) -> Self {
        CypherValue::Boolean(b)
    }
}

impl From<&str> for CypherValue {
    fn from(s: &str) -> Self {
        CypherValue::String(s.to_string())
    }
}

impl From<String> for CypherValue {
    fn from(s: String) -> Self {
        CypherValue::String(s)
    }
}

/// Renders the value as an inline Cypher literal.
///
/// Used for the few literals that are embedded in program text rather than
/// parameterized, such as the `true`/`false` guards of empty logical filters
/// and `__resolveType` markers.
impl fmt::Display for CypherValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CypherValue::Null => write!(f, "NULL"),
            CypherValue::Boolean(b) => write!(f, "{b}"),
            CypherValue::Integer(i) => write!(f, "{i}"),
            CypherValue::Float(x) => write!(f, "{x}"),
            CypherValue::String(s) => {
                write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
            }
            CypherValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            CypherValue::Map(map) => {
                write!(f, "{{ ")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, " }}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(CypherValue::from_json(&json!(null)), CypherValue::Null);
        assert_eq!(CypherValue::from_json(&json!(42)), CypherValue::Integer(42));
        assert_eq!(
            CypherValue::from_json(&json!("Ada")),
            CypherValue::String("Ada".to_string())
        );
        assert_eq!(
            CypherValue::from_json(&json!(1.5)),
            CypherValue::Float(1.5)
        );
    }

    #[test]
    fn test_from_json_nested() {
        let value = CypherValue::from_json(&json!({ "tags": ["a", "b"], "n": 1 }));
        let CypherValue::Map(map) = value else {
            panic!("expected map");
        };
        assert_eq!(map["n"], CypherValue::Integer(1));
        assert_eq!(
            map["tags"],
            CypherValue::List(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_display_quoting() {
        assert_eq!(CypherValue::from("it's").to_string(), r"'it\'s'");
        assert_eq!(CypherValue::Boolean(true).to_string(), "true");
        assert_eq!(CypherValue::Null.to_string(), "NULL");
        assert_eq!(
            CypherValue::List(vec![1.into(), 2.into()]).to_string(),
            "[1, 2]"
        );
    }
}
