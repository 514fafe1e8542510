//! Pagination arguments and cursor codec
//!
//! Cursors are opaque to clients: base64 over `offset:<n>`. Resuming after
//! a cursor means skipping `n + 1` rows. An explicit `skip` argument always
//! wins over `after`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use graphweave_core::{CypherValue, Error, Result};
use graphweave_cypher::{Param, Scope};

const CURSOR_PREFIX: &str = "offset:";

/// Resolved skip/limit for one level of the tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl Pagination {
    /// Resolve raw arguments into a pagination record.
    ///
    /// Returns `None` when no argument was supplied at all, so callers can
    /// skip emitting a rebinding clause entirely.
    pub fn from_args(
        skip: Option<&serde_json::Value>,
        limit: Option<&serde_json::Value>,
        after: Option<&str>,
    ) -> Result<Option<Self>> {
        let mut resolved = Pagination {
            skip: skip.map(|v| parse_count("skip", v)).transpose()?,
            limit: limit.map(|v| parse_count("limit", v)).transpose()?,
        };

        if resolved.skip.is_none() {
            if let Some(cursor) = after {
                let skip = decode_cursor(cursor)?
                    .checked_add(1)
                    .filter(|n| *n <= i64::MAX as u64)
                    .ok_or_else(|| Error::InvalidCursor(cursor.to_string()))?;
                resolved.skip = Some(skip);
            }
        }

        if resolved.skip.is_none() && resolved.limit.is_none() {
            return Ok(None);
        }
        Ok(Some(resolved))
    }

    pub fn has_any(&self) -> bool {
        self.skip.is_some() || self.limit.is_some()
    }

    /// Interns the skip count as a parameter
    pub fn skip_param(&self, scope: &mut Scope) -> Option<Param> {
        self.skip
            .map(|n| scope.param(CypherValue::Integer(n as i64)))
    }

    /// Interns the limit count as a parameter
    pub fn limit_param(&self, scope: &mut Scope) -> Option<Param> {
        self.limit
            .map(|n| scope.param(CypherValue::Integer(n as i64)))
    }
}

// Counts are carried as i64 parameters, so anything past i64::MAX is out
// of range regardless of sign.
fn parse_count(name: &str, value: &serde_json::Value) -> Result<u64> {
    value
        .as_u64()
        .filter(|n| *n <= i64::MAX as u64)
        .ok_or_else(|| Error::InvalidPagination(format!("{name} must be a non-negative integer")))
}

/// Encode a zero-based row offset as an opaque cursor
pub fn encode_cursor(offset: u64) -> String {
    STANDARD.encode(format!("{CURSOR_PREFIX}{offset}"))
}

/// Decode a cursor back to its row offset
pub fn decode_cursor(cursor: &str) -> Result<u64> {
    let bytes = STANDARD
        .decode(cursor)
        .map_err(|_| Error::InvalidCursor(cursor.to_string()))?;
    let text =
        String::from_utf8(bytes).map_err(|_| Error::InvalidCursor(cursor.to_string()))?;
    let offset = text
        .strip_prefix(CURSOR_PREFIX)
        .ok_or_else(|| Error::InvalidCursor(cursor.to_string()))?;
    offset
        .parse::<u64>()
        .map_err(|_| Error::InvalidCursor(cursor.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cursor_roundtrip() {
        let cursor = encode_cursor(41);
        assert_eq!(decode_cursor(&cursor).unwrap(), 41);
    }

    #[test]
    fn test_garbage_cursor_rejected() {
        assert!(decode_cursor("!!not-base64!!").is_err());
        let wrong_prefix = STANDARD.encode("page:3");
        assert!(decode_cursor(&wrong_prefix).is_err());
    }

    #[test]
    fn test_after_means_skip_plus_one() {
        let cursor = encode_cursor(4);
        let page = Pagination::from_args(None, None, Some(&cursor))
            .unwrap()
            .unwrap();
        assert_eq!(page.skip, Some(5));
    }

    #[test]
    fn test_explicit_skip_beats_cursor() {
        let cursor = encode_cursor(100);
        let skip = json!(2);
        let page = Pagination::from_args(Some(&skip), None, Some(&cursor))
            .unwrap()
            .unwrap();
        assert_eq!(page.skip, Some(2));
    }

    #[test]
    fn test_negative_skip_rejected() {
        let skip = json!(-1);
        assert!(Pagination::from_args(Some(&skip), None, None).is_err());
    }

    #[test]
    fn test_cursor_at_offset_max_rejected() {
        let cursor = encode_cursor(u64::MAX);
        let err = Pagination::from_args(None, None, Some(&cursor)).unwrap_err();
        assert!(matches!(err, Error::InvalidCursor(_)));
    }

    #[test]
    fn test_oversized_count_rejected() {
        let skip = json!(u64::MAX);
        assert!(Pagination::from_args(Some(&skip), None, None).is_err());
        let limit = json!(i64::MAX as u64 + 1);
        assert!(Pagination::from_args(None, Some(&limit), None).is_err());
    }

    #[test]
    fn test_no_arguments_is_none() {
        assert_eq!(Pagination::from_args(None, None, None).unwrap(), None);
    }

    #[test]
    fn test_params_are_interned() {
        let mut scope = Scope::new();
        let page = Pagination {
            skip: Some(3),
            limit: Some(10),
        };
        let skip = page.skip_param(&mut scope).unwrap();
        let limit = page.limit_param(&mut scope).unwrap();
        assert_eq!(skip.to_string(), "$param0");
        assert_eq!(limit.to_string(), "$param1");
    }
}
