//! Filter key parsing
//!
//! Client filter keys encode field, operator, negation and connection-ness
//! in one string: `<fieldName>[Connection][_<operator>][_NOT]`. Keys are
//! parsed exactly once, here, into a typed record; nothing downstream ever
//! re-parses the string.

use graphweave_core::{Error, Result};

/// Comparison operators and relationship quantifiers accepted in filter keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    In,
    Contains,
    StartsWith,
    EndsWith,
    Lt,
    Lte,
    Gt,
    Gte,
    Distance,
    Some,
    All,
    None,
    Single,
}

impl FilterOperator {
    /// Returns true for the quantifiers valid on relationship fields
    pub fn is_relationship_operator(&self) -> bool {
        matches!(
            self,
            FilterOperator::Some
                | FilterOperator::All
                | FilterOperator::None
                | FilterOperator::Single
        )
    }

    /// The suffix spelling of this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "EQ",
            FilterOperator::In => "IN",
            FilterOperator::Contains => "CONTAINS",
            FilterOperator::StartsWith => "STARTS_WITH",
            FilterOperator::EndsWith => "ENDS_WITH",
            FilterOperator::Lt => "LT",
            FilterOperator::Lte => "LTE",
            FilterOperator::Gt => "GT",
            FilterOperator::Gte => "GTE",
            FilterOperator::Distance => "DISTANCE",
            FilterOperator::Some => "SOME",
            FilterOperator::All => "ALL",
            FilterOperator::None => "NONE",
            FilterOperator::Single => "SINGLE",
        }
    }
}

/// Operator suffixes, longest first so `_LTE` never parses as `_LT`
const OPERATOR_SUFFIXES: &[(&str, FilterOperator)] = &[
    ("_STARTS_WITH", FilterOperator::StartsWith),
    ("_ENDS_WITH", FilterOperator::EndsWith),
    ("_CONTAINS", FilterOperator::Contains),
    ("_DISTANCE", FilterOperator::Distance),
    ("_SINGLE", FilterOperator::Single),
    ("_SOME", FilterOperator::Some),
    ("_NONE", FilterOperator::None),
    ("_ALL", FilterOperator::All),
    ("_LTE", FilterOperator::Lte),
    ("_GTE", FilterOperator::Gte),
    ("_IN", FilterOperator::In),
    ("_LT", FilterOperator::Lt),
    ("_GT", FilterOperator::Gt),
];

/// The typed decomposition of one filter key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereField {
    /// Bare field name, with all suffixes stripped
    pub field_name: String,

    /// Explicit operator, if any; EQ is the downstream default
    pub operator: Option<FilterOperator>,

    /// `_NOT` suffix present
    pub is_not: bool,

    /// `Connection` suffix present
    pub is_connection: bool,
}

/// Parse one filter key.
///
/// A key whose field name is empty after stripping (`"_GT"`, `"_NOT"`) is
/// malformed.
pub fn parse_where_field(key: &str) -> Result<WhereField> {
    let mut rest = key;

    let is_not = match rest.strip_suffix("_NOT") {
        Some(stripped) => {
            rest = stripped;
            true
        }
        None => false,
    };

    let mut operator = None;
    for (suffix, op) in OPERATOR_SUFFIXES {
        if let Some(stripped) = rest.strip_suffix(suffix) {
            rest = stripped;
            operator = Some(*op);
            break;
        }
    }

    let is_connection = match rest.strip_suffix("Connection") {
        Some(stripped) => {
            rest = stripped;
            true
        }
        None => false,
    };

    if rest.is_empty() {
        return Err(Error::MalformedWhereKey(key.to_string()));
    }

    Ok(WhereField {
        field_name: rest.to_string(),
        operator,
        is_not,
        is_connection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_field() {
        let parsed = parse_where_field("name").unwrap();
        assert_eq!(parsed.field_name, "name");
        assert_eq!(parsed.operator, None);
        assert!(!parsed.is_not);
        assert!(!parsed.is_connection);
    }

    #[test]
    fn test_operator_and_not() {
        let parsed = parse_where_field("age_GT_NOT").unwrap();
        assert_eq!(parsed.field_name, "age");
        assert_eq!(parsed.operator, Some(FilterOperator::Gt));
        assert!(parsed.is_not);
    }

    #[test]
    fn test_longest_suffix_wins() {
        let parsed = parse_where_field("age_LTE").unwrap();
        assert_eq!(parsed.operator, Some(FilterOperator::Lte));
        let parsed = parse_where_field("name_STARTS_WITH").unwrap();
        assert_eq!(parsed.operator, Some(FilterOperator::StartsWith));
        assert_eq!(parsed.field_name, "name");
    }

    #[test]
    fn test_connection_with_quantifier() {
        let parsed = parse_where_field("actorsConnection_SOME").unwrap();
        assert_eq!(parsed.field_name, "actors");
        assert_eq!(parsed.operator, Some(FilterOperator::Some));
        assert!(parsed.is_connection);
    }

    #[test]
    fn test_malformed_keys() {
        assert!(parse_where_field("_GT").is_err());
        assert!(parse_where_field("_NOT").is_err());
        assert!(parse_where_field("Connection_ALL").is_err());
    }

    #[test]
    fn test_quantifier_classification() {
        assert!(FilterOperator::Single.is_relationship_operator());
        assert!(!FilterOperator::Contains.is_relationship_operator());
    }
}
