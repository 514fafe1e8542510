//! Sort field descriptors
//!
//! Sorting is a property of the selection tree, not of the generated text;
//! each descriptor knows how to produce its `ORDER BY` expression against
//! whichever variable the caller binds.

use graphweave_cypher::{Expr, SortOrder};
use serde::Deserialize;

/// Sort direction as supplied by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortDirection {
    pub fn order(&self) -> SortOrder {
        match self {
            SortDirection::Asc => SortOrder::Asc,
            SortDirection::Desc => SortOrder::Desc,
        }
    }
}

/// One property to sort by
#[derive(Debug, Clone)]
pub struct PropertySort {
    pub field: String,
    pub direction: SortDirection,
}

impl PropertySort {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// The `ORDER BY` item for this sort, against `base`
    pub fn sort_item(&self, base: &Expr) -> (Expr, SortOrder) {
        (base.clone().dot(&self.field), self.direction.order())
    }
}

/// Sort input for connection reads, split by what the properties live on
#[derive(Debug, Clone, Default)]
pub struct ConnectionSort {
    /// Sorts on the target node's properties
    pub node: Vec<PropertySort>,

    /// Sorts on the relationship's own properties
    pub edge: Vec<PropertySort>,
}
