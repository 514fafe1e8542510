//! Selection tree input
//!
//! The raw, deserialized shape of a client request: a named field with
//! arguments and nested selections. The factory resolves this against the
//! schema model into typed operations.

use serde::Deserialize;
use serde_json::Value;

use crate::sort::SortDirection;

/// One selected field with its arguments and sub-selections
#[derive(Debug, Clone, Deserialize)]
pub struct Selection {
    pub name: String,

    /// Client-chosen output key; defaults to the field name
    #[serde(default)]
    pub alias: Option<String>,

    #[serde(default)]
    pub arguments: Arguments,

    #[serde(default)]
    pub selections: Vec<Selection>,
}

impl Selection {
    /// The output key this selection projects under
    pub fn alias(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Find a direct sub-selection by field name
    pub fn find(&self, name: &str) -> Option<&Selection> {
        self.selections.iter().find(|s| s.name == name)
    }
}

/// Arguments attached to a selection
#[derive(Debug, Clone, Deserialize)]
pub struct Arguments {
    #[serde(rename = "where", default)]
    pub where_arg: Option<Value>,

    #[serde(default)]
    pub sort: Vec<SortInput>,

    #[serde(default)]
    pub skip: Option<Value>,

    #[serde(default)]
    pub limit: Option<Value>,

    /// Opaque cursor; resume after this row
    #[serde(default)]
    pub after: Option<String>,

    /// Whether the traversal keeps the schema's direction arrow
    #[serde(default = "default_directed")]
    pub directed: bool,
}

fn default_directed() -> bool {
    true
}

// Missing `arguments` must behave like an empty arguments object, so the
// derived all-false Default is wrong for `directed`.
impl Default for Arguments {
    fn default() -> Self {
        Arguments {
            where_arg: None,
            sort: Vec::new(),
            skip: None,
            limit: None,
            after: None,
            directed: true,
        }
    }
}

/// One sort entry: a `{ field: ASC|DESC }` map for reads, or a
/// connection-style `{ node: {...}, edge: {...} }` pair
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct SortInput(pub serde_json::Map<String, Value>);

impl SortInput {
    /// True when the entry uses the connection `{ node, edge }` shape
    pub fn is_connection_style(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .iter()
                .all(|(key, value)| (key == "node" || key == "edge") && value.is_object())
    }
}

/// Parse a `{ field: ASC|DESC }` map into property sorts, in input order
pub(crate) fn property_sorts(
    map: &serde_json::Map<String, Value>,
) -> Result<Vec<(String, SortDirection)>, serde_json::Error> {
    map.iter()
        .map(|(field, direction)| {
            let direction: SortDirection = serde_json::from_value(direction.clone())?;
            Ok((field.clone(), direction))
        })
        .collect()
}
