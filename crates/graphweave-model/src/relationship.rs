//! Relationship definitions between entities

use crate::attribute::Attribute;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Direction of a relationship as declared on its owning entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Edge points from the owning entity to the target (->)
    Out,
    /// Edge points from the target to the owning entity (<-)
    In,
}

/// A named relationship from one entity to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Field name as exposed to clients
    pub name: String,

    /// Graph edge type label (e.g. `ACTED_IN`)
    pub edge_type: String,

    /// Direction relative to the owning entity
    pub direction: Direction,

    /// Name of the target entity (concrete or composite)
    pub target: String,

    /// Whether the relationship has array cardinality
    pub array: bool,

    /// Attributes stored on the edge itself
    pub attributes: BTreeMap<String, Attribute>,
}

impl Relationship {
    /// Create an array-cardinality relationship without edge attributes
    pub fn new<S: Into<String>>(name: S, edge_type: S, direction: Direction, target: S) -> Self {
        Self {
            name: name.into(),
            edge_type: edge_type.into(),
            direction,
            target: target.into(),
            array: true,
            attributes: BTreeMap::new(),
        }
    }

    /// Mark the relationship as single-cardinality
    pub fn single(mut self) -> Self {
        self.array = false;
        self
    }

    /// Add an edge attribute
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.insert(attribute.name.clone(), attribute);
        self
    }

    /// Look up an edge attribute by name.
    ///
    /// Absence is reported as `None`; error construction is the caller's
    /// concern.
    pub fn find_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeType;

    #[test]
    fn test_relationship_builder() {
        let rel = Relationship::new("actors", "ACTED_IN", Direction::In, "Actor")
            .attribute(Attribute::new("screenTime", AttributeType::Int));
        assert!(rel.array);
        assert_eq!(rel.direction, Direction::In);
        assert!(rel.find_attribute("screenTime").is_some());
        assert!(rel.find_attribute("salary").is_none());
    }

    #[test]
    fn test_single_cardinality() {
        let rel = Relationship::new("manager", "MANAGES", Direction::In, "User").single();
        assert!(!rel.array);
    }
}
