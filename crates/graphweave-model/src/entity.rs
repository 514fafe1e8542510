//! Entity definitions
//!
//! An entity is a named vertex type with attributes, relationships and an
//! optional authorization annotation. Entities are immutable once the model
//! is built and are shared behind `Arc` across concurrent compilations.

use crate::attribute::Attribute;
use crate::relationship::Relationship;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Authorization rules attached to an entity
///
/// Both rules are where-objects in the filter key encoding, with `$jwt.<claim>`
/// string placeholders resolved at compile time. `filter` is silently ANDed
/// into the WHERE clause; `validate` becomes a runtime guard that the
/// execution layer surfaces as an authorization failure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Authorization {
    /// Rows not matching this predicate are filtered out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<serde_json::Value>,

    /// Rows not matching this predicate abort the query at runtime
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate: Option<serde_json::Value>,
}

/// A named vertex type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity name as exposed to clients
    pub name: String,

    /// Node labels matched in the graph (usually just the name)
    pub labels: Vec<String>,

    /// Uniquely-named attributes
    pub attributes: BTreeMap<String, Attribute>,

    /// Uniquely-named relationships to other entities
    pub relationships: BTreeMap<String, Relationship>,

    /// Optional authorization annotation
    pub authorization: Option<Authorization>,
}

impl Entity {
    /// Create an entity labeled with its own name
    pub fn new<S: Into<String>>(name: S) -> Self {
        let name = name.into();
        Self {
            labels: vec![name.clone()],
            name,
            attributes: BTreeMap::new(),
            relationships: BTreeMap::new(),
            authorization: None,
        }
    }

    /// Replace the matched labels
    pub fn labels<S: Into<String>>(mut self, labels: Vec<S>) -> Self {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Add an attribute
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.insert(attribute.name.clone(), attribute);
        self
    }

    /// Add a relationship
    pub fn relationship(mut self, relationship: Relationship) -> Self {
        self.relationships
            .insert(relationship.name.clone(), relationship);
        self
    }

    /// Attach an authorization annotation
    pub fn authorization(mut self, authorization: Authorization) -> Self {
        self.authorization = Some(authorization);
        self
    }

    /// Look up an attribute by name.
    ///
    /// Absence is reported as `None` rather than an error, deferring error
    /// reporting to the filter factory.
    pub fn find_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Look up a relationship by name.
    pub fn find_relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeType;
    use crate::relationship::Direction;

    fn user() -> Entity {
        Entity::new("User")
            .attribute(Attribute::new("id", AttributeType::Id).required())
            .attribute(Attribute::new("name", AttributeType::String))
            .relationship(Relationship::new("friends", "KNOWS", Direction::Out, "User"))
    }

    #[test]
    fn test_find_attribute() {
        let entity = user();
        assert!(entity.find_attribute("name").is_some());
        assert!(entity.find_attribute("email").is_none());
    }

    #[test]
    fn test_find_relationship() {
        let entity = user();
        assert!(entity.find_relationship("friends").is_some());
        assert!(entity.find_relationship("name").is_none());
    }

    #[test]
    fn test_default_labels() {
        assert_eq!(user().labels, vec!["User".to_string()]);
    }
}
