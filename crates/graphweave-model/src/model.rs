//! The process-wide schema model
//!
//! Built once, immutable afterwards. Concurrent compilations read it without
//! locking; the compiler never mutates it.

use crate::entity::Entity;
use graphweave_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A polymorphic grouping of concrete entities (union/interface semantics)
///
/// Owns no attributes; member entities carry their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeEntity {
    /// Name exposed to clients
    pub name: String,

    /// Names of the concrete member entities
    pub concrete_entities: Vec<String>,
}

impl CompositeEntity {
    /// Create a composite entity
    pub fn new<S: Into<String>>(name: S, concrete_entities: Vec<S>) -> Self {
        Self {
            name: name.into(),
            concrete_entities: concrete_entities.into_iter().map(Into::into).collect(),
        }
    }
}

/// The immutable catalogue of entities and composites
#[derive(Debug, Clone, Default)]
pub struct SchemaModel {
    entities: BTreeMap<String, Arc<Entity>>,
    composites: BTreeMap<String, Arc<CompositeEntity>>,
}

impl SchemaModel {
    /// Start building a model
    pub fn builder() -> SchemaModelBuilder {
        SchemaModelBuilder::default()
    }

    /// Look up a concrete entity by name
    pub fn entity(&self, name: &str) -> Option<Arc<Entity>> {
        self.entities.get(name).cloned()
    }

    /// Look up a composite entity by name
    pub fn composite(&self, name: &str) -> Option<Arc<CompositeEntity>> {
        self.composites.get(name).cloned()
    }

    /// Resolve a relationship target to a concrete entity.
    ///
    /// A composite target is reported as [`Error::CompositeTarget`]: filters
    /// and projections require concrete attribute sets.
    pub fn concrete_target(&self, name: &str) -> Result<Arc<Entity>> {
        if let Some(entity) = self.entity(name) {
            return Ok(entity);
        }
        if self.composites.contains_key(name) {
            return Err(Error::CompositeTarget(name.to_string()));
        }
        Err(Error::UnknownEntity(name.to_string()))
    }
}

/// Builder for [`SchemaModel`]
#[derive(Debug, Default)]
pub struct SchemaModelBuilder {
    entities: BTreeMap<String, Arc<Entity>>,
    composites: BTreeMap<String, Arc<CompositeEntity>>,
}

impl SchemaModelBuilder {
    /// Add a concrete entity
    pub fn entity(mut self, entity: Entity) -> Self {
        self.entities.insert(entity.name.clone(), Arc::new(entity));
        self
    }

    /// Add a composite entity
    pub fn composite(mut self, composite: CompositeEntity) -> Self {
        self.composites
            .insert(composite.name.clone(), Arc::new(composite));
        self
    }

    /// Finish the model
    pub fn build(self) -> SchemaModel {
        SchemaModel {
            entities: self.entities,
            composites: self.composites,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> SchemaModel {
        SchemaModel::builder()
            .entity(Entity::new("Movie"))
            .entity(Entity::new("Series"))
            .composite(CompositeEntity::new("Production", vec!["Movie", "Series"]))
            .build()
    }

    #[test]
    fn test_entity_lookup() {
        let model = model();
        assert!(model.entity("Movie").is_some());
        assert!(model.entity("Production").is_none());
        assert!(model.composite("Production").is_some());
    }

    #[test]
    fn test_concrete_target() {
        let model = model();
        assert!(model.concrete_target("Movie").is_ok());
        assert!(matches!(
            model.concrete_target("Production"),
            Err(Error::CompositeTarget(_))
        ));
        assert!(matches!(
            model.concrete_target("Ghost"),
            Err(Error::UnknownEntity(_))
        ));
    }
}
