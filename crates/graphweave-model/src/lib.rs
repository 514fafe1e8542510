//! GraphWeave Schema Model
//!
//! The immutable, process-wide catalogue of entities, attributes and
//! relationships consumed read-only by the query compiler.
//!
//! # Modules
//!
//! - `attribute` - Attribute definitions and type classification
//! - `relationship` - Relationships with direction, edge type and cardinality
//! - `entity` - Entities and authorization annotations
//! - `model` - The schema model and composite entities

pub mod attribute;
pub mod entity;
pub mod model;
pub mod relationship;

pub use attribute::{Attribute, AttributeType};
pub use entity::{Authorization, Entity};
pub use model::{CompositeEntity, SchemaModel, SchemaModelBuilder};
pub use relationship::{Direction, Relationship};
