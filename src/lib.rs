//! GraphWeave compiles declarative selection trees into parameterized
//! Cypher programs.
//!
//! The workspace splits into four crates, re-exported here:
//!
//! - [`core`]: shared error type, Cypher values, temporal and spatial input
//! - [`model`]: the schema model the compiler resolves names against
//! - [`cypher`]: the fluent program builder and its allocation scope
//! - [`translate`]: filter and operation factories plus the transpilers
//!
//! # Example
//!
//! ```
//! use graphweave::model::{Attribute, AttributeType, Entity, SchemaModel};
//! use graphweave::translate::{AstFactory, Selection};
//!
//! let model = SchemaModel::builder()
//!     .entity(
//!         Entity::new("Movie")
//!             .attribute(Attribute::new("title", AttributeType::String)),
//!     )
//!     .build();
//!
//! let selection: Selection = serde_json::from_value(serde_json::json!({
//!     "name": "movies",
//!     "arguments": { "where": { "title": "Dune" } },
//!     "selections": [{ "name": "title" }],
//! }))?;
//!
//! let compiled = AstFactory::new(&model).read("Movie", &selection)?.transpile()?;
//! assert_eq!(
//!     compiled.cypher,
//!     "MATCH (this0:`Movie`)\nWHERE this0.title = $param0\nRETURN this0 { .title } AS this"
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use graphweave_core as core;
pub use graphweave_cypher as cypher;
pub use graphweave_model as model;
pub use graphweave_translate as translate;

pub use graphweave_core::{Error, Result};
pub use graphweave_cypher::CompiledQuery;
pub use graphweave_model::SchemaModel;
pub use graphweave_translate::{AstFactory, QueryAst, Selection};
