//! Selection-to-Cypher translation
//!
//! Compiles declarative selection trees and filter objects into
//! parameterized Cypher programs:
//!
//! - **Filter factory**: parses `where` objects into a typed filter tree
//! - **Operation factory**: resolves selections into read, connection and
//!   aggregation operations against the schema model
//! - **Transpilers**: depth-first compilation into clause lists, with
//!   request-scoped variable and parameter allocation
//!
//! Compilation is pure and deterministic: equal inputs produce
//! byte-identical programs and parameter maps.

pub mod aggregation;
pub mod ast;
pub mod connection;
pub mod factory;
pub mod field;
pub mod filter;
pub mod filter_factory;
pub mod operation;
pub mod pagination;
pub mod read;
pub mod relationship_filter;
pub mod selection;
pub mod sort;
pub mod where_parse;

mod util;

pub use ast::QueryAst;
pub use factory::AstFactory;
pub use field::{AggregationField, AggregationOp, AttributeField, Field};
pub use filter::{Filter, LogicalOperator};
pub use filter_factory::FilterFactory;
pub use operation::{Operation, QueryNode};
pub use pagination::{Pagination, decode_cursor, encode_cursor};
pub use relationship_filter::Quantifier;
pub use selection::{Arguments, Selection, SortInput};
pub use sort::{ConnectionSort, PropertySort, SortDirection};
pub use where_parse::{FilterOperator, WhereField, parse_where_field};

#[cfg(test)]
pub(crate) mod fixtures {
    use graphweave_model::{
        Attribute, AttributeType, CompositeEntity, Direction, Entity, Relationship, SchemaModel,
    };

    /// A small movie-and-users schema shared across tests
    pub fn model() -> SchemaModel {
        SchemaModel::builder()
            .entity(
                Entity::new("User")
                    .attribute(Attribute::new("id", AttributeType::Id))
                    .attribute(Attribute::new("name", AttributeType::String))
                    .attribute(Attribute::new("age", AttributeType::Int))
                    .attribute(Attribute::new("born", AttributeType::DateTime))
                    .attribute(Attribute::new("shift", AttributeType::Duration))
                    .attribute(Attribute::new("location", AttributeType::Point))
                    .relationship(Relationship::new("friends", "KNOWS", Direction::Out, "User"))
                    .relationship(
                        Relationship::new("company", "WORKS_AT", Direction::Out, "Company")
                            .single(),
                    ),
            )
            .entity(Entity::new("Company").attribute(Attribute::new("name", AttributeType::String)))
            .entity(
                Entity::new("Actor")
                    .attribute(Attribute::new("name", AttributeType::String))
                    .relationship(
                        Relationship::new("actedIn", "ACTED_IN", Direction::Out, "Movie")
                            .attribute(Attribute::new("screenTime", AttributeType::Int)),
                    )
                    .relationship(Relationship::new(
                        "workedOn",
                        "WORKED_ON",
                        Direction::Out,
                        "Production",
                    )),
            )
            .entity(
                Entity::new("Movie")
                    .attribute(Attribute::new("title", AttributeType::String))
                    .attribute(Attribute::new("released", AttributeType::Int)),
            )
            .entity(
                Entity::new("Series")
                    .attribute(Attribute::new("title", AttributeType::String))
                    .attribute(Attribute::new("episodes", AttributeType::Int)),
            )
            .composite(CompositeEntity::new("Production", vec!["Movie", "Series"]))
            .build()
    }
}
