//! GraphWeave Cypher Builder
//!
//! Low-level construction of parameterized Cypher programs.
//!
//! # Overview
//!
//! The builder provides:
//! - Request-scoped variable and parameter allocation
//! - Pattern algebra (nodes, relationships, single-hop paths)
//! - Expression and boolean-predicate algebra
//! - Clause algebra (MATCH, WITH, UNWIND, RETURN, CALL subqueries)
//! - Deterministic rendering to program text plus a flat parameter map
//!
//! Everything is an immutable value; a program is assembled by pure
//! composition and rendered exactly once per compilation.

pub mod clause;
pub mod expr;
pub mod pattern;
pub mod scope;

pub use clause::{Clause, Item, SortOrder, WithClause, render_program};
pub use expr::{Comparator, Expr, ListPredicateKind, ProjectionItem};
pub use pattern::{NodePattern, Pattern, PatternDirection, RelationshipPattern};
pub use scope::{Param, Scope, Variable};

use graphweave_core::CypherValue;
use serde::Serialize;
use std::collections::BTreeMap;

/// The output of one compilation: program text plus its parameters.
///
/// Self-contained: every `$param` reference in the text resolves in the
/// map, and every variable is bound within the program.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    /// Final Cypher program text
    pub cypher: String,

    /// Flat parameter name to literal value mapping
    pub params: BTreeMap<String, CypherValue>,
}
