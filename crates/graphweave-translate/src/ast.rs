//! Query tree and compilation entry point
//!
//! Owns the root operation and drives depth-first transpilation with a
//! fresh allocation scope per compile, so equal trees always produce
//! byte-identical programs.

use graphweave_core::Result;
use graphweave_cypher::{CompiledQuery, Scope, Variable, render_program};
use tracing::debug;

use crate::operation::Operation;

/// The compiled form of one selection tree
#[derive(Debug)]
pub struct QueryAst {
    operation: Operation,
}

impl QueryAst {
    pub fn new(operation: Operation) -> Self {
        Self { operation }
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Compile the tree into program text and its parameter map
    pub fn transpile(&self) -> Result<CompiledQuery> {
        debug!(nodes = self.operation.node_count(), "transpiling query tree");
        let mut scope = Scope::new();
        let clauses = self
            .operation
            .transpile(&mut scope, None, Variable::named("this"))?;
        Ok(CompiledQuery {
            cypher: render_program(&clauses),
            params: scope.into_params(),
        })
    }
}
