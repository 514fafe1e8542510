//! Operation hierarchy
//!
//! The selection tree's operation nodes. Each operation compiles itself
//! into a clause list binding its result to a caller-chosen return
//! variable; nesting happens through CALL subqueries.

use graphweave_core::Result;
use graphweave_cypher::{Clause, Scope, Variable};

use crate::aggregation::AggregationOperation;
use crate::connection::ConnectionReadOperation;
use crate::field::Field;
use crate::filter::Filter;
use crate::read::ReadOperation;

/// One node-producing operation of the selection tree
#[derive(Debug)]
pub enum Operation {
    Read(ReadOperation),
    ConnectionRead(ConnectionReadOperation),
    Aggregation(AggregationOperation),
}

impl Operation {
    /// Compile this operation into clauses ending in
    /// `RETURN ... AS <return_var>`.
    ///
    /// `parent` is the variable of the enclosing operation's matched node;
    /// `None` marks the tree root.
    pub fn transpile(
        &self,
        scope: &mut Scope,
        parent: Option<&Variable>,
        return_var: Variable,
    ) -> Result<Vec<Clause>> {
        match self {
            Operation::Read(op) => op.transpile(scope, parent, return_var),
            Operation::ConnectionRead(op) => op.transpile(scope, parent, return_var),
            Operation::Aggregation(op) => op.transpile(scope, parent, return_var),
        }
    }

    /// Immediate child nodes, for tree walking
    pub fn children(&self) -> Vec<QueryNode<'_>> {
        let mut nodes = Vec::new();
        match self {
            Operation::Read(op) => {
                nodes.extend(op.filters.iter().map(QueryNode::Filter));
                nodes.extend(op.validate_filters.iter().map(QueryNode::Filter));
                for field in &op.fields {
                    if let Field::Operation { operation, .. } = field {
                        nodes.push(QueryNode::Operation(operation));
                    }
                }
            }
            Operation::ConnectionRead(op) => {
                nodes.extend(op.node_filters.iter().map(QueryNode::Filter));
                nodes.extend(op.edge_filters.iter().map(QueryNode::Filter));
            }
            Operation::Aggregation(op) => {
                nodes.extend(op.filters.iter().map(QueryNode::Filter));
            }
        }
        nodes
    }

    /// Total node count of the subtree rooted here
    pub fn node_count(&self) -> usize {
        fn walk(node: &QueryNode<'_>) -> usize {
            1 + node.children().iter().map(walk).sum::<usize>()
        }
        let root = QueryNode::Operation(self);
        walk(&root)
    }
}

/// A borrowed view over any node of the selection tree
#[derive(Debug)]
pub enum QueryNode<'a> {
    Operation(&'a Operation),
    Filter(&'a Filter),
}

impl<'a> QueryNode<'a> {
    pub fn children(&self) -> Vec<QueryNode<'a>> {
        match self {
            QueryNode::Operation(operation) => operation.children(),
            QueryNode::Filter(filter) => {
                filter.nested().into_iter().map(QueryNode::Filter).collect()
            }
        }
    }
}
