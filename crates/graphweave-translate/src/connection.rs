//! Connection read transpilation
//!
//! Produces the `{ edges: [...], totalCount: n }` shape. Edges are
//! collected before pagination so `totalCount` always reflects the
//! pre-limit row count; pagination re-expands the collected list inside
//! a CALL subquery and recollects the requested page.

use std::sync::Arc;

use graphweave_core::{Error, Result};
use graphweave_cypher::{Clause, Expr, Item, Scope, Variable, WithClause};
use graphweave_model::{Entity, Relationship};

use crate::field::AttributeField;
use crate::filter::Filter;
use crate::pagination::Pagination;
use crate::sort::ConnectionSort;
use crate::util::hop_pattern;

/// Reads a relationship as an edge list with a total count
#[derive(Debug)]
pub struct ConnectionReadOperation {
    pub relationship: Relationship,
    pub target: Arc<Entity>,
    pub directed: bool,
    pub node_fields: Vec<AttributeField>,
    pub edge_fields: Vec<AttributeField>,
    pub node_filters: Vec<Filter>,
    pub edge_filters: Vec<Filter>,
    pub sort_fields: Vec<ConnectionSort>,
    pub pagination: Option<Pagination>,
}

impl ConnectionReadOperation {
    pub fn transpile(
        &self,
        scope: &mut Scope,
        parent: Option<&Variable>,
        return_var: Variable,
    ) -> Result<Vec<Clause>> {
        let parent = parent.ok_or_else(|| {
            Error::Internal("connection read compiled without a parent variable".to_string())
        })?;

        let node_var = scope.variable();
        let rel_var = scope.variable();
        let pattern = hop_pattern(
            parent,
            &self.relationship,
            Some(rel_var.clone()),
            node_var.clone(),
            &self.target.labels,
            self.directed,
        );

        let mut predicates = Vec::new();
        for filter in &self.edge_filters {
            predicates.push(filter.predicate(scope, &rel_var)?);
        }
        for filter in &self.node_filters {
            predicates.push(filter.predicate(scope, &node_var)?);
        }
        let predicate = if predicates.is_empty() {
            None
        } else {
            Some(Expr::and(predicates))
        };

        let mut clauses = vec![Clause::match_where(pattern, predicate)];

        let paginating = self.pagination.is_some_and(|p| p.has_any());
        if !self.sort_fields.is_empty() && !paginating {
            // without pagination, row order at collect time is the edge order
            let mut order_by = Vec::new();
            for sort in &self.sort_fields {
                for item in &sort.edge {
                    order_by.push(item.sort_item(&Expr::variable(&rel_var)));
                }
                for item in &sort.node {
                    order_by.push(item.sort_item(&Expr::variable(&node_var)));
                }
            }
            clauses.push(Clause::With(
                WithClause::items(vec![
                    Item::Variable(rel_var.clone()),
                    Item::Variable(node_var.clone()),
                ])
                .order_by(order_by),
            ));
        }

        let edge = Variable::named("edge");
        let edges = Variable::named("edges");
        let total_count = Variable::named("totalCount");

        let mut edge_entries: Vec<(String, Expr)> = self
            .edge_fields
            .iter()
            .map(|field| field.entry(&rel_var))
            .collect();
        edge_entries.push(("node".to_string(), self.node_projection(&node_var)));

        clauses.push(Clause::With(WithClause::items(vec![Item::Aliased(
            Expr::Map(edge_entries),
            edge.clone(),
        )])));
        clauses.push(Clause::With(WithClause::items(vec![Item::Aliased(
            Expr::collect(Expr::variable(&edge)),
            edges.clone(),
        )])));
        clauses.push(Clause::With(WithClause::items(vec![
            Item::Variable(edges.clone()),
            Item::Aliased(Expr::size(Expr::variable(&edges)), total_count.clone()),
        ])));

        if paginating {
            let pagination = self.pagination.unwrap_or_default();
            let mut order_by = Vec::new();
            for sort in &self.sort_fields {
                for item in &sort.edge {
                    order_by.push(item.sort_item(&Expr::variable(&edge)));
                }
                for item in &sort.node {
                    order_by.push(item.sort_item(&Expr::variable(&edge).dot("node")));
                }
            }

            let page_var = scope.variable();
            clauses.push(Clause::Call {
                imports: vec![edges.clone()],
                body: vec![
                    Clause::Unwind {
                        list: Expr::variable(&edges),
                        alias: edge.clone(),
                    },
                    Clause::With(
                        WithClause::items(vec![Item::Variable(edge.clone())])
                            .order_by(order_by)
                            .skip(pagination.skip_param(scope))
                            .limit(pagination.limit_param(scope)),
                    ),
                    Clause::return_aliased(Expr::collect(Expr::variable(&edge)), page_var.clone()),
                ],
            });
            clauses.push(Clause::With(WithClause::items(vec![
                Item::Aliased(Expr::variable(&page_var), edges.clone()),
                Item::Variable(total_count.clone()),
            ])));
        }

        clauses.push(Clause::return_aliased(
            Expr::Map(vec![
                ("edges".to_string(), Expr::variable(&edges)),
                ("totalCount".to_string(), Expr::variable(&total_count)),
            ]),
            return_var,
        ));
        Ok(clauses)
    }

    /// The `node` entry of each edge map; with no node selection the target
    /// is still identified by type and internal id
    fn node_projection(&self, node_var: &Variable) -> Expr {
        if self.node_fields.is_empty() {
            return Expr::Map(vec![
                (
                    "__resolveType".to_string(),
                    Expr::literal(self.target.name.as_str()),
                ),
                ("__id".to_string(), Expr::id(Expr::variable(node_var))),
            ]);
        }
        Expr::Map(
            self.node_fields
                .iter()
                .map(|field| field.entry(node_var))
                .collect(),
        )
    }
}
