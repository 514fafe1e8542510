//! Read operation transpilation
//!
//! Matches one entity, applies filters, sorting and pagination, runs
//! nested operations through CALL subqueries and projects the selected
//! fields as a map.

use std::sync::Arc;

use graphweave_core::{Error, Result};
use graphweave_cypher::{
    Clause, Expr, Item, NodePattern, Pattern, ProjectionItem, Scope, Variable, WithClause,
};
use graphweave_model::{Entity, Relationship};

use crate::field::Field;
use crate::filter::Filter;
use crate::pagination::Pagination;
use crate::sort::PropertySort;
use crate::util::hop_pattern;

/// Reads entities, optionally reached through a relationship hop
#[derive(Debug)]
pub struct ReadOperation {
    pub target: Arc<Entity>,

    /// Hop from the parent operation's node; `None` at the tree root
    pub relationship: Option<Relationship>,

    /// Whether the hop keeps the schema's direction arrow
    pub directed: bool,

    pub filters: Vec<Filter>,

    /// Authorization predicates that abort the query when violated
    pub validate_filters: Vec<Filter>,

    pub sort_fields: Vec<PropertySort>,
    pub pagination: Option<Pagination>,
    pub fields: Vec<Field>,
}

impl ReadOperation {
    pub fn transpile(
        &self,
        scope: &mut Scope,
        parent: Option<&Variable>,
        return_var: Variable,
    ) -> Result<Vec<Clause>> {
        let target_var = scope.variable();
        let pattern = match (parent, &self.relationship) {
            (Some(parent), Some(relationship)) => hop_pattern(
                parent,
                relationship,
                None,
                target_var.clone(),
                &self.target.labels,
                self.directed,
            ),
            (None, None) => Pattern::node(NodePattern::labeled(
                target_var.clone(),
                &self.target.labels,
            )),
            (None, Some(_)) => {
                return Err(Error::Internal(
                    "nested read compiled without a parent variable".to_string(),
                ));
            }
            (Some(_), None) => {
                return Err(Error::Internal(
                    "nested read has no relationship to traverse".to_string(),
                ));
            }
        };

        let mut predicates = Vec::new();
        for filter in &self.filters {
            predicates.push(filter.predicate(scope, &target_var)?);
        }
        for filter in &self.validate_filters {
            let predicate = filter.predicate(scope, &target_var)?;
            predicates.push(Expr::function(
                "apoc.util.validatePredicate",
                vec![
                    Expr::not(predicate),
                    Expr::literal("@graphweave/FORBIDDEN"),
                ],
            ));
        }
        let predicate = if predicates.is_empty() {
            None
        } else {
            Some(Expr::and(predicates))
        };

        let mut clauses = vec![Clause::match_where(pattern, predicate)];

        if !self.sort_fields.is_empty() || self.pagination.is_some_and(|p| p.has_any()) {
            let base = Expr::variable(&target_var);
            let order_by = self
                .sort_fields
                .iter()
                .map(|sort| sort.sort_item(&base))
                .collect();
            let pagination = self.pagination.unwrap_or_default();
            clauses.push(Clause::With(
                WithClause::items(vec![Item::Variable(target_var.clone())])
                    .order_by(order_by)
                    .skip(pagination.skip_param(scope))
                    .limit(pagination.limit_param(scope)),
            ));
        }

        let mut projection = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            match field {
                Field::Attribute { alias, name } => {
                    if alias == name {
                        projection.push(ProjectionItem::Property(name.clone()));
                    } else {
                        projection.push(ProjectionItem::Aliased(
                            alias.clone(),
                            Expr::property(&target_var, name),
                        ));
                    }
                }
                Field::Operation { alias, operation } => {
                    let child_var = scope.variable();
                    let body = operation.transpile(scope, Some(&target_var), child_var.clone())?;
                    clauses.push(Clause::Call {
                        imports: vec![target_var.clone()],
                        body,
                    });
                    projection.push(ProjectionItem::Aliased(
                        alias.clone(),
                        Expr::variable(&child_var),
                    ));
                }
            }
        }

        let projected = Expr::MapProjection {
            variable: target_var,
            items: projection,
        };

        let result = match &self.relationship {
            // nested reads collapse their rows into the parent's cardinality
            Some(relationship) if relationship.array => Expr::collect(projected),
            Some(_) => Expr::head(Expr::collect(projected)),
            None => projected,
        };
        clauses.push(Clause::return_aliased(result, return_var));
        Ok(clauses)
    }
}
