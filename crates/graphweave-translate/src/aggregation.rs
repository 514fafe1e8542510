//! Aggregation transpilation
//!
//! Each aggregated field runs in its own CALL subquery over the same
//! relationship pattern, so one aggregation never constrains another's
//! cardinality. The per-field results are merged into a single projection
//! map, with node and edge attribute groups nested under `node` and
//! `edge`.

use std::sync::Arc;

use graphweave_core::{Error, Result};
use graphweave_cypher::{Clause, Expr, Item, Scope, Variable, WithClause};
use graphweave_model::{Entity, Relationship};

use crate::field::AggregationField;
use crate::filter::Filter;
use crate::pagination::Pagination;
use crate::sort::PropertySort;
use crate::util::hop_pattern;

/// Aggregates over a relationship's rows
#[derive(Debug)]
pub struct AggregationOperation {
    pub relationship: Relationship,
    pub target: Arc<Entity>,
    pub directed: bool,

    /// Whole-row aggregations (`count`)
    pub fields: Vec<AggregationField>,

    /// Aggregations over target node attributes
    pub node_fields: Vec<AggregationField>,

    /// Aggregations over relationship attributes
    pub edge_fields: Vec<AggregationField>,

    pub filters: Vec<Filter>,
    pub sort_fields: Vec<PropertySort>,
    pub pagination: Option<Pagination>,
}

impl AggregationOperation {
    pub fn transpile(
        &self,
        scope: &mut Scope,
        parent: Option<&Variable>,
        return_var: Variable,
    ) -> Result<Vec<Clause>> {
        let parent = parent.ok_or_else(|| {
            Error::Internal("aggregation compiled without a parent variable".to_string())
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
        for filter in &self.filters {
            predicates.push(filter.predicate(scope, &node_var)?);
        }
        let predicate = if predicates.is_empty() {
            None
        } else {
            Some(Expr::and(predicates))
        };

        let mut clauses = Vec::new();
        let mut top_entries = Vec::new();
        let mut node_entries = Vec::new();
        let mut edge_entries = Vec::new();

        for field in &self.fields {
            let result = self.aggregate_field(
                scope,
                parent,
                &pattern,
                predicate.clone(),
                field,
                &node_var,
                &node_var,
                &mut clauses,
            );
            top_entries.push((field.alias().to_string(), result));
        }
        for field in &self.node_fields {
            let result = self.aggregate_field(
                scope,
                parent,
                &pattern,
                predicate.clone(),
                field,
                &node_var,
                &node_var,
                &mut clauses,
            );
            node_entries.push((field.alias().to_string(), result));
        }
        for field in &self.edge_fields {
            let result = self.aggregate_field(
                scope,
                parent,
                &pattern,
                predicate.clone(),
                field,
                &rel_var,
                &node_var,
                &mut clauses,
            );
            edge_entries.push((field.alias().to_string(), result));
        }

        if !node_entries.is_empty() {
            top_entries.push(("node".to_string(), Expr::Map(node_entries)));
        }
        if !edge_entries.is_empty() {
            top_entries.push(("edge".to_string(), Expr::Map(edge_entries)));
        }

        clauses.push(Clause::return_aliased(Expr::Map(top_entries), return_var));
        Ok(clauses)
    }

    /// One CALL subquery computing a single aggregated field; returns the
    /// variable expression holding its result. Sort fields always name
    /// target node attributes, so ordering binds to `node_var` even when
    /// the field itself aggregates the relationship variable.
    #[allow(clippy::too_many_arguments)]
    fn aggregate_field(
        &self,
        scope: &mut Scope,
        parent: &Variable,
        pattern: &graphweave_cypher::Pattern,
        predicate: Option<Expr>,
        field: &AggregationField,
        bind: &Variable,
        node_var: &Variable,
        clauses: &mut Vec<Clause>,
    ) -> Expr {
        let result_var = scope.variable();
        let mut body = vec![Clause::match_where(pattern.clone(), predicate)];

        if !self.sort_fields.is_empty() || self.pagination.is_some_and(|p| p.has_any()) {
            let base = Expr::variable(node_var);
            let order_by = self
                .sort_fields
                .iter()
                .map(|sort| sort.sort_item(&base))
                .collect();
            let pagination = self.pagination.unwrap_or_default();
            body.push(Clause::With(
                WithClause::wildcard()
                    .order_by(order_by)
                    .skip(pagination.skip_param(scope))
                    .limit(pagination.limit_param(scope)),
            ));
        }

        body.push(Clause::Return {
            items: vec![Item::Aliased(field.projection(bind), result_var.clone())],
        });
        clauses.push(Clause::Call {
            imports: vec![parent.clone()],
            body,
        });
        Expr::variable(&result_var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::AggregationOp;
    use crate::sort::SortDirection;
    use graphweave_cypher::render_program;
    use graphweave_model::{Attribute, AttributeType, Direction};

    fn movie() -> Arc<Entity> {
        Arc::new(
            Entity::new("Movie")
                .attribute(Attribute::new("title", AttributeType::String))
                .attribute(Attribute::new("released", AttributeType::Int)),
        )
    }

    fn acted_in() -> Relationship {
        Relationship::new("actedIn", "ACTED_IN", Direction::Out, "Movie")
            .attribute(Attribute::new("screenTime", AttributeType::Int))
    }

    fn compile(op: &AggregationOperation) -> String {
        let mut scope = Scope::new();
        let parent = scope.variable();
        let return_var = scope.variable();
        render_program(&op.transpile(&mut scope, Some(&parent), return_var).unwrap())
    }

    #[test]
    fn test_count_and_grouped_aggregations() {
        let op = AggregationOperation {
            relationship: acted_in(),
            target: movie(),
            directed: true,
            fields: vec![AggregationField::Count {
                alias: "count".to_string(),
            }],
            node_fields: vec![AggregationField::Attribute {
                alias: "released".to_string(),
                name: "released".to_string(),
                ops: vec![AggregationOp::Min, AggregationOp::Max],
            }],
            edge_fields: vec![AggregationField::Attribute {
                alias: "screenTime".to_string(),
                name: "screenTime".to_string(),
                ops: vec![AggregationOp::Sum],
            }],
            filters: Vec::new(),
            sort_fields: Vec::new(),
            pagination: None,
        };
        assert_eq!(
            compile(&op),
            "CALL {\n\
             \x20   WITH this0\n\
             \x20   MATCH (this0)-[this3:`ACTED_IN`]->(this2:`Movie`)\n\
             \x20   RETURN count(this2) AS this4\n\
             }\n\
             CALL {\n\
             \x20   WITH this0\n\
             \x20   MATCH (this0)-[this3:`ACTED_IN`]->(this2:`Movie`)\n\
             \x20   RETURN { min: min(this2.released), max: max(this2.released) } AS this5\n\
             }\n\
             CALL {\n\
             \x20   WITH this0\n\
             \x20   MATCH (this0)-[this3:`ACTED_IN`]->(this2:`Movie`)\n\
             \x20   RETURN { sum: sum(this3.screenTime) } AS this6\n\
             }\n\
             RETURN { count: this4, node: { released: this5 }, edge: { screenTime: this6 } } AS this1"
        );
    }

    #[test]
    fn test_edge_aggregation_sorts_on_node_attribute() {
        let op = AggregationOperation {
            relationship: acted_in(),
            target: movie(),
            directed: true,
            fields: Vec::new(),
            node_fields: Vec::new(),
            edge_fields: vec![AggregationField::Attribute {
                alias: "screenTime".to_string(),
                name: "screenTime".to_string(),
                ops: vec![AggregationOp::Sum],
            }],
            filters: Vec::new(),
            sort_fields: vec![PropertySort::new("released", SortDirection::Asc)],
            pagination: None,
        };
        assert_eq!(
            compile(&op),
            "CALL {\n\
             \x20   WITH this0\n\
             \x20   MATCH (this0)-[this3:`ACTED_IN`]->(this2:`Movie`)\n\
             \x20   WITH *\n\
             \x20   ORDER BY this2.released ASC\n\
             \x20   RETURN { sum: sum(this3.screenTime) } AS this4\n\
             }\n\
             RETURN { edge: { screenTime: this4 } } AS this1"
        );
    }

    #[test]
    fn test_each_field_gets_its_own_subquery() {
        let op = AggregationOperation {
            relationship: acted_in(),
            target: movie(),
            directed: true,
            fields: vec![
                AggregationField::Count {
                    alias: "count".to_string(),
                },
                AggregationField::Count {
                    alias: "also".to_string(),
                },
            ],
            node_fields: Vec::new(),
            edge_fields: Vec::new(),
            filters: Vec::new(),
            sort_fields: Vec::new(),
            pagination: None,
        };
        let program = compile(&op);
        assert_eq!(program.matches("CALL {").count(), 2);
    }

    #[test]
    fn test_missing_parent_is_internal_error() {
        let op = AggregationOperation {
            relationship: acted_in(),
            target: movie(),
            directed: true,
            fields: Vec::new(),
            node_fields: Vec::new(),
            edge_fields: Vec::new(),
            filters: Vec::new(),
            sort_fields: Vec::new(),
            pagination: None,
        };
        let mut scope = Scope::new();
        let return_var = scope.variable();
        assert!(op.transpile(&mut scope, None, return_var).is_err());
    }
}
