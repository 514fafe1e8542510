//! Relationship and connection filters
//!
//! Quantified predicates over one relationship hop. SOME compiles to an
//! existential subquery; ALL requires a satisfying hop to exist and no
//! violating hop to exist; NONE is the negation of SOME; SINGLE counts
//! matches through a pattern comprehension.

use std::sync::Arc;

use graphweave_core::Result;
use graphweave_cypher::{Expr, ListPredicateKind, Pattern, Scope, Variable};
use graphweave_model::{Entity, Relationship};

use crate::filter::Filter;
use crate::util::{hop_pattern, negate};

/// How many related rows must satisfy the nested predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Some,
    All,
    None,
    Single,
}

/// A quantified filter over a relationship's target nodes
#[derive(Debug)]
pub struct RelationshipFilter {
    pub relationship: Relationship,
    pub target: Arc<Entity>,
    pub quantifier: Quantifier,
    pub is_not: bool,

    /// Filter value was JSON null: test for (non-)existence only
    pub is_null_check: bool,

    pub filters: Vec<Filter>,
}

impl RelationshipFilter {
    pub fn predicate(&self, scope: &mut Scope, target: &Variable) -> Result<Expr> {
        let child = scope.variable();
        let pattern = hop_pattern(
            target,
            &self.relationship,
            None,
            child.clone(),
            &self.target.labels,
            true,
        );

        if self.is_null_check {
            let exists = Expr::exists(pattern, None);
            // `rel: null` asserts absence; `rel_NOT: null` asserts presence
            return Ok(if self.is_not { exists } else { Expr::not(exists) });
        }

        let mut inner = Vec::with_capacity(self.filters.len());
        for filter in &self.filters {
            inner.push(filter.predicate(scope, &child)?);
        }
        let inner = if inner.is_empty() {
            None
        } else {
            Some(Expr::and(inner))
        };

        let expr = quantified(self.quantifier, pattern, &child, inner);
        Ok(negate(expr, self.is_not))
    }
}

/// A quantified filter over a relationship's target nodes and its edge
/// properties
#[derive(Debug)]
pub struct ConnectionFilter {
    pub relationship: Relationship,
    pub target: Arc<Entity>,
    pub quantifier: Quantifier,
    pub is_not: bool,
    pub node_filters: Vec<Filter>,
    pub edge_filters: Vec<Filter>,
}

impl ConnectionFilter {
    pub fn predicate(&self, scope: &mut Scope, target: &Variable) -> Result<Expr> {
        let child = scope.variable();
        let edge = scope.variable();
        let pattern = hop_pattern(
            target,
            &self.relationship,
            Some(edge.clone()),
            child.clone(),
            &self.target.labels,
            true,
        );

        // edge predicates always precede node predicates in the conjunction
        let mut inner = Vec::new();
        for filter in &self.edge_filters {
            inner.push(filter.predicate(scope, &edge)?);
        }
        for filter in &self.node_filters {
            inner.push(filter.predicate(scope, &child)?);
        }
        let inner = if inner.is_empty() {
            None
        } else {
            Some(Expr::and(inner))
        };

        let expr = quantified(self.quantifier, pattern, &child, inner);
        Ok(negate(expr, self.is_not))
    }
}

/// Core quantifier compilation shared by both filter kinds.
///
/// The pattern must bind `child` (and any edge variable the inner predicate
/// references) so that EXISTS subqueries and pattern comprehensions scope
/// them correctly.
fn quantified(
    quantifier: Quantifier,
    pattern: Pattern,
    child: &Variable,
    inner: Option<Expr>,
) -> Expr {
    match quantifier {
        Quantifier::Some => Expr::exists(pattern, inner),
        Quantifier::All => {
            let satisfied = inner.clone().unwrap_or_else(|| Expr::literal(true));
            Expr::and(vec![
                Expr::exists(pattern.clone(), inner),
                Expr::not(Expr::exists(pattern, Some(Expr::not(satisfied)))),
            ])
        }
        Quantifier::None => Expr::not(quantified(Quantifier::Some, pattern, child, inner)),
        Quantifier::Single => {
            let comprehension = Expr::PatternComprehension {
                pattern,
                filter: inner.map(Box::new),
                projection: Box::new(Expr::variable(child)),
            };
            Expr::list_predicate(
                ListPredicateKind::Single,
                child.clone(),
                comprehension,
                Expr::literal(true),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::PropertyFilter;
    use crate::where_parse::FilterOperator;
    use graphweave_model::{Attribute, AttributeType, Direction};
    use serde_json::json;

    fn user() -> Arc<Entity> {
        Arc::new(
            Entity::new("User")
                .attribute(Attribute::new("name", AttributeType::String))
                .attribute(Attribute::new("age", AttributeType::Int)),
        )
    }

    fn friends() -> Relationship {
        Relationship::new("friends", "KNOWS", Direction::Out, "User")
    }

    fn name_filter() -> Filter {
        Filter::Property(PropertyFilter {
            attribute: Attribute::new("name", AttributeType::String),
            operator: FilterOperator::Eq,
            is_not: false,
            value: json!("Ada"),
        })
    }

    fn quantified_filter(quantifier: Quantifier) -> RelationshipFilter {
        RelationshipFilter {
            relationship: friends(),
            target: user(),
            quantifier,
            is_not: false,
            is_null_check: false,
            filters: vec![name_filter()],
        }
    }

    fn compile(filter: &RelationshipFilter) -> String {
        let mut scope = Scope::new();
        let root = scope.variable();
        filter.predicate(&mut scope, &root).unwrap().to_string()
    }

    #[test]
    fn test_some_is_exists() {
        assert_eq!(
            compile(&quantified_filter(Quantifier::Some)),
            "EXISTS { MATCH (this0)-[:`KNOWS`]->(this1:`User`) WHERE this1.name = $param0 }"
        );
    }

    #[test]
    fn test_all_requires_witness_and_no_violation() {
        assert_eq!(
            compile(&quantified_filter(Quantifier::All)),
            "(EXISTS { MATCH (this0)-[:`KNOWS`]->(this1:`User`) WHERE this1.name = $param0 } \
             AND NOT (EXISTS { MATCH (this0)-[:`KNOWS`]->(this1:`User`) \
             WHERE NOT (this1.name = $param0) }))"
        );
    }

    #[test]
    fn test_none_is_negated_some() {
        let some = compile(&quantified_filter(Quantifier::Some));
        let none = compile(&quantified_filter(Quantifier::None));
        assert_eq!(none, format!("NOT ({some})"));
    }

    #[test]
    fn test_single_counts_via_comprehension() {
        assert_eq!(
            compile(&quantified_filter(Quantifier::Single)),
            "single(this1 IN [(this0)-[:`KNOWS`]->(this1:`User`) \
             WHERE this1.name = $param0 | this1] WHERE true)"
        );
    }

    #[test]
    fn test_null_check_means_absence() {
        let filter = RelationshipFilter {
            relationship: friends(),
            target: user(),
            quantifier: Quantifier::Some,
            is_not: false,
            is_null_check: true,
            filters: Vec::new(),
        };
        assert_eq!(
            compile(&filter),
            "NOT (EXISTS { MATCH (this0)-[:`KNOWS`]->(this1:`User`) })"
        );
    }

    #[test]
    fn test_negated_null_check_means_presence() {
        let filter = RelationshipFilter {
            relationship: friends(),
            target: user(),
            quantifier: Quantifier::Some,
            is_not: true,
            is_null_check: true,
            filters: Vec::new(),
        };
        assert_eq!(
            compile(&filter),
            "EXISTS { MATCH (this0)-[:`KNOWS`]->(this1:`User`) }"
        );
    }

    #[test]
    fn test_empty_filter_quantifies_bare_pattern() {
        let filter = RelationshipFilter {
            relationship: friends(),
            target: user(),
            quantifier: Quantifier::Some,
            is_not: false,
            is_null_check: false,
            filters: Vec::new(),
        };
        assert_eq!(
            compile(&filter),
            "EXISTS { MATCH (this0)-[:`KNOWS`]->(this1:`User`) }"
        );
    }

    #[test]
    fn test_connection_filter_binds_edge_variable() {
        let rel = friends().attribute(Attribute::new("since", AttributeType::Int));
        let filter = ConnectionFilter {
            relationship: rel,
            target: user(),
            quantifier: Quantifier::Some,
            is_not: false,
            node_filters: vec![name_filter()],
            edge_filters: vec![Filter::Property(PropertyFilter {
                attribute: Attribute::new("since", AttributeType::Int),
                operator: FilterOperator::Gt,
                is_not: false,
                value: json!(2020),
            })],
        };
        let mut scope = Scope::new();
        let root = scope.variable();
        let expr = filter.predicate(&mut scope, &root).unwrap();
        assert_eq!(
            expr.to_string(),
            "EXISTS { MATCH (this0)-[this2:`KNOWS`]->(this1:`User`) \
             WHERE (this2.since > $param0 AND this1.name = $param1) }"
        );
    }
}
