//! Shared pattern helpers for the transpilers

use graphweave_cypher::{Expr, NodePattern, Pattern, PatternDirection, RelationshipPattern, Variable};
use graphweave_model::{Direction, Relationship};

/// Builds the one-hop pattern from `parent` across `relationship` to a node
/// bound as `child`.
///
/// When `directed` is false the arrow is dropped regardless of the schema
/// direction.
pub(crate) fn hop_pattern(
    parent: &Variable,
    relationship: &Relationship,
    rel_var: Option<Variable>,
    child: Variable,
    child_labels: &[String],
    directed: bool,
) -> Pattern {
    let mut rel_pattern = RelationshipPattern::typed(&relationship.edge_type);
    if let Some(var) = rel_var {
        rel_pattern = rel_pattern.bind(var);
    }

    let direction = if !directed {
        PatternDirection::Undirected
    } else {
        match relationship.direction {
            Direction::Out => PatternDirection::Right,
            Direction::In => PatternDirection::Left,
        }
    };

    Pattern::path(
        NodePattern::variable(parent.clone()),
        rel_pattern,
        direction,
        NodePattern::labeled(child, child_labels),
    )
}

/// Wraps `expr` in `NOT (...)` when the filter key carried `_NOT`
pub(crate) fn negate(expr: Expr, is_not: bool) -> Expr {
    if is_not { Expr::not(expr) } else { expr }
}
