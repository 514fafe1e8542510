//! Graph pattern algebra
//!
//! Node, relationship and single-hop path patterns with direction and label
//! constraints. Patterns are immutable values; rendering is deterministic
//! given the variables already bound by the scope.

use crate::scope::Variable;
use std::fmt;

/// A node pattern: `(this0:`User`)`, `(this0)`, `(:`User`)` or `()`
#[derive(Debug, Clone, PartialEq)]
pub struct NodePattern {
    pub variable: Option<Variable>,
    pub labels: Vec<String>,
}

impl NodePattern {
    /// Anonymous, unlabeled node
    pub fn any() -> Self {
        Self {
            variable: None,
            labels: Vec::new(),
        }
    }

    /// Bound variable without label constraints
    pub fn variable(variable: Variable) -> Self {
        Self {
            variable: Some(variable),
            labels: Vec::new(),
        }
    }

    /// Bound variable constrained to the given labels
    pub fn labeled(variable: Variable, labels: &[String]) -> Self {
        Self {
            variable: Some(variable),
            labels: labels.to_vec(),
        }
    }
}

impl fmt::Display for NodePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        if let Some(variable) = &self.variable {
            write!(f, "{variable}")?;
        }
        for label in &self.labels {
            write!(f, ":`{label}`")?;
        }
        write!(f, ")")
    }
}

/// A relationship pattern between two nodes: `[this1:`ACTED_IN`]`
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipPattern {
    pub variable: Option<Variable>,
    pub edge_type: Option<String>,
}

impl RelationshipPattern {
    /// Typed, anonymous relationship
    pub fn typed<S: Into<String>>(edge_type: S) -> Self {
        Self {
            variable: None,
            edge_type: Some(edge_type.into()),
        }
    }

    /// Bind the relationship to a variable
    pub fn bind(mut self, variable: Variable) -> Self {
        self.variable = Some(variable);
        self
    }
}

impl fmt::Display for RelationshipPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        if let Some(variable) = &self.variable {
            write!(f, "{variable}")?;
        }
        if let Some(edge_type) = &self.edge_type {
            write!(f, ":`{edge_type}`")?;
        }
        write!(f, "]")
    }
}

/// Direction of a path pattern's relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternDirection {
    /// `(a)-[r]->(b)`
    Right,
    /// `(a)<-[r]-(b)`
    Left,
    /// `(a)-[r]-(b)`, undirected traversal
    Undirected,
}

/// A match pattern: a lone node or a single relationship hop
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Node(NodePattern),
    Path {
        source: NodePattern,
        relationship: RelationshipPattern,
        direction: PatternDirection,
        target: NodePattern,
    },
}

impl Pattern {
    /// A lone node pattern
    pub fn node(node: NodePattern) -> Self {
        Pattern::Node(node)
    }

    /// A single-hop path
    pub fn path(
        source: NodePattern,
        relationship: RelationshipPattern,
        direction: PatternDirection,
        target: NodePattern,
    ) -> Self {
        Pattern::Path {
            source,
            relationship,
            direction,
            target,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Node(node) => write!(f, "{node}"),
            Pattern::Path {
                source,
                relationship,
                direction,
                target,
            } => match direction {
                PatternDirection::Right => write!(f, "{source}-{relationship}->{target}"),
                PatternDirection::Left => write!(f, "{source}<-{relationship}-{target}"),
                PatternDirection::Undirected => write!(f, "{source}-{relationship}-{target}"),
            },
        }
    }
}
