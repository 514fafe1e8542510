//! Projected fields
//!
//! A field is either a plain attribute projection or a nested operation
//! whose result is spliced into the parent's projection under its alias.

use graphweave_cypher::{Expr, Variable};

use crate::operation::Operation;

/// One entry in a read operation's selection
#[derive(Debug)]
pub enum Field {
    /// Project an attribute of the matched node
    Attribute { alias: String, name: String },

    /// Run a nested operation and project its result
    Operation {
        alias: String,
        operation: Box<Operation>,
    },
}

impl Field {
    pub fn alias(&self) -> &str {
        match self {
            Field::Attribute { alias, .. } => alias,
            Field::Operation { alias, .. } => alias,
        }
    }
}

/// An attribute projection that cannot nest, as used in connection edges
#[derive(Debug, Clone)]
pub struct AttributeField {
    pub alias: String,
    pub name: String,
}

impl AttributeField {
    pub fn new(alias: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            name: name.into(),
        }
    }

    /// `alias: <base>.<name>` map entry against `base`
    pub fn entry(&self, base: &Variable) -> (String, Expr) {
        (self.alias.clone(), Expr::property(base, &self.name))
    }
}

/// Reducers available on aggregated attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationOp {
    Min,
    Max,
    Avg,
    Sum,
}

impl AggregationOp {
    /// The projection key for this reducer
    pub fn name(&self) -> &'static str {
        match self {
            AggregationOp::Min => "min",
            AggregationOp::Max => "max",
            AggregationOp::Avg => "avg",
            AggregationOp::Sum => "sum",
        }
    }

    /// The Cypher aggregation function this reducer maps to
    pub fn function(&self) -> &'static str {
        self.name()
    }
}

/// One entry in an aggregation selection
#[derive(Debug)]
pub enum AggregationField {
    /// `count` of matched rows
    Count { alias: String },

    /// One or more reducers over a single attribute
    Attribute {
        alias: String,
        name: String,
        ops: Vec<AggregationOp>,
    },
}

impl AggregationField {
    pub fn alias(&self) -> &str {
        match self {
            AggregationField::Count { alias } => alias,
            AggregationField::Attribute { alias, .. } => alias,
        }
    }

    /// The aggregated expression for this field against `target`
    pub fn projection(&self, target: &Variable) -> Expr {
        match self {
            AggregationField::Count { .. } => {
                Expr::function("count", vec![Expr::variable(target)])
            }
            AggregationField::Attribute { name, ops, .. } => {
                let entries = ops
                    .iter()
                    .map(|op| {
                        let value = Expr::function(
                            op.function(),
                            vec![Expr::variable(target).dot(name)],
                        );
                        (op.name().to_string(), value)
                    })
                    .collect();
                Expr::Map(entries)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphweave_cypher::Scope;

    #[test]
    fn test_count_projection() {
        let mut scope = Scope::new();
        let var = scope.variable();
        let field = AggregationField::Count {
            alias: "count".to_string(),
        };
        assert_eq!(field.projection(&var).to_string(), "count(this0)");
    }

    #[test]
    fn test_attribute_reducers_projection() {
        let mut scope = Scope::new();
        let var = scope.variable();
        let field = AggregationField::Attribute {
            alias: "age".to_string(),
            name: "age".to_string(),
            ops: vec![AggregationOp::Min, AggregationOp::Max],
        };
        assert_eq!(
            field.projection(&var).to_string(),
            "{ min: min(this0.age), max: max(this0.age) }"
        );
    }
}
