//! Attribute, temporal, spatial and logical filters
//!
//! Each filter node compiles itself into a predicate expression against a
//! bound variable. Filters never allocate the variable they test; the
//! enclosing operation (or relationship filter) decides the binding and
//! passes it down.

use graphweave_core::{
    CypherValue, DurationComponents, Error, PointInput, Result, validate_datetime,
    validate_distance,
};
use graphweave_cypher::{Comparator, Expr, Scope, Variable};
use graphweave_model::Attribute;

use crate::relationship_filter::{ConnectionFilter, RelationshipFilter};
use crate::util::negate;
use crate::where_parse::FilterOperator;

/// Logical connectives over nested filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
    Not,
}

/// A comparison against one scalar attribute
#[derive(Debug)]
pub struct PropertyFilter {
    pub attribute: Attribute,
    pub operator: FilterOperator,
    pub is_not: bool,
    pub value: serde_json::Value,
}

/// A comparison against a duration attribute
#[derive(Debug)]
pub struct DurationFilter {
    pub attribute: Attribute,
    pub operator: FilterOperator,
    pub is_not: bool,
    pub value: DurationComponents,
}

/// A comparison against a point attribute
#[derive(Debug)]
pub struct PointFilter {
    pub attribute: Attribute,
    pub operator: FilterOperator,
    pub is_not: bool,
    pub value: serde_json::Value,
}

/// AND / OR / NOT over nested filters
#[derive(Debug)]
pub struct LogicalFilter {
    pub operation: LogicalOperator,
    pub filters: Vec<Filter>,
}

/// Any predicate node of the selection tree
#[derive(Debug)]
pub enum Filter {
    Property(PropertyFilter),
    Duration(DurationFilter),
    Point(PointFilter),
    Relationship(RelationshipFilter),
    Connection(ConnectionFilter),
    Logical(LogicalFilter),
}

impl Filter {
    /// Compile this filter into a predicate over `target`
    pub fn predicate(&self, scope: &mut Scope, target: &Variable) -> Result<Expr> {
        match self {
            Filter::Property(filter) => filter.predicate(scope, target),
            Filter::Duration(filter) => filter.predicate(scope, target),
            Filter::Point(filter) => filter.predicate(scope, target),
            Filter::Relationship(filter) => filter.predicate(scope, target),
            Filter::Connection(filter) => filter.predicate(scope, target),
            Filter::Logical(filter) => filter.predicate(scope, target),
        }
    }

    /// Immediate child filters, for tree walking
    pub fn nested(&self) -> Vec<&Filter> {
        match self {
            Filter::Property(_) | Filter::Duration(_) | Filter::Point(_) => Vec::new(),
            Filter::Relationship(filter) => filter.filters.iter().collect(),
            Filter::Connection(filter) => filter
                .node_filters
                .iter()
                .chain(filter.edge_filters.iter())
                .collect(),
            Filter::Logical(filter) => filter.filters.iter().collect(),
        }
    }
}

fn comparator_for(operator: FilterOperator, field: &str) -> Result<Comparator> {
    match operator {
        FilterOperator::Eq => Ok(Comparator::Eq),
        FilterOperator::Lt => Ok(Comparator::Lt),
        FilterOperator::Lte => Ok(Comparator::Lte),
        FilterOperator::Gt => Ok(Comparator::Gt),
        FilterOperator::Gte => Ok(Comparator::Gte),
        FilterOperator::In => Ok(Comparator::In),
        FilterOperator::Contains => Ok(Comparator::Contains),
        FilterOperator::StartsWith => Ok(Comparator::StartsWith),
        FilterOperator::EndsWith => Ok(Comparator::EndsWith),
        other => Err(Error::InvalidOperator {
            operator: other.as_str().to_string(),
            field: field.to_string(),
        }),
    }
}

impl PropertyFilter {
    fn predicate(&self, scope: &mut Scope, target: &Variable) -> Result<Expr> {
        let name = &self.attribute.name;

        match self.operator {
            FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith
                if !self.attribute.attribute_type.is_string_like() =>
            {
                return Err(Error::InvalidOperator {
                    operator: self.operator.as_str().to_string(),
                    field: name.clone(),
                });
            }
            FilterOperator::In if !self.value.is_array() => {
                return Err(Error::InvalidComparisonValue {
                    field: name.clone(),
                    detail: "IN requires a list value".to_string(),
                });
            }
            _ => {}
        }

        if self.attribute.attribute_type == graphweave_model::AttributeType::DateTime
            && self.operator != FilterOperator::In
        {
            validate_datetime(name, &self.value)?;
        }

        let comparator = comparator_for(self.operator, name)?;
        let param = scope.param(CypherValue::from_json(&self.value));
        let mut rhs = Expr::param(&param);
        if let Some(function) = self.attribute.attribute_type.coercion_function() {
            rhs = match self.operator {
                // each list element is coerced, not the list itself
                FilterOperator::In => Expr::ListComprehension {
                    variable: "x".to_string(),
                    list: Box::new(rhs),
                    projection: Box::new(Expr::function(
                        function,
                        vec![Expr::Variable(Variable::named("x"))],
                    )),
                },
                _ => Expr::function(function, vec![rhs]),
            };
        }

        let expr = Expr::compare(Expr::property(target, name), comparator, rhs);
        Ok(negate(expr, self.is_not))
    }
}

impl DurationFilter {
    fn predicate(&self, scope: &mut Scope, target: &Variable) -> Result<Expr> {
        let name = &self.attribute.name;
        let param = scope.param(self.value.to_value());
        let rhs = Expr::function("duration", vec![Expr::param(&param)]);
        let prop = Expr::property(target, name);

        let expr = match self.operator {
            FilterOperator::Eq => Expr::compare(prop, Comparator::Eq, rhs),
            FilterOperator::Lt | FilterOperator::Lte | FilterOperator::Gt | FilterOperator::Gte => {
                // anchor both sides to the same instant so calendar
                // components compare consistently
                let anchor = || Expr::function("datetime", vec![]);
                Expr::compare(
                    Expr::Add(Box::new(anchor()), Box::new(prop)),
                    comparator_for(self.operator, name)?,
                    Expr::Add(Box::new(anchor()), Box::new(rhs)),
                )
            }
            other => {
                return Err(Error::InvalidOperator {
                    operator: other.as_str().to_string(),
                    field: name.clone(),
                });
            }
        };
        Ok(negate(expr, self.is_not))
    }
}

impl PointFilter {
    fn predicate(&self, scope: &mut Scope, target: &Variable) -> Result<Expr> {
        let name = &self.attribute.name;
        let prop = Expr::property(target, name);

        let expr = match self.operator {
            FilterOperator::Eq => {
                PointInput::from_json(name, &self.value)?;
                let param = scope.param(CypherValue::from_json(&self.value));
                let rhs = Expr::function("point", vec![Expr::param(&param)]);
                Expr::compare(prop, Comparator::Eq, rhs)
            }
            FilterOperator::In => {
                let points = self.value.as_array().ok_or_else(|| {
                    Error::InvalidComparisonValue {
                        field: name.clone(),
                        detail: "IN requires a list value".to_string(),
                    }
                })?;
                for point in points {
                    PointInput::from_json(name, point)?;
                }
                let param = scope.param(CypherValue::from_json(&self.value));
                let list = Expr::ListComprehension {
                    variable: "p".to_string(),
                    list: Box::new(Expr::param(&param)),
                    projection: Box::new(Expr::function(
                        "point",
                        vec![Expr::Variable(Variable::named("p"))],
                    )),
                };
                Expr::compare(prop, Comparator::In, list)
            }
            FilterOperator::Lt
            | FilterOperator::Lte
            | FilterOperator::Gt
            | FilterOperator::Gte
            | FilterOperator::Distance => {
                validate_distance(name, &self.value)?;
                let param = scope.param(CypherValue::from_json(&self.value));
                let comparator = match self.operator {
                    FilterOperator::Distance => Comparator::Eq,
                    other => comparator_for(other, name)?,
                };
                let center =
                    Expr::function("point", vec![Expr::param(&param).dot("point")]);
                let distance = Expr::function("point.distance", vec![prop, center]);
                Expr::compare(distance, comparator, Expr::param(&param).dot("distance"))
            }
            other => {
                return Err(Error::InvalidOperator {
                    operator: other.as_str().to_string(),
                    field: name.clone(),
                });
            }
        };
        Ok(negate(expr, self.is_not))
    }
}

impl LogicalFilter {
    fn predicate(&self, scope: &mut Scope, target: &Variable) -> Result<Expr> {
        let mut children = Vec::with_capacity(self.filters.len());
        for filter in &self.filters {
            children.push(filter.predicate(scope, target)?);
        }
        Ok(match self.operation {
            LogicalOperator::And => Expr::and(children),
            LogicalOperator::Or => Expr::or(children),
            LogicalOperator::Not => Expr::not(Expr::and(children)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphweave_model::AttributeType;
    use serde_json::json;

    fn attr(name: &str, attribute_type: AttributeType) -> Attribute {
        Attribute::new(name, attribute_type)
    }

    fn scoped() -> (Scope, Variable) {
        let mut scope = Scope::new();
        let var = scope.variable();
        (scope, var)
    }

    #[test]
    fn test_string_equality() {
        let (mut scope, var) = scoped();
        let filter = PropertyFilter {
            attribute: attr("name", AttributeType::String),
            operator: FilterOperator::Eq,
            is_not: false,
            value: json!("Ada"),
        };
        let expr = filter.predicate(&mut scope, &var).unwrap();
        assert_eq!(expr.to_string(), "this0.name = $param0");
        assert_eq!(
            scope.into_params().get("param0"),
            Some(&CypherValue::String("Ada".to_string()))
        );
    }

    #[test]
    fn test_negated_comparison() {
        let (mut scope, var) = scoped();
        let filter = PropertyFilter {
            attribute: attr("age", AttributeType::Int),
            operator: FilterOperator::Gt,
            is_not: true,
            value: json!(30),
        };
        let expr = filter.predicate(&mut scope, &var).unwrap();
        assert_eq!(expr.to_string(), "NOT (this0.age > $param0)");
    }

    #[test]
    fn test_string_operator_on_int_rejected() {
        let (mut scope, var) = scoped();
        let filter = PropertyFilter {
            attribute: attr("age", AttributeType::Int),
            operator: FilterOperator::Contains,
            is_not: false,
            value: json!("3"),
        };
        assert!(matches!(
            filter.predicate(&mut scope, &var),
            Err(Error::InvalidOperator { .. })
        ));
    }

    #[test]
    fn test_in_requires_list() {
        let (mut scope, var) = scoped();
        let filter = PropertyFilter {
            attribute: attr("name", AttributeType::String),
            operator: FilterOperator::In,
            is_not: false,
            value: json!("Ada"),
        };
        assert!(matches!(
            filter.predicate(&mut scope, &var),
            Err(Error::InvalidComparisonValue { .. })
        ));
    }

    #[test]
    fn test_datetime_comparison_is_coerced() {
        let (mut scope, var) = scoped();
        let filter = PropertyFilter {
            attribute: attr("born", AttributeType::DateTime),
            operator: FilterOperator::Lt,
            is_not: false,
            value: json!("2000-01-01T00:00:00Z"),
        };
        let expr = filter.predicate(&mut scope, &var).unwrap();
        assert_eq!(expr.to_string(), "this0.born < datetime($param0)");
    }

    #[test]
    fn test_malformed_datetime_rejected() {
        let (mut scope, var) = scoped();
        let filter = PropertyFilter {
            attribute: attr("born", AttributeType::DateTime),
            operator: FilterOperator::Eq,
            is_not: false,
            value: json!("yesterday"),
        };
        assert!(filter.predicate(&mut scope, &var).is_err());
    }

    #[test]
    fn test_duration_equality() {
        let (mut scope, var) = scoped();
        let filter = DurationFilter {
            attribute: attr("shift", AttributeType::Duration),
            operator: FilterOperator::Eq,
            is_not: false,
            value: DurationComponents::parse_iso("P1M").unwrap(),
        };
        let expr = filter.predicate(&mut scope, &var).unwrap();
        assert_eq!(expr.to_string(), "this0.shift = duration($param0)");
    }

    #[test]
    fn test_duration_ordering_anchors_to_datetime() {
        let (mut scope, var) = scoped();
        let filter = DurationFilter {
            attribute: attr("shift", AttributeType::Duration),
            operator: FilterOperator::Gt,
            is_not: false,
            value: DurationComponents::parse_iso("PT8H").unwrap(),
        };
        let expr = filter.predicate(&mut scope, &var).unwrap();
        assert_eq!(
            expr.to_string(),
            "datetime() + this0.shift > datetime() + duration($param0)"
        );
    }

    #[test]
    fn test_point_distance_comparison() {
        let (mut scope, var) = scoped();
        let filter = PointFilter {
            attribute: attr("location", AttributeType::Point),
            operator: FilterOperator::Lt,
            is_not: false,
            value: json!({
                "point": { "longitude": 13.4, "latitude": 52.5 },
                "distance": 1000.0,
            }),
        };
        let expr = filter.predicate(&mut scope, &var).unwrap();
        assert_eq!(
            expr.to_string(),
            "point.distance(this0.location, point($param0.point)) < $param0.distance"
        );
    }

    #[test]
    fn test_point_in_list() {
        let (mut scope, var) = scoped();
        let filter = PointFilter {
            attribute: attr("location", AttributeType::Point),
            operator: FilterOperator::In,
            is_not: false,
            value: json!([{ "longitude": 1.0, "latitude": 2.0 }]),
        };
        let expr = filter.predicate(&mut scope, &var).unwrap();
        assert_eq!(
            expr.to_string(),
            "this0.location IN [p IN $param0 | point(p)]"
        );
    }

    #[test]
    fn test_logical_not_wraps_conjunction() {
        let (mut scope, var) = scoped();
        let filter = LogicalFilter {
            operation: LogicalOperator::Not,
            filters: vec![
                Filter::Property(PropertyFilter {
                    attribute: attr("age", AttributeType::Int),
                    operator: FilterOperator::Gt,
                    is_not: false,
                    value: json!(10),
                }),
                Filter::Property(PropertyFilter {
                    attribute: attr("age", AttributeType::Int),
                    operator: FilterOperator::Lt,
                    is_not: false,
                    value: json!(5),
                }),
            ],
        };
        let expr = filter.predicate(&mut scope, &var).unwrap();
        assert_eq!(
            expr.to_string(),
            "NOT ((this0.age > $param0 AND this0.age < $param1))"
        );
    }
}
