//! Filter construction from client `where` objects
//!
//! Walks the raw JSON filter, parses each key, resolves it against the
//! schema model and produces the typed filter tree. All client-input
//! validation happens here; the filter nodes themselves assume
//! well-resolved attributes.

use graphweave_core::{DurationComponents, Error, Result};
use graphweave_model::{AttributeType, Entity, Relationship, SchemaModel};

use crate::filter::{
    DurationFilter, Filter, LogicalFilter, LogicalOperator, PointFilter, PropertyFilter,
};
use crate::relationship_filter::{ConnectionFilter, Quantifier, RelationshipFilter};
use crate::where_parse::{FilterOperator, WhereField, parse_where_field};

/// Builds filter trees for one request
pub struct FilterFactory<'a> {
    model: &'a SchemaModel,
    jwt: &'a serde_json::Value,
}

impl<'a> FilterFactory<'a> {
    pub fn new(model: &'a SchemaModel, jwt: &'a serde_json::Value) -> Self {
        Self { model, jwt }
    }

    /// Build the filters for a `where` object against `entity`.
    ///
    /// Sibling entries form an implicit conjunction; the caller combines
    /// the returned filters with AND.
    pub fn create_filters(
        &self,
        entity: &Entity,
        where_obj: &serde_json::Value,
    ) -> Result<Vec<Filter>> {
        let map = where_obj
            .as_object()
            .ok_or_else(|| Error::InvalidComparisonValue {
                field: entity.name.clone(),
                detail: "filter must be an object".to_string(),
            })?;

        let mut filters = Vec::with_capacity(map.len());
        for (key, value) in map {
            if let Some(operation) = logical_operator(key) {
                filters.push(self.logical_filter(operation, value, |nested| {
                    self.create_filters(entity, nested)
                })?);
                continue;
            }

            let parsed = parse_where_field(key)?;
            if parsed.is_connection {
                filters.push(self.connection_filter(entity, &parsed, value)?);
            } else if entity.find_relationship(&parsed.field_name).is_some() {
                filters.push(self.relationship_filter(entity, &parsed, value)?);
            } else {
                filters.push(self.attribute_filter(entity, &parsed, value)?);
            }
        }
        Ok(filters)
    }

    /// Build the edge-property filters of a connection `where`'s `edge` key
    pub fn create_edge_filters(
        &self,
        relationship: &Relationship,
        where_obj: &serde_json::Value,
    ) -> Result<Vec<Filter>> {
        let map = where_obj
            .as_object()
            .ok_or_else(|| Error::InvalidComparisonValue {
                field: relationship.name.clone(),
                detail: "edge filter must be an object".to_string(),
            })?;

        let mut filters = Vec::with_capacity(map.len());
        for (key, value) in map {
            if let Some(operation) = logical_operator(key) {
                filters.push(self.logical_filter(operation, value, |nested| {
                    self.create_edge_filters(relationship, nested)
                })?);
                continue;
            }

            let parsed = parse_where_field(key)?;
            let attribute = relationship
                .find_attribute(&parsed.field_name)
                .ok_or_else(|| Error::UnknownAttribute {
                    entity: relationship.name.clone(),
                    field: parsed.field_name.clone(),
                })?
                .clone();
            filters.push(self.scalar_filter(attribute, &parsed, value)?);
        }
        Ok(filters)
    }

    fn logical_filter(
        &self,
        operation: LogicalOperator,
        value: &serde_json::Value,
        build: impl Fn(&serde_json::Value) -> Result<Vec<Filter>>,
    ) -> Result<Filter> {
        // AND/OR/NOT accept a list of filter objects; a lone object is
        // treated as a one-element list
        let nested: Vec<&serde_json::Value> = match value {
            serde_json::Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        let mut filters = Vec::with_capacity(nested.len());
        for obj in nested {
            let mut children = build(obj)?;
            filters.push(match children.len() {
                1 => children.remove(0),
                _ => Filter::Logical(LogicalFilter {
                    operation: LogicalOperator::And,
                    filters: children,
                }),
            });
        }
        Ok(Filter::Logical(LogicalFilter { operation, filters }))
    }

    fn relationship_filter(
        &self,
        entity: &Entity,
        parsed: &WhereField,
        value: &serde_json::Value,
    ) -> Result<Filter> {
        let relationship = entity
            .find_relationship(&parsed.field_name)
            .ok_or_else(|| Error::UnknownRelationship {
                entity: entity.name.clone(),
                field: parsed.field_name.clone(),
            })?
            .clone();
        let target = self.model.concrete_target(&relationship.target)?;
        let quantifier = self.quantifier_for(&relationship, parsed)?;

        if value.is_null() {
            return Ok(Filter::Relationship(RelationshipFilter {
                relationship,
                target,
                quantifier,
                is_not: parsed.is_not,
                is_null_check: true,
                filters: Vec::new(),
            }));
        }

        let filters = self.create_filters(&target, value)?;
        Ok(Filter::Relationship(RelationshipFilter {
            relationship,
            target,
            quantifier,
            is_not: parsed.is_not,
            is_null_check: false,
            filters,
        }))
    }

    fn connection_filter(
        &self,
        entity: &Entity,
        parsed: &WhereField,
        value: &serde_json::Value,
    ) -> Result<Filter> {
        let relationship = entity
            .find_relationship(&parsed.field_name)
            .ok_or_else(|| Error::UnknownRelationship {
                entity: entity.name.clone(),
                field: parsed.field_name.clone(),
            })?
            .clone();
        let target = self.model.concrete_target(&relationship.target)?;
        let quantifier = self.quantifier_for(&relationship, parsed)?;

        let map = value
            .as_object()
            .ok_or_else(|| Error::InvalidComparisonValue {
                field: parsed.field_name.clone(),
                detail: "connection filter must be an object".to_string(),
            })?;

        let mut node_filters = Vec::new();
        let mut edge_filters = Vec::new();
        for (key, nested) in map {
            match key.as_str() {
                "node" => node_filters = self.create_filters(&target, nested)?,
                "edge" => edge_filters = self.create_edge_filters(&relationship, nested)?,
                other => {
                    return Err(Error::UnknownField {
                        entity: parsed.field_name.clone(),
                        field: other.to_string(),
                    });
                }
            }
        }

        Ok(Filter::Connection(ConnectionFilter {
            relationship,
            target,
            quantifier,
            is_not: parsed.is_not,
            node_filters,
            edge_filters,
        }))
    }

    fn quantifier_for(
        &self,
        relationship: &Relationship,
        parsed: &WhereField,
    ) -> Result<Quantifier> {
        let quantifier = match parsed.operator {
            // bare relationship key quantifies over SOME
            None => Quantifier::Some,
            Some(FilterOperator::Some) => Quantifier::Some,
            Some(FilterOperator::All) => Quantifier::All,
            Some(FilterOperator::None) => Quantifier::None,
            Some(FilterOperator::Single) => Quantifier::Single,
            Some(other) => {
                return Err(Error::InvalidOperator {
                    operator: other.as_str().to_string(),
                    field: parsed.field_name.clone(),
                });
            }
        };

        // on a to-one relationship ALL can only hold for exactly one row
        if quantifier == Quantifier::All && !relationship.array {
            return Ok(Quantifier::Single);
        }
        Ok(quantifier)
    }

    fn attribute_filter(
        &self,
        entity: &Entity,
        parsed: &WhereField,
        value: &serde_json::Value,
    ) -> Result<Filter> {
        let attribute = entity
            .find_attribute(&parsed.field_name)
            .ok_or_else(|| Error::UnknownAttribute {
                entity: entity.name.clone(),
                field: parsed.field_name.clone(),
            })?
            .clone();
        self.scalar_filter(attribute, parsed, value)
    }

    fn scalar_filter(
        &self,
        attribute: graphweave_model::Attribute,
        parsed: &WhereField,
        value: &serde_json::Value,
    ) -> Result<Filter> {
        let operator = parsed.operator.unwrap_or(FilterOperator::Eq);
        if operator.is_relationship_operator() {
            return Err(Error::InvalidOperator {
                operator: operator.as_str().to_string(),
                field: parsed.field_name.clone(),
            });
        }

        let value = self.resolve_value(value);
        match attribute.attribute_type {
            AttributeType::Duration => {
                let components = DurationComponents::from_json(&attribute.name, &value)?;
                Ok(Filter::Duration(DurationFilter {
                    attribute,
                    operator,
                    is_not: parsed.is_not,
                    value: components,
                }))
            }
            AttributeType::Point => Ok(Filter::Point(PointFilter {
                attribute,
                operator,
                is_not: parsed.is_not,
                value,
            })),
            _ => Ok(Filter::Property(PropertyFilter {
                attribute,
                operator,
                is_not: parsed.is_not,
                value,
            })),
        }
    }

    /// Substitutes `"$jwt.<claim>"` string values with the request's token
    /// claims. A missing claim resolves to null.
    fn resolve_value(&self, value: &serde_json::Value) -> serde_json::Value {
        match value {
            serde_json::Value::String(s) => match s.strip_prefix("$jwt.") {
                Some(claim) => self
                    .jwt
                    .get(claim)
                    .cloned()
                    .unwrap_or(serde_json::Value::Null),
                None => value.clone(),
            },
            serde_json::Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(|v| self.resolve_value(v)).collect())
            }
            serde_json::Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.resolve_value(v)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

fn logical_operator(key: &str) -> Option<LogicalOperator> {
    match key {
        "AND" => Some(LogicalOperator::And),
        "OR" => Some(LogicalOperator::Or),
        "NOT" => Some(LogicalOperator::Not),
        _ => None,
    }
}
