//! Operation construction from selection trees
//!
//! Resolves each selected field against the schema model and produces the
//! typed operation tree. Field name conventions mirror the generated API
//! surface: `<rel>` reads, `<rel>Connection` reads edges, `<rel>Aggregate`
//! aggregates.

use std::sync::Arc;

use graphweave_core::{Error, Result};
use graphweave_model::{Entity, Relationship, SchemaModel};

use crate::aggregation::AggregationOperation;
use crate::ast::QueryAst;
use crate::connection::ConnectionReadOperation;
use crate::field::{AggregationField, AggregationOp, AttributeField, Field};
use crate::filter::Filter;
use crate::filter_factory::FilterFactory;
use crate::operation::Operation;
use crate::pagination::Pagination;
use crate::read::ReadOperation;
use crate::selection::{Selection, SortInput, property_sorts};
use crate::sort::{ConnectionSort, PropertySort};

/// Builds query trees for one request
pub struct AstFactory<'a> {
    model: &'a SchemaModel,
    jwt: serde_json::Value,
}

impl<'a> AstFactory<'a> {
    pub fn new(model: &'a SchemaModel) -> Self {
        Self {
            model,
            jwt: serde_json::Value::Null,
        }
    }

    /// Attach the request's token claims, available to filters as
    /// `"$jwt.<claim>"` values
    pub fn with_jwt(model: &'a SchemaModel, jwt: serde_json::Value) -> Self {
        Self { model, jwt }
    }

    /// Build a top-level read of `entity_name` from a selection tree
    pub fn read(&self, entity_name: &str, selection: &Selection) -> Result<QueryAst> {
        let entity = self
            .model
            .entity(entity_name)
            .ok_or_else(|| Error::UnknownEntity(entity_name.to_string()))?;
        let operation = self.read_operation(entity, None, selection)?;
        Ok(QueryAst::new(Operation::Read(operation)))
    }

    fn read_operation(
        &self,
        entity: Arc<Entity>,
        relationship: Option<Relationship>,
        selection: &Selection,
    ) -> Result<ReadOperation> {
        let filter_factory = FilterFactory::new(self.model, &self.jwt);
        let arguments = &selection.arguments;

        let mut filters = match &arguments.where_arg {
            Some(where_obj) => filter_factory.create_filters(&entity, where_obj)?,
            None => Vec::new(),
        };
        let mut validate_filters = Vec::new();
        if let Some(authorization) = &entity.authorization {
            if let Some(auth_where) = &authorization.filter {
                filters.extend(filter_factory.create_filters(&entity, auth_where)?);
            }
            if let Some(validate_where) = &authorization.validate {
                validate_filters = filter_factory.create_filters(&entity, validate_where)?;
            }
        }

        let sort_fields = self.entity_sorts(&entity, &arguments.sort)?;
        let pagination = Pagination::from_args(
            arguments.skip.as_ref(),
            arguments.limit.as_ref(),
            arguments.after.as_deref(),
        )?;

        let mut fields = Vec::with_capacity(selection.selections.len());
        for child in &selection.selections {
            fields.push(self.read_field(&entity, child)?);
        }

        Ok(ReadOperation {
            target: entity,
            relationship,
            directed: arguments.directed,
            filters,
            validate_filters,
            sort_fields,
            pagination,
            fields,
        })
    }

    /// Resolve one selected field of a read: relationship reads and their
    /// `Connection` / `Aggregate` variants take precedence over attributes
    fn read_field(&self, entity: &Entity, selection: &Selection) -> Result<Field> {
        let name = selection.name.as_str();
        let alias = selection.alias().to_string();

        if let Some(relationship) = entity.find_relationship(name) {
            let relationship = relationship.clone();
            let target = self.model.concrete_target(&relationship.target)?;
            let operation =
                self.read_operation(target, Some(relationship), selection)?;
            return Ok(Field::Operation {
                alias,
                operation: Box::new(Operation::Read(operation)),
            });
        }

        if let Some(base) = name.strip_suffix("Connection") {
            if let Some(relationship) = entity.find_relationship(base) {
                let relationship = relationship.clone();
                let operation = self.connection_operation(&relationship, selection)?;
                return Ok(Field::Operation {
                    alias,
                    operation: Box::new(Operation::ConnectionRead(operation)),
                });
            }
        }

        if let Some(base) = name.strip_suffix("Aggregate") {
            if let Some(relationship) = entity.find_relationship(base) {
                let relationship = relationship.clone();
                let operation = self.aggregation_operation(&relationship, selection)?;
                return Ok(Field::Operation {
                    alias,
                    operation: Box::new(Operation::Aggregation(operation)),
                });
            }
        }

        if entity.find_attribute(name).is_some() {
            return Ok(Field::Attribute {
                alias,
                name: name.to_string(),
            });
        }

        Err(Error::UnknownField {
            entity: entity.name.clone(),
            field: name.to_string(),
        })
    }

    fn connection_operation(
        &self,
        relationship: &Relationship,
        selection: &Selection,
    ) -> Result<ConnectionReadOperation> {
        let target = self.model.concrete_target(&relationship.target)?;
        let filter_factory = FilterFactory::new(self.model, &self.jwt);
        let arguments = &selection.arguments;

        let mut node_filters = Vec::new();
        let mut edge_filters = Vec::new();
        if let Some(where_obj) = &arguments.where_arg {
            let map = where_obj
                .as_object()
                .ok_or_else(|| Error::InvalidComparisonValue {
                    field: selection.name.clone(),
                    detail: "connection filter must be an object".to_string(),
                })?;
            for (key, value) in map {
                match key.as_str() {
                    "node" => node_filters = filter_factory.create_filters(&target, value)?,
                    "edge" => {
                        edge_filters = filter_factory.create_edge_filters(relationship, value)?
                    }
                    other => {
                        return Err(Error::UnknownField {
                            entity: selection.name.clone(),
                            field: other.to_string(),
                        });
                    }
                }
            }
        }

        let mut node_fields = Vec::new();
        let mut edge_fields = Vec::new();
        for child in &selection.selections {
            match child.name.as_str() {
                "edges" => {
                    for edge_child in &child.selections {
                        match edge_child.name.as_str() {
                            "node" => {
                                node_fields =
                                    self.attribute_fields(&target, &edge_child.selections)?;
                            }
                            // cursors are derived from row offsets, not stored
                            "cursor" => {}
                            name => {
                                if relationship.find_attribute(name).is_none() {
                                    return Err(Error::UnknownField {
                                        entity: relationship.name.clone(),
                                        field: name.to_string(),
                                    });
                                }
                                edge_fields.push(AttributeField::new(edge_child.alias(), name));
                            }
                        }
                    }
                }
                // both are synthesized from the compiled shape
                "totalCount" | "pageInfo" => {}
                other => {
                    return Err(Error::UnknownField {
                        entity: selection.name.clone(),
                        field: other.to_string(),
                    });
                }
            }
        }

        let sort_fields = self.connection_sorts(relationship, &target, &arguments.sort)?;
        let pagination = Pagination::from_args(
            arguments.skip.as_ref(),
            arguments.limit.as_ref(),
            arguments.after.as_deref(),
        )?;

        Ok(ConnectionReadOperation {
            relationship: relationship.clone(),
            target,
            directed: arguments.directed,
            node_fields,
            edge_fields,
            node_filters,
            edge_filters,
            sort_fields,
            pagination,
        })
    }

    fn aggregation_operation(
        &self,
        relationship: &Relationship,
        selection: &Selection,
    ) -> Result<AggregationOperation> {
        let target = self.model.concrete_target(&relationship.target)?;
        let filter_factory = FilterFactory::new(self.model, &self.jwt);
        let arguments = &selection.arguments;

        let filters = match &arguments.where_arg {
            Some(where_obj) => filter_factory.create_filters(&target, where_obj)?,
            None => Vec::new(),
        };

        let mut fields = Vec::new();
        let mut node_fields = Vec::new();
        let mut edge_fields = Vec::new();
        for child in &selection.selections {
            match child.name.as_str() {
                "count" => fields.push(AggregationField::Count {
                    alias: child.alias().to_string(),
                }),
                "node" => {
                    for attr_child in &child.selections {
                        node_fields.push(self.aggregation_field(
                            &target.name,
                            target.find_attribute(&attr_child.name),
                            attr_child,
                        )?);
                    }
                }
                "edge" => {
                    for attr_child in &child.selections {
                        edge_fields.push(self.aggregation_field(
                            &relationship.name,
                            relationship.find_attribute(&attr_child.name),
                            attr_child,
                        )?);
                    }
                }
                other => {
                    return Err(Error::UnknownField {
                        entity: selection.name.clone(),
                        field: other.to_string(),
                    });
                }
            }
        }

        let sort_fields = self.entity_sorts(&target, &arguments.sort)?;
        let pagination = Pagination::from_args(
            arguments.skip.as_ref(),
            arguments.limit.as_ref(),
            arguments.after.as_deref(),
        )?;

        Ok(AggregationOperation {
            relationship: relationship.clone(),
            target,
            directed: arguments.directed,
            fields,
            node_fields,
            edge_fields,
            filters,
            sort_fields,
            pagination,
        })
    }

    /// One aggregated attribute with its reducer sub-selections
    fn aggregation_field(
        &self,
        owner: &str,
        attribute: Option<&graphweave_model::Attribute>,
        selection: &Selection,
    ) -> Result<AggregationField> {
        let attribute = attribute.ok_or_else(|| Error::UnknownAttribute {
            entity: owner.to_string(),
            field: selection.name.clone(),
        })?;

        let mut ops = Vec::with_capacity(selection.selections.len());
        for reducer in &selection.selections {
            let op = match reducer.name.as_str() {
                "min" => AggregationOp::Min,
                "max" => AggregationOp::Max,
                "avg" => AggregationOp::Avg,
                "sum" => AggregationOp::Sum,
                other => {
                    return Err(Error::UnknownField {
                        entity: attribute.name.clone(),
                        field: other.to_string(),
                    });
                }
            };
            if matches!(op, AggregationOp::Avg | AggregationOp::Sum)
                && !attribute.attribute_type.is_numeric()
            {
                return Err(Error::InvalidOperator {
                    operator: op.name().to_string(),
                    field: attribute.name.clone(),
                });
            }
            ops.push(op);
        }

        Ok(AggregationField::Attribute {
            alias: selection.alias().to_string(),
            name: selection.name.clone(),
            ops,
        })
    }

    /// Flat sorts: each entry is a `{ field: direction }` map over the
    /// entity's attributes
    fn entity_sorts(&self, entity: &Entity, sort: &[SortInput]) -> Result<Vec<PropertySort>> {
        let mut sorts = Vec::new();
        for input in sort {
            if input.is_connection_style() {
                return Err(Error::InvalidSort(format!(
                    "{} does not accept node/edge sort entries",
                    entity.name
                )));
            }
            for (field, direction) in property_sorts(&input.0)
                .map_err(|e| Error::InvalidSort(e.to_string()))?
            {
                if entity.find_attribute(&field).is_none() {
                    return Err(Error::InvalidSort(format!(
                        "unknown sort field {field} on {}",
                        entity.name
                    )));
                }
                sorts.push(PropertySort::new(field, direction));
            }
        }
        Ok(sorts)
    }

    /// Connection sorts: each entry is a `{ node, edge }` pair of flat maps
    fn connection_sorts(
        &self,
        relationship: &Relationship,
        target: &Entity,
        sort: &[SortInput],
    ) -> Result<Vec<ConnectionSort>> {
        let mut sorts = Vec::new();
        for input in sort {
            if !input.is_connection_style() {
                return Err(Error::InvalidSort(format!(
                    "{} sort entries must use the node/edge shape",
                    relationship.name
                )));
            }
            let mut entry = ConnectionSort::default();
            for (key, value) in &input.0 {
                let map = value.as_object().ok_or_else(|| {
                    Error::InvalidSort(format!("{key} sort entry must be an object"))
                })?;
                let parsed =
                    property_sorts(map).map_err(|e| Error::InvalidSort(e.to_string()))?;
                match key.as_str() {
                    "node" => {
                        for (field, direction) in parsed {
                            if target.find_attribute(&field).is_none() {
                                return Err(Error::InvalidSort(format!(
                                    "unknown sort field {field} on {}",
                                    target.name
                                )));
                            }
                            entry.node.push(PropertySort::new(field, direction));
                        }
                    }
                    "edge" => {
                        for (field, direction) in parsed {
                            if relationship.find_attribute(&field).is_none() {
                                return Err(Error::InvalidSort(format!(
                                    "unknown sort field {field} on {}",
                                    relationship.name
                                )));
                            }
                            entry.edge.push(PropertySort::new(field, direction));
                        }
                    }
                    // is_connection_style admits only node and edge keys
                    _ => unreachable!(),
                }
            }
            sorts.push(entry);
        }
        Ok(sorts)
    }

    /// Plain attribute projections, as used inside connection edges
    fn attribute_fields(
        &self,
        entity: &Entity,
        selections: &[Selection],
    ) -> Result<Vec<AttributeField>> {
        let mut fields = Vec::with_capacity(selections.len());
        for selection in selections {
            if entity.find_attribute(&selection.name).is_none() {
                return Err(Error::UnknownField {
                    entity: entity.name.clone(),
                    field: selection.name.clone(),
                });
            }
            fields.push(AttributeField::new(selection.alias(), &selection.name));
        }
        Ok(fields)
    }

    /// Build the filters for a bare `where` object, outside any selection.
    ///
    /// Used by callers that validate filters ahead of execution.
    pub fn filters(&self, entity: &Entity, where_obj: &serde_json::Value) -> Result<Vec<Filter>> {
        FilterFactory::new(self.model, &self.jwt).create_filters(entity, where_obj)
    }
}
