//! `describe_entities` filtering and projection.
//!
//! An entity is listed iff its resolved `dml-tools` flag is on. Source type
//! and `custom-tool` play no part in the decision: a stored procedure that
//! is both a custom tool and DML-enabled is still listed.

use crate::error::ToolError;
use crate::exposure::{ExposurePolicy, resolve_dml_tools};
use crate::permissions::RolePermissions;
use datagate_core::{
    DmlToolKind, EntityAction, EntityConfig, EntityMap, EntitySourceType, ParameterDefinition,
};
use serde::{Deserialize, Serialize};

/// Filter the entity map down to entities listed by `describe_entities`.
///
/// Errors:
/// - empty map: `NoEntitiesConfigured` (always takes precedence)
/// - nothing left after filtering: `AllEntitiesFilteredDmlDisabled`
pub fn filter_for_describe_entities(
    entities: &EntityMap,
) -> Result<Vec<(&str, &EntityConfig)>, ToolError> {
    if entities.is_empty() {
        return Err(ToolError::no_entities_configured());
    }

    let listed: Vec<(&str, &EntityConfig)> = entities
        .iter()
        .filter(|(_, entity)| resolve_dml_tools(entity))
        .collect();

    if listed.is_empty() {
        tracing::warn!(
            total = entities.len(),
            "Every configured entity has dml-tools disabled; describe_entities is empty"
        );
        return Err(ToolError::all_entities_filtered_dml_disabled(entities.len()));
    }

    Ok(listed)
}

/// Options for a `describe_entities` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeOptions {
    /// Return only name and description per entity.
    #[serde(default, alias = "name_only")]
    pub name_only: bool,

    /// Restrict output to these entity names. Unknown names are ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<String>>,
}

/// One entity in the `describe_entities` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribedEntity {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<EntitySourceType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_fields: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ParameterDefinition>>,

    /// Actions available to the calling role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<EntityAction>>,
}

impl DescribedEntity {
    /// The lightweight projection: name and description only.
    pub fn name_only(name: &str, entity: &EntityConfig) -> Self {
        Self {
            name: name.to_string(),
            description: entity.description.clone(),
            source_type: None,
            key_fields: None,
            parameters: None,
            permissions: None,
        }
    }

    /// The full projection for a role.
    pub fn full(name: &str, entity: &EntityConfig, role: &str) -> Self {
        let source_type = entity.source_type();
        let (key_fields, parameters) = if source_type.is_stored_procedure() {
            (None, Some(entity.source.parameters()))
        } else {
            (Some(entity.source.key_fields.clone()), None)
        };

        Self {
            name: name.to_string(),
            description: entity.description.clone(),
            source_type: Some(source_type),
            key_fields,
            parameters,
            permissions: Some(
                RolePermissions::new(entity)
                    .actions_for(role)
                    .into_iter()
                    .collect(),
            ),
        }
    }
}

/// Successful `describe_entities` result. `count` always equals `entities.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribeEntitiesResponse {
    entities: Vec<DescribedEntity>,
    count: usize,
}

impl DescribeEntitiesResponse {
    pub fn new(entities: Vec<DescribedEntity>) -> Self {
        let count = entities.len();
        Self { entities, count }
    }

    pub fn entities(&self) -> &[DescribedEntity] {
        &self.entities
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn names(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.name.as_str()).collect()
    }
}

impl ExposurePolicy<'_> {
    /// Compute the `describe_entities` result for a role.
    pub fn describe_entities(
        &self,
        role: &str,
        options: &DescribeOptions,
    ) -> Result<DescribeEntitiesResponse, ToolError> {
        if !self.is_runtime_tool_enabled(DmlToolKind::DescribeEntities) {
            return Err(ToolError::runtime_tool_disabled(DmlToolKind::DescribeEntities));
        }

        let listed = filter_for_describe_entities(&self.config().entities)?;

        let entities: Vec<DescribedEntity> = listed
            .into_iter()
            .filter(|(name, _)| {
                options
                    .entities
                    .as_ref()
                    .is_none_or(|wanted| wanted.iter().any(|w| w == name))
            })
            .map(|(name, entity)| {
                if options.name_only {
                    DescribedEntity::name_only(name, entity)
                } else {
                    DescribedEntity::full(name, entity, role)
                }
            })
            .collect();

        tracing::debug!(
            role = %role,
            count = entities.len(),
            name_only = options.name_only,
            "Described entities"
        );

        Ok(DescribeEntitiesResponse::new(entities))
    }
}
