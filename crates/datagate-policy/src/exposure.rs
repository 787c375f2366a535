//! Exposure policy engine.
//!
//! Decides, per entity and per requested capability, whether it is exposed.
//! The tri-state entity flags are resolved here and nowhere else:
//!
//! | Flag | Unset resolves to | Meaningful for |
//! |------|-------------------|----------------|
//! | `dml-tools` | `true` | every source type |
//! | `custom-tool` | `false` | stored procedures only |
//!
//! A built-in DML tool is usable on an entity iff its runtime flag AND the
//! entity's resolved `dml-tools` flag are both on.

use crate::error::ToolError;
use crate::permissions::RolePermissions;
use datagate_core::{
    DmlToolKind, EntityAction, EntityConfig, EntitySourceType, RuntimeConfig,
};
use serde::Serialize;

/// Resolve an entity's `dml-tools` flag (unset means enabled).
pub fn resolve_dml_tools(entity: &EntityConfig) -> bool {
    entity.dml_tools_setting().unwrap_or(true)
}

/// Resolve an entity's `custom-tool` flag.
///
/// Only stored procedures can be custom tools; the flag is ignored for
/// tables and views.
pub fn resolve_custom_tool(entity: &EntityConfig) -> bool {
    entity.source_type().is_stored_procedure() && entity.custom_tool_setting().unwrap_or(false)
}

/// Why an entity is or is not listed by `describe_entities`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureReason {
    /// Listed: DML tools are enabled (explicitly or by default).
    Visible,
    /// Hidden: the entity sets `dml-tools: false`.
    DmlToolsDisabled,
}

/// Resolved exposure of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityExposure {
    pub name: String,
    pub source_type: EntitySourceType,
    /// Resolved `dml-tools` flag.
    pub dml_tools: bool,
    /// Resolved `custom-tool` flag.
    pub custom_tool: bool,
    /// Set when `custom-tool` was configured on a table or view and ignored.
    pub custom_tool_ignored: bool,
    pub reason: ExposureReason,
}

impl EntityExposure {
    /// Whether `describe_entities` lists the entity.
    pub fn is_listed(&self) -> bool {
        self.reason == ExposureReason::Visible
    }
}

/// Exposure decisions over one configuration snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ExposurePolicy<'a> {
    config: &'a RuntimeConfig,
}

impl<'a> ExposurePolicy<'a> {
    /// Create a policy over a configuration snapshot.
    pub fn new(config: &'a RuntimeConfig) -> Self {
        Self { config }
    }

    /// The configuration this policy reads.
    pub fn config(&self) -> &'a RuntimeConfig {
        self.config
    }

    /// Whether the runtime-level flag for a built-in tool is on.
    pub fn is_runtime_tool_enabled(&self, kind: DmlToolKind) -> bool {
        self.config.mcp().is_tool_enabled(kind)
    }

    /// `runtime flag AND entity dml-tools`. Pure; no error detail.
    pub fn is_dml_enabled(&self, entity: &EntityConfig, kind: DmlToolKind) -> bool {
        self.is_runtime_tool_enabled(kind) && resolve_dml_tools(entity)
    }

    /// Whether the entity is exposed as a dedicated custom tool.
    pub fn is_custom_tool_enabled(&self, entity: &EntityConfig) -> bool {
        resolve_custom_tool(entity)
    }

    /// Look up an entity by name.
    pub fn entity(&self, name: &str) -> Result<&'a EntityConfig, ToolError> {
        self.config
            .entity(name)
            .ok_or_else(|| ToolError::entity_not_found(name))
    }

    /// Gate a built-in DML tool call on an entity.
    ///
    /// Checks, in order: the entity exists, the runtime flag, the entity flag.
    pub fn check_dml(
        &self,
        entity_name: &str,
        kind: DmlToolKind,
    ) -> Result<&'a EntityConfig, ToolError> {
        let entity = self.entity(entity_name)?;

        if !self.is_runtime_tool_enabled(kind) {
            tracing::debug!(entity = %entity_name, tool = %kind, "Runtime flag disables tool");
            return Err(ToolError::runtime_tool_disabled(kind));
        }

        if !resolve_dml_tools(entity) {
            tracing::debug!(entity = %entity_name, tool = %kind, "Entity disables DML tools");
            return Err(ToolError::dml_tools_disabled(entity_name));
        }

        Ok(entity)
    }

    /// Gate a custom tool call on its stored procedure.
    pub fn check_custom_tool(&self, entity_name: &str) -> Result<&'a EntityConfig, ToolError> {
        let entity = self.entity(entity_name)?;
        if !entity.source_type().is_stored_procedure() {
            return Err(ToolError::invalid_entity(
                entity_name,
                "custom tools are only available for stored procedures",
            ));
        }
        if !resolve_custom_tool(entity) {
            return Err(ToolError::custom_tool_disabled(entity_name));
        }
        Ok(entity)
    }

    /// Check that the tool applies to the entity's source type.
    pub fn check_source_type(
        &self,
        entity_name: &str,
        entity: &EntityConfig,
        kind: DmlToolKind,
    ) -> Result<(), ToolError> {
        let source_type = entity.source_type();
        match kind {
            DmlToolKind::DescribeEntities => Ok(()),
            DmlToolKind::ExecuteEntity if !source_type.is_stored_procedure() => {
                Err(ToolError::invalid_entity(
                    entity_name,
                    format!(
                        "{} only runs stored procedures, but this entity is a {}",
                        kind, source_type
                    ),
                ))
            }
            DmlToolKind::ExecuteEntity => Ok(()),
            _ if source_type.is_stored_procedure() => Err(ToolError::invalid_entity(
                entity_name,
                format!(
                    "{} does not apply to stored procedures; use execute_entity instead",
                    kind
                ),
            )),
            _ => Ok(()),
        }
    }

    /// Check that the role holds the action on the entity.
    pub fn check_permission(
        &self,
        role: &str,
        entity_name: &str,
        entity: &EntityConfig,
        action: EntityAction,
    ) -> Result<(), ToolError> {
        if RolePermissions::new(entity).allows(role, action) {
            Ok(())
        } else {
            tracing::debug!(role = %role, entity = %entity_name, action = %action, "Permission denied");
            Err(ToolError::permission_denied(role, action, entity_name))
        }
    }

    /// Resolve the exposure of one entity.
    pub fn exposure(&self, name: &str, entity: &EntityConfig) -> EntityExposure {
        let dml_tools = resolve_dml_tools(entity);
        let custom_tool = resolve_custom_tool(entity);
        EntityExposure {
            name: name.to_string(),
            source_type: entity.source_type(),
            dml_tools,
            custom_tool,
            custom_tool_ignored: !entity.source_type().is_stored_procedure()
                && entity.custom_tool_setting().is_some(),
            reason: if dml_tools {
                ExposureReason::Visible
            } else {
                ExposureReason::DmlToolsDisabled
            },
        }
    }

    /// Resolve the exposure of every entity, in configuration order.
    pub fn exposures(&self) -> Vec<EntityExposure> {
        self.config
            .entities()
            .map(|(name, entity)| self.exposure(name, entity))
            .collect()
    }
}

/// The action a built-in tool needs on the entity.
pub fn required_action(kind: DmlToolKind) -> Option<EntityAction> {
    match kind {
        DmlToolKind::DescribeEntities => None,
        DmlToolKind::ReadRecords | DmlToolKind::AggregateRecords => Some(EntityAction::Read),
        DmlToolKind::CreateRecord => Some(EntityAction::Create),
        DmlToolKind::UpdateRecord => Some(EntityAction::Update),
        DmlToolKind::DeleteRecord => Some(EntityAction::Delete),
        DmlToolKind::ExecuteEntity => Some(EntityAction::Execute),
    }
}
