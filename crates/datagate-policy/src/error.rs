//! Tool error types.
//!
//! Every runtime condition the policy engine detects (empty configuration,
//! everything filtered away, a disabled tool, bad arguments) is a typed
//! [`ToolError`] value rather than a panic. Its `kind` serializes to the
//! error type string clients receive in the error envelope.

use datagate_core::{DmlToolKind, EntityAction};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// Error returned from a tool call or policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    /// The kind of error.
    pub kind: ToolErrorKind,
    /// Human-readable error message with a remediation hint.
    pub message: String,
}

impl ToolError {
    /// Create a new tool error.
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    // =========================================================================
    // CONFIGURATION ABSENCE / FILTERING EXHAUSTION
    // =========================================================================

    /// No entities exist in the configuration at all.
    pub fn no_entities_configured() -> Self {
        Self::new(
            ToolErrorKind::NoEntitiesConfigured,
            "No entities are configured in the runtime configuration. \
             Add at least one entity under 'entities' to expose it through MCP.",
        )
    }

    /// Entities exist, but every one has `dml-tools: false`.
    pub fn all_entities_filtered_dml_disabled(total: usize) -> Self {
        Self::new(
            ToolErrorKind::AllEntitiesFilteredDmlDisabled,
            format!(
                "All configured entities ({} total) have DML tools disabled (dml-tools: false), \
                 so describe_entities has nothing to list. Set 'dml-tools: true' on an entity \
                 to expose it to the DML tools, or use tools/list to discover stored procedures \
                 exposed as dedicated tools (custom-tool: true).",
                total
            ),
        )
    }

    /// Entities exist, but every one is exposed as a custom tool.
    ///
    /// Superseded by [`ToolError::all_entities_filtered_dml_disabled`]: the
    /// describe filter is keyed on `dml-tools` only. Kept so the error type
    /// string stays part of the wire contract.
    pub fn all_entities_filtered_as_custom_tools(total: usize) -> Self {
        Self::new(
            ToolErrorKind::AllEntitiesFilteredAsCustomTools,
            format!(
                "All configured entities ({} total) are exposed as custom tools (custom-tool: true) \
                 and are not listed by describe_entities. Use tools/list to discover them.",
                total
            ),
        )
    }

    // =========================================================================
    // PER-CALL GATING
    // =========================================================================

    /// The entity has `dml-tools: false`.
    pub fn dml_tools_disabled(entity: &str) -> Self {
        Self::new(
            ToolErrorKind::ToolDisabled,
            format!(
                "DML tools are disabled for entity '{}'. \
                 Set 'dml-tools: true' in the entity's mcp block to enable them.",
                entity
            ),
        )
    }

    /// The runtime-level flag for a built-in tool is off.
    pub fn runtime_tool_disabled(kind: DmlToolKind) -> Self {
        Self::new(
            ToolErrorKind::ToolDisabled,
            format!(
                "The {} tool is disabled in the runtime configuration \
                 (runtime.mcp.dml-tools.{}: false).",
                kind.tool_name(),
                kind.config_key()
            ),
        )
    }

    /// The stored procedure's custom tool is not enabled.
    pub fn custom_tool_disabled(entity: &str) -> Self {
        Self::new(
            ToolErrorKind::ToolDisabled,
            format!(
                "Custom tool is disabled for entity '{}'. \
                 Set 'custom-tool: true' in the entity's mcp block to enable it.",
                entity
            ),
        )
    }

    /// The role has not been granted the action on the entity.
    pub fn permission_denied(role: &str, action: EntityAction, entity: &str) -> Self {
        Self::new(
            ToolErrorKind::PermissionDenied,
            format!(
                "Role '{}' is not permitted to {} entity '{}'. \
                 Grant the action in the entity's permissions block.",
                role, action, entity
            ),
        )
    }

    /// No entity with this name is configured.
    pub fn entity_not_found(entity: &str) -> Self {
        Self::new(
            ToolErrorKind::EntityNotFound,
            format!(
                "Entity '{}' is not configured. Use describe_entities to list available entities.",
                entity
            ),
        )
    }

    /// The operation does not apply to this entity's source type.
    pub fn invalid_entity(entity: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ToolErrorKind::InvalidEntity,
            format!("Entity '{}' cannot be used here: {}", entity, reason),
        )
    }

    // =========================================================================
    // INPUT VALIDATION / DATA LAYER
    // =========================================================================

    /// Malformed or missing request arguments.
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArguments, message)
    }

    /// A required argument is absent.
    pub fn missing_argument(name: &str) -> Self {
        Self::invalid_arguments(format!("Missing required argument '{}'", name))
    }

    /// The external data layer failed.
    pub fn data_source(err: impl fmt::Display) -> Self {
        Self::new(
            ToolErrorKind::DataSourceError,
            format!("Data source error: {}", err),
        )
    }

    /// The `{ "error": { "type", "message" } }` envelope.
    pub fn to_envelope(&self) -> Value {
        json!({
            "error": {
                "type": self.kind.as_str(),
                "message": self.message,
            }
        })
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ToolError {}

/// Categories of tool errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolErrorKind {
    // =========================================================================
    // Configuration absence
    // =========================================================================
    /// The entity map is empty.
    NoEntitiesConfigured,

    // =========================================================================
    // Filtering exhaustion
    // =========================================================================
    /// Every entity was excluded by `dml-tools: false`.
    AllEntitiesFilteredDmlDisabled,
    /// Every entity was excluded as a custom tool (superseded filter dimension).
    AllEntitiesFilteredAsCustomTools,

    // =========================================================================
    // Per-call gating
    // =========================================================================
    /// The requested tool is disabled for the entity or the runtime.
    ToolDisabled,
    /// The role lacks the action on the entity.
    PermissionDenied,
    /// The entity name is unknown.
    EntityNotFound,
    /// The entity's source type does not support the operation.
    InvalidEntity,

    // =========================================================================
    // Input validation / data layer
    // =========================================================================
    /// Malformed or missing request arguments.
    InvalidArguments,
    /// The external data layer reported an error.
    DataSourceError,
}

impl ToolErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ToolErrorKind::NoEntitiesConfigured => "NoEntitiesConfigured",
            ToolErrorKind::AllEntitiesFilteredDmlDisabled => "AllEntitiesFilteredDmlDisabled",
            ToolErrorKind::AllEntitiesFilteredAsCustomTools => "AllEntitiesFilteredAsCustomTools",
            ToolErrorKind::ToolDisabled => "ToolDisabled",
            ToolErrorKind::PermissionDenied => "PermissionDenied",
            ToolErrorKind::EntityNotFound => "EntityNotFound",
            ToolErrorKind::InvalidEntity => "InvalidEntity",
            ToolErrorKind::InvalidArguments => "InvalidArguments",
            ToolErrorKind::DataSourceError => "DataSourceError",
        }
    }
}

impl fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
