//! Error types for the MCP crate.

use crate::tools::ToolKind;
use thiserror::Error;

/// Errors raised while registering or constructing tools.
///
/// These are configuration-authoring mistakes detected at startup and are
/// never deferred to request time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A tool with the same name is already registered.
    #[error("{}", duplicate_tool_message(.name, .existing, .attempted))]
    DuplicateTool {
        name: String,
        existing: ToolKind,
        attempted: ToolKind,
    },

    /// A custom tool was requested for an entity with a blank name.
    #[error("cannot create a custom tool: entity name must not be empty")]
    EmptyEntityName,

    /// A custom tool was requested for a table or view.
    #[error(
        "cannot create a custom tool for entity '{entity}': custom tools require a stored procedure, found {source_type}"
    )]
    NotStoredProcedure { entity: String, source_type: String },
}

fn duplicate_tool_message(name: &str, existing: &ToolKind, attempted: &ToolKind) -> String {
    let mut msg = format!(
        "Duplicate tool name '{}' detected. A {} tool with this name is already registered. \
         Cannot register {} tool with the same name.",
        name,
        existing.label(),
        attempted.label()
    );
    if existing != attempted {
        msg.push_str(" Tool names must be unique across all tool types.");
    }
    msg
}

/// Errors that can occur in the MCP tool surface.
#[derive(Debug, Error)]
pub enum McpError {
    /// Tool not found.
    #[error("tool not found: {name}")]
    ToolNotFound { name: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
