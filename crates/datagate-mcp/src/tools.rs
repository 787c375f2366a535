//! Tool registry for MCP tools.
//!
//! The registry is the single source of truth for which tools exist. It is
//! filled once at startup by [`ToolRegistry::build`] and read-only after
//! that; callers share it behind an `Arc` rather than through a global.
//! Tool names are unique across built-in and custom tools alike.

use crate::builtin;
use crate::custom_tool::CustomTool;
use crate::error::RegistryError;
use crate::protocol::ToolDefinition;
use datagate_core::{DmlToolKind, RuntimeConfig};
use datagate_policy::ExposurePolicy;
use std::collections::HashMap;

/// Whether a tool is one of the fixed DML tools or generated per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    BuiltIn,
    Custom,
}

impl ToolKind {
    /// Label used in registration error messages.
    pub const fn label(&self) -> &'static str {
        match self {
            ToolKind::BuiltIn => "built-in",
            ToolKind::Custom => "custom",
        }
    }
}

/// What a registered tool executes.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolTarget {
    BuiltIn(DmlToolKind),
    Custom(CustomTool),
}

/// A tool in the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredTool {
    pub definition: ToolDefinition,
    pub target: ToolTarget,
}

impl RegisteredTool {
    pub fn builtin(kind: DmlToolKind) -> Self {
        Self {
            definition: builtin::definition(kind),
            target: ToolTarget::BuiltIn(kind),
        }
    }

    pub fn custom(tool: CustomTool) -> Self {
        Self {
            definition: tool.definition(),
            target: ToolTarget::Custom(tool),
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn kind(&self) -> ToolKind {
        match self.target {
            ToolTarget::BuiltIn(_) => ToolKind::BuiltIn,
            ToolTarget::Custom(_) => ToolKind::Custom,
        }
    }
}

/// Registry of available MCP tools.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry for a configuration.
    ///
    /// Registers every built-in tool whose runtime flag is on (when MCP is
    /// enabled), then one custom tool per stored procedure with
    /// `custom-tool: true`. Any name collision aborts the build.
    pub fn build(config: &RuntimeConfig) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        let mcp = config.mcp();

        if !mcp.enabled {
            tracing::info!("MCP is disabled; no tools registered");
            return Ok(registry);
        }

        let policy = ExposurePolicy::new(config);

        for kind in DmlToolKind::ALL {
            if policy.is_runtime_tool_enabled(kind) {
                registry.register_tool(RegisteredTool::builtin(kind))?;
            } else {
                tracing::debug!(tool = %kind, "Built-in tool disabled by runtime flag");
            }
        }

        for (name, entity) in config.entities() {
            if policy.is_custom_tool_enabled(entity) {
                registry.register_tool(RegisteredTool::custom(CustomTool::new(name, entity)?))?;
            }
        }

        tracing::info!(
            tools = registry.len(),
            custom = registry
                .get_all_tools()
                .filter(|t| t.kind() == ToolKind::Custom)
                .count(),
            "Tool registry built"
        );

        Ok(registry)
    }

    /// Register a tool. Fails if the name is already taken by any tool.
    pub fn register_tool(&mut self, tool: RegisteredTool) -> Result<(), RegistryError> {
        if let Some(existing) = self.tools.get(tool.name()) {
            let err = RegistryError::DuplicateTool {
                name: tool.name().to_string(),
                existing: existing.kind(),
                attempted: tool.kind(),
            };
            tracing::warn!(tool = %tool.name(), "{}", err);
            return Err(err);
        }

        tracing::debug!(tool = %tool.name(), kind = tool.kind().label(), "Registered tool");
        self.tools.insert(tool.name().to_string(), tool);
        Ok(())
    }

    /// Every registered tool, in no particular order.
    pub fn get_all_tools(&self) -> impl Iterator<Item = &RegisteredTool> {
        self.tools.values()
    }

    /// Look up a tool by exact name.
    pub fn try_get_tool(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    /// Tool definitions sorted by name, for `tools/list`.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<_> = self.tools.values().map(|t| t.definition.clone()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}
