//! MCP runtime configuration.
//!
//! This module defines the `runtime.mcp` block: whether the MCP endpoint is
//! served and which built-in DML tools are registered. `dml-tools` accepts
//! either a boolean (all tools on or off) or an object with one flag per tool.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The built-in DML tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DmlToolKind {
    DescribeEntities,
    ReadRecords,
    CreateRecord,
    UpdateRecord,
    DeleteRecord,
    ExecuteEntity,
    AggregateRecords,
}

impl DmlToolKind {
    /// Every built-in tool, in registration order.
    pub const ALL: [DmlToolKind; 7] = [
        DmlToolKind::DescribeEntities,
        DmlToolKind::ReadRecords,
        DmlToolKind::CreateRecord,
        DmlToolKind::UpdateRecord,
        DmlToolKind::DeleteRecord,
        DmlToolKind::ExecuteEntity,
        DmlToolKind::AggregateRecords,
    ];

    /// The MCP tool name this kind is registered under.
    pub const fn tool_name(&self) -> &'static str {
        match self {
            DmlToolKind::DescribeEntities => "describe_entities",
            DmlToolKind::ReadRecords => "read_records",
            DmlToolKind::CreateRecord => "create_record",
            DmlToolKind::UpdateRecord => "update_record",
            DmlToolKind::DeleteRecord => "delete_record",
            DmlToolKind::ExecuteEntity => "execute_entity",
            DmlToolKind::AggregateRecords => "aggregate_records",
        }
    }

    /// The key under `runtime.mcp.dml-tools` that controls this tool.
    pub const fn config_key(&self) -> &'static str {
        match self {
            DmlToolKind::DescribeEntities => "describe-entities",
            DmlToolKind::ReadRecords => "read-records",
            DmlToolKind::CreateRecord => "create-record",
            DmlToolKind::UpdateRecord => "update-record",
            DmlToolKind::DeleteRecord => "delete-record",
            DmlToolKind::ExecuteEntity => "execute-entity",
            DmlToolKind::AggregateRecords => "aggregate-records",
        }
    }

    /// Whether the tool only reads data.
    pub const fn is_read_only(&self) -> bool {
        matches!(
            self,
            DmlToolKind::DescribeEntities | DmlToolKind::ReadRecords | DmlToolKind::AggregateRecords
        )
    }
}

impl fmt::Display for DmlToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tool_name())
    }
}

/// Per-tool flags. Every flag absent from the object defaults to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DmlToolFlags {
    #[serde(default = "default_true", alias = "describeEntities", alias = "describe_entities")]
    pub describe_entities: bool,

    #[serde(default = "default_true", alias = "readRecords", alias = "read_records")]
    pub read_records: bool,

    #[serde(default = "default_true", alias = "createRecord", alias = "create_record")]
    pub create_record: bool,

    #[serde(default = "default_true", alias = "updateRecord", alias = "update_record")]
    pub update_record: bool,

    #[serde(default = "default_true", alias = "deleteRecord", alias = "delete_record")]
    pub delete_record: bool,

    #[serde(default = "default_true", alias = "executeEntity", alias = "execute_entity")]
    pub execute_entity: bool,

    #[serde(default = "default_true", alias = "aggregateRecords", alias = "aggregate_records")]
    pub aggregate_records: bool,
}

impl Default for DmlToolFlags {
    fn default() -> Self {
        Self::uniform(true)
    }
}

impl DmlToolFlags {
    /// All flags set to the same value.
    pub const fn uniform(enabled: bool) -> Self {
        Self {
            describe_entities: enabled,
            read_records: enabled,
            create_record: enabled,
            update_record: enabled,
            delete_record: enabled,
            execute_entity: enabled,
            aggregate_records: enabled,
        }
    }

    /// Flag value for one tool.
    pub const fn get(&self, kind: DmlToolKind) -> bool {
        match kind {
            DmlToolKind::DescribeEntities => self.describe_entities,
            DmlToolKind::ReadRecords => self.read_records,
            DmlToolKind::CreateRecord => self.create_record,
            DmlToolKind::UpdateRecord => self.update_record,
            DmlToolKind::DeleteRecord => self.delete_record,
            DmlToolKind::ExecuteEntity => self.execute_entity,
            DmlToolKind::AggregateRecords => self.aggregate_records,
        }
    }

    /// Set the flag for one tool.
    pub fn set(&mut self, kind: DmlToolKind, enabled: bool) {
        let slot = match kind {
            DmlToolKind::DescribeEntities => &mut self.describe_entities,
            DmlToolKind::ReadRecords => &mut self.read_records,
            DmlToolKind::CreateRecord => &mut self.create_record,
            DmlToolKind::UpdateRecord => &mut self.update_record,
            DmlToolKind::DeleteRecord => &mut self.delete_record,
            DmlToolKind::ExecuteEntity => &mut self.execute_entity,
            DmlToolKind::AggregateRecords => &mut self.aggregate_records,
        };
        *slot = enabled;
    }
}

/// `dml-tools` can be a boolean shorthand or a per-tool object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DmlToolsConfig {
    /// `dml-tools: true|false` toggles every built-in tool.
    All(bool),
    /// `dml-tools: { read-records: false, ... }`.
    PerTool(DmlToolFlags),
}

impl Default for DmlToolsConfig {
    fn default() -> Self {
        DmlToolsConfig::All(true)
    }
}

impl DmlToolsConfig {
    /// Whether the runtime-level flag for a tool is on.
    pub const fn is_enabled(&self, kind: DmlToolKind) -> bool {
        match self {
            DmlToolsConfig::All(enabled) => *enabled,
            DmlToolsConfig::PerTool(flags) => flags.get(kind),
        }
    }

    /// Expand the shorthand into explicit flags.
    pub const fn flags(&self) -> DmlToolFlags {
        match self {
            DmlToolsConfig::All(enabled) => DmlToolFlags::uniform(*enabled),
            DmlToolsConfig::PerTool(flags) => *flags,
        }
    }
}

/// Configuration for the MCP surface (`runtime.mcp`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRuntimeConfig {
    /// Whether the MCP endpoint is served at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// HTTP path the MCP endpoint is mounted at. Accepted so gateway configs
    /// load unchanged; the transport that mounts it lives outside datagate.
    #[serde(default = "default_path")]
    pub path: String,

    /// Runtime-level DML tool flags.
    #[serde(default, rename = "dml-tools", alias = "dmlTools", alias = "dml_tools")]
    pub dml_tools: DmlToolsConfig,
}

impl Default for McpRuntimeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_path(),
            dml_tools: DmlToolsConfig::default(),
        }
    }
}

impl McpRuntimeConfig {
    /// Whether the runtime-level flag for a tool is on.
    pub fn is_tool_enabled(&self, kind: DmlToolKind) -> bool {
        self.dml_tools.is_enabled(kind)
    }
}

fn default_true() -> bool {
    true
}

fn default_path() -> String {
    "/mcp".to_string()
}
