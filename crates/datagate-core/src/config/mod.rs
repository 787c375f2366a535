//! Configuration types for the datagate entity gateway.
//!
//! Configuration is loaded from a single YAML or JSON file and resolved into
//! a [`RuntimeConfig`]: the entity map plus the `runtime` block.
//!
//! ```yaml
//! runtime:
//!   mcp:
//!     enabled: true
//!     dml-tools:
//!       delete-record: false
//! entities:
//!   Book:
//!     source: { object: dbo.books, type: table, key-fields: [id] }
//!     permissions:
//!       - role: anonymous
//!         actions: [read]
//!   GetBook:
//!     source: { object: dbo.get_book, type: stored-procedure }
//!     mcp:
//!       custom-tool: true
//!       dml-tools: false
//! ```

pub mod entity;
pub mod mcp;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use entity::{
    EntityAction, EntityConfig, EntityMap, EntityMcpOptions, EntityMcpSetting, EntityPermission,
    EntitySource, EntitySourceType, OrderedMap, ParameterDefinition, ParameterList,
};
pub use mcp::{DmlToolFlags, DmlToolKind, DmlToolsConfig, McpRuntimeConfig};

/// Complete runtime configuration loaded from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Runtime options.
    #[serde(default)]
    pub runtime: RuntimeOptions,

    /// Entities keyed by name, in configuration order.
    #[serde(default)]
    pub entities: EntityMap,
}

/// The `runtime` block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeOptions {
    #[serde(default)]
    pub mcp: McpRuntimeConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RuntimeConfig {
    /// Load configuration from a YAML or JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML (or JSON) content and validate it.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from entities with default runtime options.
    pub fn with_entities<I, K>(entities: I) -> Self
    where
        I: IntoIterator<Item = (K, EntityConfig)>,
        K: Into<String>,
    {
        Self {
            runtime: RuntimeOptions::default(),
            entities: entities.into_iter().collect(),
        }
    }

    /// Replace the runtime-level DML tool settings.
    pub fn with_dml_tools(mut self, dml_tools: DmlToolsConfig) -> Self {
        self.runtime.mcp.dml_tools = dml_tools;
        self
    }

    /// Check contract violations that must be caught at load time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, entity) in self.entities.iter() {
            if name.trim().is_empty() {
                return Err(ConfigError::Config(
                    "entity names must not be empty".to_string(),
                ));
            }
            if entity.source.object.trim().is_empty() {
                return Err(ConfigError::Config(format!(
                    "entity '{}' has an empty source object",
                    name
                )));
            }
            for perm in &entity.permissions {
                if perm.role.trim().is_empty() {
                    return Err(ConfigError::Config(format!(
                        "entity '{}' has a permission entry with an empty role",
                        name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Get an entity by name (exact match).
    pub fn entity(&self, name: &str) -> Option<&EntityConfig> {
        self.entities.get(name)
    }

    /// Iterate entities in configuration order.
    pub fn entities(&self) -> impl Iterator<Item = (&str, &EntityConfig)> {
        self.entities.iter()
    }

    /// MCP runtime settings.
    pub fn mcp(&self) -> &McpRuntimeConfig {
        &self.runtime.mcp
    }
}
