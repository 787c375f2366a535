//! Configuration types shared across all datagate crates.
//!
//! The configuration model is a read-only snapshot: entities with their
//! database sources and exposure flags, plus the runtime MCP block that
//! controls which built-in tools exist. Policy decisions live in
//! `datagate-policy`; this crate only carries data and loading.

pub mod config;

pub use config::{
    ConfigError, DmlToolFlags, DmlToolKind, DmlToolsConfig, EntityAction, EntityConfig,
    EntityMap, EntityMcpOptions, EntityMcpSetting, EntityPermission, EntitySource,
    EntitySourceType, McpRuntimeConfig, OrderedMap, ParameterDefinition, ParameterList,
    RuntimeConfig, RuntimeOptions,
};
