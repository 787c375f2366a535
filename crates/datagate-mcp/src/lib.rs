//! # datagate-mcp
//!
//! The MCP tool layer of datagate: which tools exist, how they are called,
//! and the in-memory aggregation behind `aggregate_records`.
//!
//! ## Architecture
//!
//! ```text
//! MCP client
//!       │
//!       │ tools/list, tools/call
//!       ▼
//! ┌──────────────────────┐
//! │  ToolSurface         │
//! │  1. Look up tool     │  ← ToolRegistry (built once at startup)
//! │  2. Validate args    │
//! │  3. Exposure gate    │  ← datagate-policy
//! │  4. Role permission  │  ← datagate-policy
//! │  5. Fetch / execute  │  ← EntityBackend
//! │  6. Aggregate        │  ← aggregation
//! │  7. Return JSON      │
//! └──────────┬───────────┘
//!            ▼
//!      Data backend
//! ```
//!
//! ## Tools
//!
//! | Tool | Registered when |
//! |------|-----------------|
//! | `describe_entities`, `read_records`, `create_record`, `update_record`, `delete_record`, `execute_entity`, `aggregate_records` | MCP enabled and the runtime `dml-tools` flag for the tool is on |
//! | `<snake_case entity name>` | Stored procedure with `custom-tool: true` |
//!
//! Tool names are unique across both groups; a collision fails
//! [`ToolRegistry::build`].

pub mod aggregation;
pub mod arguments;
pub mod backend;
pub mod builtin;
pub mod custom_tool;
pub mod error;
pub mod protocol;
pub mod surface;
pub mod tools;

pub use aggregation::{
    AggregateFunction, AggregateRequest, AggregateSpec, Comparator, HavingFilter, Record,
    SortDirection, aggregate, compute_alias,
};
pub use arguments::Arguments;
pub use backend::{EntityBackend, ReadQuery};
pub use custom_tool::CustomTool;
pub use error::{McpError, RegistryError};
pub use protocol::{
    CallToolResult, ListToolsResponse, RequestContext, ToolAnnotations, ToolContent,
    ToolDefinition,
};
pub use surface::{DeleteResponse, RecordResponse, RecordsResponse, ToolSurface};
pub use tools::{RegisteredTool, ToolKind, ToolRegistry, ToolTarget};
