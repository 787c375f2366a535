//! datagate exposure policy.
//!
//! Decides, for a runtime configuration, a role and an entity, whether an
//! operation is permitted and why not. Every decision is a pure function of
//! an immutable [`RuntimeConfig`](datagate_core::RuntimeConfig) snapshot, so
//! an [`ExposurePolicy`] can be built per request and shared across threads.
//!
//! - [`exposure`]: tri-state flag resolution, DML and custom-tool gating
//! - [`describe`]: the `describe_entities` filter and projections
//! - [`permissions`]: role -> action resolution with inheritance
//! - [`naming`]: entity name -> tool name conversion
//! - [`error`]: typed tool errors and the error envelope

pub mod describe;
pub mod error;
pub mod exposure;
pub mod naming;
pub mod permissions;

pub use describe::{
    DescribeEntitiesResponse, DescribeOptions, DescribedEntity, filter_for_describe_entities,
};
pub use error::{ToolError, ToolErrorKind};
pub use exposure::{
    EntityExposure, ExposurePolicy, ExposureReason, required_action, resolve_custom_tool,
    resolve_dml_tools,
};
pub use naming::tool_name_from_entity_name;
pub use permissions::{ANONYMOUS_ROLE, AUTHENTICATED_ROLE, RolePermissions, applicable_actions};
