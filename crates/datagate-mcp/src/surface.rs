//! Tool surface.
//!
//! Adapts tool calls onto the exposure policy, the aggregation engine and the
//! data backend. Every call runs the same pipeline:
//!
//! 1. argument validation (`InvalidArguments`)
//! 2. exposure gate (`EntityNotFound`, `ToolDisabled`, `InvalidEntity`)
//! 3. role permission check (`PermissionDenied`)
//! 4. backend call (`DataSourceError`)
//!
//! Typed operations return `Result<_, ToolError>`; [`ToolSurface::call_tool`]
//! wraps them into a [`CallToolResult`] with the error envelope.

use crate::aggregation::{self, AggregateRequest, Record};
use crate::arguments::{self, Arguments};
use crate::backend::{EntityBackend, ReadQuery};
use crate::custom_tool::CustomTool;
use crate::error::{McpError, RegistryError};
use crate::protocol::{CallToolResult, ListToolsResponse, RequestContext};
use crate::tools::{ToolRegistry, ToolTarget};
use datagate_core::{DmlToolKind, EntityAction, EntityConfig, RuntimeConfig};
use datagate_policy::{
    DescribeEntitiesResponse, DescribeOptions, ExposurePolicy, ToolError, required_action,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Rows returned by a read, an execution or an aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordsResponse {
    pub entity: String,
    pub records: Vec<Record>,
    pub count: usize,
}

impl RecordsResponse {
    fn new(entity: &str, records: Vec<Record>) -> Self {
        Self {
            entity: entity.to_string(),
            count: records.len(),
            records,
        }
    }
}

/// A single created or updated row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordResponse {
    pub entity: String,
    pub record: Record,
}

/// Outcome of `delete_record`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteResponse {
    pub entity: String,
    pub deleted: bool,
}

/// The MCP tool surface over one configuration snapshot.
#[derive(Clone)]
pub struct ToolSurface {
    config: Arc<RuntimeConfig>,
    registry: Arc<ToolRegistry>,
    backend: Arc<dyn EntityBackend>,
}

impl ToolSurface {
    /// Build the registry for `config` and wrap it with a backend.
    pub fn new(
        config: Arc<RuntimeConfig>,
        backend: Arc<dyn EntityBackend>,
    ) -> Result<Self, RegistryError> {
        let registry = ToolRegistry::build(&config)?;
        Ok(Self::from_parts(config, Arc::new(registry), backend))
    }

    /// Assemble a surface from an already built registry.
    pub fn from_parts(
        config: Arc<RuntimeConfig>,
        registry: Arc<ToolRegistry>,
        backend: Arc<dyn EntityBackend>,
    ) -> Self {
        Self {
            config,
            registry,
            backend,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    fn policy(&self) -> ExposurePolicy<'_> {
        ExposurePolicy::new(&self.config)
    }

    /// `tools/list`: every registered tool, sorted by name.
    pub fn list_tools(&self) -> ListToolsResponse {
        ListToolsResponse {
            tools: self.registry.definitions(),
        }
    }

    /// `tools/call`: dispatch by registered tool name.
    ///
    /// Unknown tool names are a protocol error; everything a tool reports is
    /// carried inside the returned [`CallToolResult`].
    pub async fn call_tool(
        &self,
        ctx: &RequestContext,
        name: &str,
        arguments: Value,
    ) -> Result<CallToolResult, McpError> {
        let tool = self
            .registry
            .try_get_tool(name)
            .ok_or_else(|| McpError::ToolNotFound {
                name: name.to_string(),
            })?;

        tracing::debug!(tool = %name, role = %ctx.role(), "Calling tool");

        let args = match arguments::as_object(arguments) {
            Ok(args) => args,
            Err(err) => return Ok(CallToolResult::error(&err)),
        };

        let result = match &tool.target {
            ToolTarget::BuiltIn(kind) => match kind {
                DmlToolKind::DescribeEntities => respond(self.describe_entities(ctx, &args))?,
                DmlToolKind::ReadRecords => respond(self.read_records(ctx, &args).await)?,
                DmlToolKind::CreateRecord => respond(self.create_record(ctx, &args).await)?,
                DmlToolKind::UpdateRecord => respond(self.update_record(ctx, &args).await)?,
                DmlToolKind::DeleteRecord => respond(self.delete_record(ctx, &args).await)?,
                DmlToolKind::ExecuteEntity => respond(self.execute_entity(ctx, &args).await)?,
                DmlToolKind::AggregateRecords => {
                    respond(self.aggregate_records(ctx, &args).await)?
                }
            },
            ToolTarget::Custom(custom) => respond(self.call_custom_tool(ctx, custom, &args).await)?,
        };

        if let Some(error_type) = result.error_type() {
            tracing::info!(tool = %name, error = %error_type, "Tool call failed");
        }
        Ok(result)
    }

    // =========================================================================
    // Built-in tools
    // =========================================================================

    /// `describe_entities`: the entities visible to the DML tools.
    pub fn describe_entities(
        &self,
        ctx: &RequestContext,
        args: &Arguments,
    ) -> Result<DescribeEntitiesResponse, ToolError> {
        let options: DescribeOptions = serde_json::from_value(Value::Object(args.clone()))
            .map_err(|e| {
                ToolError::invalid_arguments(format!("Invalid describe_entities arguments: {}", e))
            })?;
        self.policy().describe_entities(ctx.role(), &options)
    }

    /// `read_records`: rows of a table or view.
    pub async fn read_records(
        &self,
        ctx: &RequestContext,
        args: &Arguments,
    ) -> Result<RecordsResponse, ToolError> {
        let entity_name = arguments::required_str(args, "entity")?;
        let query = ReadQuery {
            select: arguments::string_list(args, "select")?,
            filter: arguments::optional_object(args, "filter")?
                .cloned()
                .unwrap_or_default(),
            order_by: arguments::string_list(args, "orderby")?,
            first: arguments::positive_int(args, "first")?,
        };

        let entity = self.authorize(ctx, entity_name, DmlToolKind::ReadRecords)?;
        let records = self
            .backend
            .read_records(&entity.source, &query)
            .await
            .map_err(backend_error)?;

        Ok(RecordsResponse::new(entity_name, records))
    }

    /// `create_record`: insert one row.
    pub async fn create_record(
        &self,
        ctx: &RequestContext,
        args: &Arguments,
    ) -> Result<RecordResponse, ToolError> {
        let entity_name = arguments::required_str(args, "entity")?;
        let data = arguments::required_object(args, "data")?;
        if data.is_empty() {
            return Err(ToolError::invalid_arguments(
                "Argument 'data' must contain at least one field",
            ));
        }

        let entity = self.authorize(ctx, entity_name, DmlToolKind::CreateRecord)?;
        let record = self
            .backend
            .create_record(&entity.source, data)
            .await
            .map_err(backend_error)?;

        tracing::debug!(entity = %entity_name, "Created record");
        Ok(RecordResponse {
            entity: entity_name.to_string(),
            record,
        })
    }

    /// `update_record`: change one row identified by its key fields.
    pub async fn update_record(
        &self,
        ctx: &RequestContext,
        args: &Arguments,
    ) -> Result<RecordResponse, ToolError> {
        let entity_name = arguments::required_str(args, "entity")?;
        let keys = arguments::required_object(args, "keys")?;
        let fields = arguments::required_object(args, "fields")?;
        if fields.is_empty() {
            return Err(ToolError::invalid_arguments(
                "Argument 'fields' must contain at least one field",
            ));
        }

        let entity = self.authorize(ctx, entity_name, DmlToolKind::UpdateRecord)?;
        check_keys(entity_name, entity, keys)?;

        let record = self
            .backend
            .update_record(&entity.source, keys, fields)
            .await
            .map_err(backend_error)?
            .ok_or_else(|| no_matching_record(entity_name, keys))?;

        Ok(RecordResponse {
            entity: entity_name.to_string(),
            record,
        })
    }

    /// `delete_record`: remove one row identified by its key fields.
    pub async fn delete_record(
        &self,
        ctx: &RequestContext,
        args: &Arguments,
    ) -> Result<DeleteResponse, ToolError> {
        let entity_name = arguments::required_str(args, "entity")?;
        let keys = arguments::required_object(args, "keys")?;

        let entity = self.authorize(ctx, entity_name, DmlToolKind::DeleteRecord)?;
        check_keys(entity_name, entity, keys)?;

        let deleted = self
            .backend
            .delete_record(&entity.source, keys)
            .await
            .map_err(backend_error)?;
        if !deleted {
            return Err(no_matching_record(entity_name, keys));
        }

        Ok(DeleteResponse {
            entity: entity_name.to_string(),
            deleted,
        })
    }

    /// `execute_entity`: run a stored procedure through the generic tool.
    pub async fn execute_entity(
        &self,
        ctx: &RequestContext,
        args: &Arguments,
    ) -> Result<RecordsResponse, ToolError> {
        let entity_name = arguments::required_str(args, "entity")?;
        let supplied = arguments::optional_object(args, "parameters")?;

        let entity = self.authorize(ctx, entity_name, DmlToolKind::ExecuteEntity)?;
        let parameters = arguments::bind_parameters(&entity.source.parameters(), supplied)?;

        let records = self
            .backend
            .execute_entity(&entity.source, &parameters)
            .await
            .map_err(backend_error)?;

        Ok(RecordsResponse::new(entity_name, records))
    }

    /// `aggregate_records`: read rows, then aggregate them in memory.
    pub async fn aggregate_records(
        &self,
        ctx: &RequestContext,
        args: &Arguments,
    ) -> Result<RecordsResponse, ToolError> {
        let request = AggregateRequest::parse(args)?;

        let entity = self.authorize(ctx, &request.entity, DmlToolKind::AggregateRecords)?;
        let query = ReadQuery {
            filter: request.filter.clone(),
            ..ReadQuery::default()
        };
        let records = self
            .backend
            .read_records(&entity.source, &query)
            .await
            .map_err(backend_error)?;

        let rows = aggregation::aggregate(&records, &request.spec);
        Ok(RecordsResponse::new(&request.entity, rows))
    }

    // =========================================================================
    // Custom tools
    // =========================================================================

    /// Run a stored procedure through its dedicated tool. The arguments are
    /// the procedure parameters.
    pub async fn call_custom_tool(
        &self,
        ctx: &RequestContext,
        tool: &CustomTool,
        args: &Arguments,
    ) -> Result<RecordsResponse, ToolError> {
        let policy = self.policy();
        let entity = policy.check_custom_tool(&tool.entity_name)?;
        policy.check_permission(ctx.role(), &tool.entity_name, entity, EntityAction::Execute)?;

        let parameters = arguments::bind_parameters(&tool.parameters, Some(args))?;
        let records = self
            .backend
            .execute_entity(&entity.source, &parameters)
            .await
            .map_err(backend_error)?;

        Ok(RecordsResponse::new(&tool.entity_name, records))
    }

    /// Exposure gate, source-type check and permission check for a DML tool.
    fn authorize(
        &self,
        ctx: &RequestContext,
        entity_name: &str,
        kind: DmlToolKind,
    ) -> Result<&EntityConfig, ToolError> {
        let policy = self.policy();
        let entity = policy.check_dml(entity_name, kind)?;
        policy.check_source_type(entity_name, entity, kind)?;
        if let Some(action) = required_action(kind) {
            policy.check_permission(ctx.role(), entity_name, entity, action)?;
        }
        Ok(entity)
    }
}

fn respond<T: Serialize>(outcome: Result<T, ToolError>) -> Result<CallToolResult, McpError> {
    let outcome = match outcome {
        Ok(value) => Ok(serde_json::to_value(value)?),
        Err(err) => Err(err),
    };
    Ok(CallToolResult::from_outcome(outcome))
}

fn backend_error(err: anyhow::Error) -> ToolError {
    tracing::warn!(error = %format!("{:#}", err), "Backend call failed");
    ToolError::data_source(format!("{:#}", err))
}

/// Keys must name the entity's key fields exactly, when it declares them.
fn check_keys(entity_name: &str, entity: &EntityConfig, keys: &Arguments) -> Result<(), ToolError> {
    if keys.is_empty() {
        return Err(ToolError::invalid_arguments(
            "Argument 'keys' must contain at least one key field",
        ));
    }

    let key_fields = &entity.source.key_fields;
    if key_fields.is_empty() {
        return Ok(());
    }
    if let Some(missing) = key_fields.iter().find(|f| !keys.contains_key(f.as_str())) {
        return Err(ToolError::invalid_arguments(format!(
            "Missing key field '{}' for entity '{}'",
            missing, entity_name
        )));
    }
    if let Some(extra) = keys.keys().find(|k| !key_fields.iter().any(|f| f == *k)) {
        return Err(ToolError::invalid_arguments(format!(
            "Field '{}' is not a key field of entity '{}'. Key fields: {}",
            extra,
            entity_name,
            key_fields.join(", ")
        )));
    }
    Ok(())
}

fn no_matching_record(entity_name: &str, keys: &Arguments) -> ToolError {
    ToolError::invalid_arguments(format!(
        "No record of entity '{}' matches keys {}",
        entity_name,
        Value::Object(keys.clone())
    ))
}
