//! Custom tools: one dedicated MCP tool per stored procedure.
//!
//! A stored procedure with `custom-tool: true` is exposed under a snake_case
//! name derived from its entity name (`GetBookByID` -> `get_book_by_id`),
//! with an input schema built from its declared parameters.

use crate::error::RegistryError;
use crate::protocol::{ToolAnnotations, ToolDefinition};
use datagate_core::{EntityConfig, ParameterDefinition};
use datagate_policy::tool_name_from_entity_name;
use serde_json::{Map, Value, json};

/// A stored procedure exposed as its own tool. Data only.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomTool {
    /// Registered tool name.
    pub tool_name: String,
    /// Configured entity name the tool executes.
    pub entity_name: String,
    pub description: Option<String>,
    pub parameters: Vec<ParameterDefinition>,
}

impl CustomTool {
    /// Build the custom tool for a stored-procedure entity.
    ///
    /// Fails on a blank entity name or a non-stored-procedure entity; both
    /// are configuration mistakes caught while the registry is built.
    pub fn new(entity_name: &str, entity: &EntityConfig) -> Result<Self, RegistryError> {
        if entity_name.trim().is_empty() {
            return Err(RegistryError::EmptyEntityName);
        }

        let source_type = entity.source_type();
        if !source_type.is_stored_procedure() {
            return Err(RegistryError::NotStoredProcedure {
                entity: entity_name.to_string(),
                source_type: source_type.to_string(),
            });
        }

        let tool = Self {
            tool_name: tool_name_from_entity_name(entity_name),
            entity_name: entity_name.to_string(),
            description: entity.description.clone(),
            parameters: entity.source.parameters(),
        };

        tracing::debug!(
            entity = %entity_name,
            tool = %tool.tool_name,
            parameters = tool.parameters.len(),
            "Built custom tool"
        );

        Ok(tool)
    }

    /// JSON schema for the tool arguments: one property per parameter.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            let mut prop = Map::new();
            if let Some(ty) = param.default.as_ref().and_then(json_schema_type) {
                prop.insert("type".to_string(), json!(ty));
            }
            if let Some(default) = &param.default {
                prop.insert("default".to_string(), default.clone());
            }
            let description = param
                .description
                .clone()
                .unwrap_or_else(|| format!("Parameter {}", param.name));
            prop.insert("description".to_string(), json!(description));
            properties.insert(param.name.clone(), Value::Object(prop));

            if param.required && param.default.is_none() {
                required.push(param.name.clone());
            }
        }

        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }

    /// The MCP definition for `tools/list`.
    pub fn definition(&self) -> ToolDefinition {
        let description = self
            .description
            .clone()
            .unwrap_or_else(|| format!("Execute the {} stored procedure", self.entity_name));

        ToolDefinition {
            name: self.tool_name.clone(),
            description: Some(description),
            input_schema: self.input_schema(),
            annotations: Some(ToolAnnotations::write(false)),
        }
    }
}

fn json_schema_type(value: &Value) -> Option<&'static str> {
    match value {
        Value::Bool(_) => Some("boolean"),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some("integer"),
        Value::Number(_) => Some("number"),
        Value::String(_) => Some("string"),
        Value::Array(_) => Some("array"),
        Value::Object(_) => Some("object"),
        Value::Null => None,
    }
}
