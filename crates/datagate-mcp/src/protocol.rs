//! MCP protocol types.
//!
//! Only the payload shapes the tool surface produces: tool definitions for
//! `tools/list` and results for `tools/call`. Request framing belongs to the
//! transport.

use datagate_policy::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// MCP tool definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<ToolAnnotations>,
}

/// Tool annotations (MCP behaviour hints).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ToolAnnotations {
    #[serde(rename = "readOnlyHint", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(rename = "destructiveHint", skip_serializing_if = "Option::is_none")]
    pub destructive: Option<bool>,
    #[serde(rename = "idempotentHint", skip_serializing_if = "Option::is_none")]
    pub idempotent: Option<bool>,
}

impl ToolAnnotations {
    pub fn read_only() -> Self {
        Self {
            read_only: Some(true),
            destructive: Some(false),
            idempotent: Some(true),
        }
    }

    pub fn write(destructive: bool) -> Self {
        Self {
            read_only: Some(false),
            destructive: Some(destructive),
            idempotent: Some(false),
        }
    }
}

/// List tools response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResponse {
    pub tools: Vec<ToolDefinition>,
}

/// Tool response content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

/// Call tool response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "structuredContent")]
    pub structured_content: Value,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl CallToolResult {
    /// A successful result carrying a JSON payload.
    pub fn success(value: Value) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: value.to_string(),
            }],
            structured_content: value,
            is_error: false,
        }
    }

    /// A failed result carrying the `{ error: { type, message } }` envelope.
    pub fn error(err: &ToolError) -> Self {
        let envelope = err.to_envelope();
        Self {
            content: vec![ToolContent::Text {
                text: envelope.to_string(),
            }],
            structured_content: envelope,
            is_error: true,
        }
    }

    /// Build from a tool outcome.
    pub fn from_outcome(outcome: Result<Value, ToolError>) -> Self {
        match outcome {
            Ok(value) => Self::success(value),
            Err(err) => Self::error(&err),
        }
    }

    /// The error `type` string, if this is an error result.
    pub fn error_type(&self) -> Option<&str> {
        if !self.is_error {
            return None;
        }
        self.structured_content
            .get("error")
            .and_then(|e| e.get("type"))
            .and_then(Value::as_str)
    }
}

/// Authentication context the transport resolved for a request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Role from the authenticated principal.
    pub role: Option<String>,
}

impl RequestContext {
    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
        }
    }

    /// The role, defaulting to `anonymous`.
    pub fn role(&self) -> &str {
        self.role
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(datagate_policy::ANONYMOUS_ROLE)
    }
}
