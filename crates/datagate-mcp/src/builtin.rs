//! Built-in DML tool definitions.
//!
//! | Tool | Arguments |
//! |------|-----------|
//! | `describe_entities` | `nameOnly?`, `entities?` |
//! | `read_records` | `entity`, `select?`, `filter?`, `orderby?`, `first?` |
//! | `create_record` | `entity`, `data` |
//! | `update_record` | `entity`, `keys`, `fields` |
//! | `delete_record` | `entity`, `keys` |
//! | `execute_entity` | `entity`, `parameters?` |
//! | `aggregate_records` | `entity`, `function`, `field`, `distinct?`, `filter?`, `groupby?`, `having?`, `orderby?`, `first?` |

use crate::protocol::{ToolAnnotations, ToolDefinition};
use datagate_core::DmlToolKind;
use serde_json::{Value, json};

fn entity_property() -> Value {
    json!({
        "type": "string",
        "description": "Name of the configured entity, as listed by describe_entities"
    })
}

fn filter_property() -> Value {
    json!({
        "type": "object",
        "description": "Field equality filter, e.g. {\"category\": \"fiction\"}",
        "additionalProperties": true
    })
}

fn first_property() -> Value {
    json!({
        "type": "integer",
        "minimum": 1,
        "description": "Maximum number of rows to return"
    })
}

/// The MCP definition of a built-in tool.
pub fn definition(kind: DmlToolKind) -> ToolDefinition {
    let (description, input_schema) = match kind {
        DmlToolKind::DescribeEntities => (
            "List the entities available to the DML tools, with their fields, \
             parameters and the actions permitted for your role.",
            json!({
                "type": "object",
                "properties": {
                    "nameOnly": {
                        "type": "boolean",
                        "default": false,
                        "description": "Return only entity names and descriptions"
                    },
                    "entities": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Restrict the result to these entity names"
                    }
                }
            }),
        ),
        DmlToolKind::ReadRecords => (
            "Read records from a table or view.",
            json!({
                "type": "object",
                "properties": {
                    "entity": entity_property(),
                    "select": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Fields to return; all fields when omitted"
                    },
                    "filter": filter_property(),
                    "orderby": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Sort keys such as \"title asc\" or \"price desc\""
                    },
                    "first": first_property()
                },
                "required": ["entity"]
            }),
        ),
        DmlToolKind::CreateRecord => (
            "Create a record in a table or view.",
            json!({
                "type": "object",
                "properties": {
                    "entity": entity_property(),
                    "data": {
                        "type": "object",
                        "description": "Field values of the new record"
                    }
                },
                "required": ["entity", "data"]
            }),
        ),
        DmlToolKind::UpdateRecord => (
            "Update a record identified by its key fields.",
            json!({
                "type": "object",
                "properties": {
                    "entity": entity_property(),
                    "keys": {
                        "type": "object",
                        "description": "Key field values identifying the record"
                    },
                    "fields": {
                        "type": "object",
                        "description": "Field values to change"
                    }
                },
                "required": ["entity", "keys", "fields"]
            }),
        ),
        DmlToolKind::DeleteRecord => (
            "Delete a record identified by its key fields.",
            json!({
                "type": "object",
                "properties": {
                    "entity": entity_property(),
                    "keys": {
                        "type": "object",
                        "description": "Key field values identifying the record"
                    }
                },
                "required": ["entity", "keys"]
            }),
        ),
        DmlToolKind::ExecuteEntity => (
            "Execute a stored procedure entity.",
            json!({
                "type": "object",
                "properties": {
                    "entity": entity_property(),
                    "parameters": {
                        "type": "object",
                        "description": "Stored procedure parameter values"
                    }
                },
                "required": ["entity"]
            }),
        ),
        DmlToolKind::AggregateRecords => (
            "Compute count, avg, sum, min or max over an entity's records, \
             optionally grouped, filtered after grouping and sorted.",
            json!({
                "type": "object",
                "properties": {
                    "entity": entity_property(),
                    "function": {
                        "type": "string",
                        "enum": ["count", "avg", "sum", "min", "max"],
                        "description": "Aggregate function"
                    },
                    "field": {
                        "type": "string",
                        "description": "Field to aggregate; \"*\" is allowed with count"
                    },
                    "distinct": {
                        "type": "boolean",
                        "default": false,
                        "description": "Aggregate distinct values only"
                    },
                    "filter": filter_property(),
                    "groupby": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Fields to group by"
                    },
                    "having": {
                        "type": "object",
                        "description": "Filter groups by their aggregate value",
                        "properties": {
                            "gt": { "type": "number" },
                            "gte": { "type": "number" },
                            "lt": { "type": "number" },
                            "lte": { "type": "number" },
                            "eq": { "type": "number" },
                            "neq": { "type": "number" },
                            "in": { "type": "array", "items": { "type": "number" } }
                        },
                        "additionalProperties": false
                    },
                    "orderby": {
                        "type": "string",
                        "enum": ["asc", "desc"],
                        "default": "desc",
                        "description": "Sort groups by aggregate value"
                    },
                    "first": first_property()
                },
                "required": ["entity", "function", "field"]
            }),
        ),
    };

    let annotations = match kind {
        k if k.is_read_only() => ToolAnnotations::read_only(),
        DmlToolKind::DeleteRecord => ToolAnnotations::write(true),
        _ => ToolAnnotations::write(false),
    };

    ToolDefinition {
        name: kind.tool_name().to_string(),
        description: Some(description.to_string()),
        input_schema,
        annotations: Some(annotations),
    }
}
