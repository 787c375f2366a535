//! Tool argument extraction.
//!
//! Every helper maps a malformed argument to an `InvalidArguments`
//! [`ToolError`] naming the argument, so validation failures surface before
//! any policy check or data access runs.

use datagate_core::ParameterDefinition;
use datagate_policy::ToolError;
use serde_json::{Map, Value};

/// Tool call arguments: a JSON object.
pub type Arguments = Map<String, Value>;

/// Normalize raw call arguments. `null` means no arguments.
pub fn as_object(arguments: Value) -> Result<Arguments, ToolError> {
    match arguments {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(ToolError::invalid_arguments(format!(
            "Arguments must be a JSON object, got {}",
            type_name(&other)
        ))),
    }
}

/// A required, non-blank string argument.
pub fn required_str<'a>(args: &'a Arguments, name: &str) -> Result<&'a str, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Err(ToolError::missing_argument(name)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ToolError::missing_argument(name)),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(wrong_type(name, "a string", other)),
    }
}

/// An optional string argument.
pub fn optional_str<'a>(args: &'a Arguments, name: &str) -> Result<Option<&'a str>, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(wrong_type(name, "a string", other)),
    }
}

/// An optional boolean argument, `false` when absent.
pub fn flag(args: &Arguments, name: &str) -> Result<bool, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(wrong_type(name, "a boolean", other)),
    }
}

/// A required object argument.
pub fn required_object<'a>(args: &'a Arguments, name: &str) -> Result<&'a Arguments, ToolError> {
    optional_object(args, name)?.ok_or_else(|| ToolError::missing_argument(name))
}

/// An optional object argument.
pub fn optional_object<'a>(
    args: &'a Arguments,
    name: &str,
) -> Result<Option<&'a Arguments>, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(wrong_type(name, "an object", other)),
    }
}

/// An optional list of strings. A single string is accepted as a one-item list.
pub fn string_list(args: &Arguments, name: &str) -> Result<Vec<String>, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(ToolError::invalid_arguments(format!(
                    "Argument '{}' must contain only strings, found {}",
                    name,
                    type_name(other)
                ))),
            })
            .collect(),
        Some(other) => Err(wrong_type(name, "an array of strings", other)),
    }
}

/// An optional positive integer.
pub fn positive_int(args: &Arguments, name: &str) -> Result<Option<usize>, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(v) if v > 0 => Ok(Some(usize::try_from(v).unwrap_or(usize::MAX))),
            _ => Err(ToolError::invalid_arguments(format!(
                "Argument '{}' must be a positive integer, got {}",
                name, n
            ))),
        },
        Some(other) => Err(wrong_type(name, "a positive integer", other)),
    }
}

/// Bind stored-procedure parameters against their declarations.
///
/// With no declared parameters the supplied values pass through unchanged.
/// Otherwise unknown names are rejected, missing required parameters are
/// reported, and declared defaults fill the gaps.
pub fn bind_parameters(
    declared: &[ParameterDefinition],
    supplied: Option<&Arguments>,
) -> Result<Arguments, ToolError> {
    let supplied = supplied.cloned().unwrap_or_default();
    if declared.is_empty() {
        return Ok(supplied);
    }

    if let Some(unknown) = supplied
        .keys()
        .find(|key| !declared.iter().any(|p| &p.name == *key))
    {
        let expected: Vec<&str> = declared.iter().map(|p| p.name.as_str()).collect();
        return Err(ToolError::invalid_arguments(format!(
            "Unknown parameter '{}'. Expected one of: {}",
            unknown,
            expected.join(", ")
        )));
    }

    let mut bound = Map::new();
    for param in declared {
        match supplied.get(&param.name) {
            Some(value) if !value.is_null() => {
                bound.insert(param.name.clone(), value.clone());
            }
            _ => match &param.default {
                Some(default) => {
                    bound.insert(param.name.clone(), default.clone());
                }
                None if param.required => {
                    return Err(ToolError::invalid_arguments(format!(
                        "Missing required parameter '{}'",
                        param.name
                    )));
                }
                None => {}
            },
        }
    }
    Ok(bound)
}

fn wrong_type(name: &str, expected: &str, found: &Value) -> ToolError {
    ToolError::invalid_arguments(format!(
        "Argument '{}' must be {}, got {}",
        name,
        expected,
        type_name(found)
    ))
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
