//! `datagate aggregate` - run the aggregation engine over a JSON file.
//!
//! The flags are turned into `aggregate_records` arguments so validation
//! matches what MCP clients get.

use anyhow::{Context, Result};
use datagate_mcp::{AggregateRequest, Record, aggregate};
use serde_json::{Map, Value, json};
use std::fs;
use std::path::PathBuf;

pub struct AggregateArgs {
    pub records: PathBuf,
    pub function: String,
    pub field: String,
    pub group_by: Vec<String>,
    pub distinct: bool,
    pub having: Vec<String>,
    pub order: Option<String>,
    pub first: Option<usize>,
}

pub fn run(args: AggregateArgs) -> Result<()> {
    let content = fs::read_to_string(&args.records)
        .with_context(|| format!("Failed to read records from {:?}", args.records))?;
    let records: Vec<Record> = serde_json::from_str(&content)
        .with_context(|| format!("{:?} must contain a JSON array of objects", args.records))?;

    let request = AggregateRequest::parse(&to_arguments(&args)?)
        .map_err(|e| anyhow::anyhow!("{}", e.message))?;

    let rows = aggregate(&records, &request.spec);
    tracing::info!(rows = records.len(), groups = rows.len(), "Aggregation complete");
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

/// Build `aggregate_records` arguments from the CLI flags.
fn to_arguments(args: &AggregateArgs) -> Result<Map<String, Value>> {
    let entity = args
        .records
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "records".to_string());

    let mut map = Map::new();
    map.insert("entity".to_string(), json!(entity));
    map.insert("function".to_string(), json!(args.function));
    map.insert("field".to_string(), json!(args.field));
    map.insert("distinct".to_string(), json!(args.distinct));
    if !args.group_by.is_empty() {
        map.insert("groupby".to_string(), json!(args.group_by));
    }
    if let Some(order) = &args.order {
        map.insert("orderby".to_string(), json!(order));
    }
    if let Some(first) = args.first {
        map.insert("first".to_string(), json!(first));
    }
    if !args.having.is_empty() {
        map.insert("having".to_string(), Value::Object(parse_having(&args.having)?));
    }
    Ok(map)
}

/// `gt=10` -> `{"gt": 10}`, `in=1,2` -> `{"in": [1, 2]}`.
fn parse_having(conditions: &[String]) -> Result<Map<String, Value>> {
    let mut having = Map::new();
    for condition in conditions {
        let (op, value) = condition
            .split_once('=')
            .with_context(|| format!("Invalid having condition '{}', expected op=value", condition))?;
        let op = op.trim();
        let value = if op == "in" {
            Value::Array(value.split(',').map(|v| number_or_string(v.trim())).collect())
        } else {
            number_or_string(value.trim())
        };
        having.insert(op.to_string(), value);
    }
    Ok(having)
}

fn number_or_string(raw: &str) -> Value {
    raw.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| json!(raw))
}
