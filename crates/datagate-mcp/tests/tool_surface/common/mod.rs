//! Shared test infrastructure for the tool surface tests.
//!
//! This module provides:
//! - An in-memory `EntityBackend` keyed by source object
//! - The bookstore configuration used across modules
//! - Helper functions for test assertions

use async_trait::async_trait;
use datagate_core::{EntitySource, RuntimeConfig};
use datagate_mcp::{
    Arguments, CallToolResult, EntityBackend, ReadQuery, Record, RequestContext, ToolSurface,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// =============================================================================
// IN-MEMORY BACKEND
// =============================================================================

/// Rows per table/view object, canned results per stored procedure, and a
/// log of every procedure call.
#[derive(Default)]
pub struct InMemoryBackend {
    tables: Mutex<HashMap<String, Vec<Record>>>,
    procedures: HashMap<String, Vec<Record>>,
    pub executions: Mutex<Vec<(String, Arguments)>>,
    fail_with: Option<String>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, object: &str, rows: Value) -> Self {
        let rows: Vec<Record> = serde_json::from_value(rows).expect("rows must be objects");
        self.tables
            .lock()
            .unwrap()
            .insert(object.to_string(), rows);
        self
    }

    pub fn with_procedure(mut self, object: &str, rows: Value) -> Self {
        let rows: Vec<Record> = serde_json::from_value(rows).expect("rows must be objects");
        self.procedures.insert(object.to_string(), rows);
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    pub fn rows(&self, object: &str) -> Vec<Record> {
        self.tables
            .lock()
            .unwrap()
            .get(object)
            .cloned()
            .unwrap_or_default()
    }

    pub fn last_execution(&self) -> Option<(String, Arguments)> {
        self.executions.lock().unwrap().last().cloned()
    }

    fn check_failure(&self) -> anyhow::Result<()> {
        match &self.fail_with {
            Some(message) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(()),
        }
    }
}

fn matches(row: &Record, filter: &Arguments) -> bool {
    filter.iter().all(|(k, v)| row.get(k) == Some(v))
}

#[async_trait]
impl EntityBackend for InMemoryBackend {
    async fn read_records(
        &self,
        source: &EntitySource,
        query: &ReadQuery,
    ) -> anyhow::Result<Vec<Record>> {
        self.check_failure()?;
        let mut rows: Vec<Record> = self
            .rows(&source.object)
            .into_iter()
            .filter(|row| matches(row, &query.filter))
            .collect();

        if let Some(spec) = query.order_by.first() {
            let mut parts = spec.split_whitespace();
            let field = parts.next().unwrap_or_default().to_string();
            let desc = parts.next().is_some_and(|d| d.eq_ignore_ascii_case("desc"));
            rows.sort_by(|a, b| {
                let ord = a.get(&field).map(Value::to_string).cmp(&b.get(&field).map(Value::to_string));
                if desc { ord.reverse() } else { ord }
            });
        }

        if !query.select.is_empty() {
            rows = rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .filter(|(k, _)| query.select.contains(k))
                        .collect()
                })
                .collect();
        }

        if let Some(first) = query.first {
            rows.truncate(first);
        }
        Ok(rows)
    }

    async fn create_record(&self, source: &EntitySource, data: &Arguments) -> anyhow::Result<Record> {
        self.check_failure()?;
        self.tables
            .lock()
            .unwrap()
            .entry(source.object.clone())
            .or_default()
            .push(data.clone());
        Ok(data.clone())
    }

    async fn update_record(
        &self,
        source: &EntitySource,
        keys: &Arguments,
        fields: &Arguments,
    ) -> anyhow::Result<Option<Record>> {
        self.check_failure()?;
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(source.object.clone()).or_default();
        Ok(rows.iter_mut().find(|row| matches(row, keys)).map(|row| {
            for (k, v) in fields {
                row.insert(k.clone(), v.clone());
            }
            row.clone()
        }))
    }

    async fn delete_record(&self, source: &EntitySource, keys: &Arguments) -> anyhow::Result<bool> {
        self.check_failure()?;
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(source.object.clone()).or_default();
        let before = rows.len();
        rows.retain(|row| !matches(row, keys));
        Ok(rows.len() != before)
    }

    async fn execute_entity(
        &self,
        source: &EntitySource,
        parameters: &Arguments,
    ) -> anyhow::Result<Vec<Record>> {
        self.check_failure()?;
        self.executions
            .lock()
            .unwrap()
            .push((source.object.clone(), parameters.clone()));
        Ok(self
            .procedures
            .get(&source.object)
            .cloned()
            .unwrap_or_default())
    }
}

// =============================================================================
// FIXTURES
// =============================================================================

/// The bookstore configuration shared by most modules.
pub const BOOKSTORE_YAML: &str = r#"
runtime:
  mcp:
    enabled: true
entities:
  Book:
    source:
      object: dbo.books
      type: table
      key-fields: [id]
    description: Books in the catalogue
    permissions:
      - role: anonymous
        actions: [read]
      - role: editor
        actions: ["*"]
  BookView:
    source:
      object: dbo.books_view
      type: view
  Sale:
    source:
      object: dbo.sales
      type: table
      key-fields: [id]
  GetBookByID:
    source:
      object: dbo.get_book_by_id
      type: stored-procedure
      parameters:
        - name: id
          required: true
    mcp:
      custom-tool: true
      dml-tools: false
  CountBooks:
    source:
      object: dbo.count_books
      type: stored-procedure
      parameters:
        genre: fiction
    permissions:
      - role: authenticated
        actions: [execute]
"#;

pub fn bookstore_config() -> RuntimeConfig {
    RuntimeConfig::from_yaml(BOOKSTORE_YAML).expect("bookstore config must parse")
}

pub fn bookstore_backend() -> InMemoryBackend {
    InMemoryBackend::new()
        .with_rows(
            "dbo.books",
            json!([
                {"id": 1, "title": "Dune", "genre": "fiction", "price": 10},
                {"id": 2, "title": "Emma", "genre": "fiction", "price": 20},
                {"id": 3, "title": "Cosmos", "genre": "science", "price": 30},
            ]),
        )
        .with_rows(
            "dbo.sales",
            json!([
                {"id": 1, "category": "A", "price": 10},
                {"id": 2, "category": "A", "price": 20},
                {"id": 3, "category": "B", "price": 50},
            ]),
        )
        .with_procedure("dbo.get_book_by_id", json!([{"id": 1, "title": "Dune"}]))
        .with_procedure("dbo.count_books", json!([{"count": 2}]))
}

/// A surface plus a handle on its backend.
pub struct TestContext {
    pub surface: ToolSurface,
    pub backend: Arc<InMemoryBackend>,
}

impl TestContext {
    pub fn new(config: RuntimeConfig, backend: InMemoryBackend) -> Self {
        let backend = Arc::new(backend);
        let surface = ToolSurface::new(Arc::new(config), backend.clone())
            .expect("registry must build");
        Self { surface, backend }
    }

    pub fn bookstore() -> Self {
        Self::new(bookstore_config(), bookstore_backend())
    }

    pub async fn call(&self, role: Option<&str>, tool: &str, args: Value) -> CallToolResult {
        let ctx = RequestContext {
            role: role.map(str::to_string),
        };
        self.surface
            .call_tool(&ctx, tool, args)
            .await
            .expect("tool must be registered")
    }
}

// =============================================================================
// ASSERTIONS
// =============================================================================

pub fn assert_success(result: &CallToolResult, msg: &str) {
    assert!(
        !result.is_error,
        "{}: expected success, got {}",
        msg, result.structured_content
    );
}

pub fn assert_error(result: &CallToolResult, error_type: &str, msg: &str) {
    assert_eq!(
        result.error_type(),
        Some(error_type),
        "{}: got {}",
        msg,
        result.structured_content
    );
}

pub fn error_message(result: &CallToolResult) -> &str {
    result.structured_content["error"]["message"]
        .as_str()
        .unwrap_or_default()
}
