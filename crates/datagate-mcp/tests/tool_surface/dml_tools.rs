//! Built-in DML tools through the tool surface.
//!
//! Covers:
//! - CRUD round trips against the in-memory backend
//! - Gating order: arguments, exposure, source type, permission, backend
//! - Runtime `dml-tools` flags and entity `dml-tools: false`

use super::common::*;
use datagate_core::{DmlToolFlags, DmlToolKind, DmlToolsConfig, EntityConfig, RuntimeConfig};
use datagate_mcp::McpError;
use datagate_mcp::RequestContext;
use pretty_assertions::assert_eq;
use serde_json::json;

// =============================================================================
// READ / CREATE / UPDATE / DELETE
// =============================================================================

pub async fn test_read_records(ctx: &TestContext) {
    println!("  🧪 test_read_records");

    let result = ctx
        .call(
            None,
            "read_records",
            json!({
                "entity": "Book",
                "select": ["id", "title"],
                "filter": {"genre": "fiction"},
                "first": 1
            }),
        )
        .await;

    assert_success(&result, "anonymous may read books");
    assert_eq!(
        result.structured_content,
        json!({
            "entity": "Book",
            "records": [{"id": 1, "title": "Dune"}],
            "count": 1
        })
    );

    println!("    ✅ Passed");
}

pub async fn test_create_update_delete_as_editor() {
    println!("  🧪 test_create_update_delete_as_editor");

    let ctx = TestContext::bookstore();

    let created = ctx
        .call(
            Some("editor"),
            "create_record",
            json!({"entity": "Book", "data": {"id": 9, "title": "Ulysses", "price": 15}}),
        )
        .await;
    assert_success(&created, "editor may create");
    assert_eq!(created.structured_content["record"]["title"], json!("Ulysses"));

    let updated = ctx
        .call(
            Some("Editor"),
            "update_record",
            json!({"entity": "Book", "keys": {"id": 9}, "fields": {"price": 12}}),
        )
        .await;
    assert_success(&updated, "role names match case-insensitively");
    assert_eq!(updated.structured_content["record"]["price"], json!(12));

    let deleted = ctx
        .call(
            Some("editor"),
            "delete_record",
            json!({"entity": "Book", "keys": {"id": 9}}),
        )
        .await;
    assert_success(&deleted, "editor may delete");
    assert_eq!(
        deleted.structured_content,
        json!({"entity": "Book", "deleted": true})
    );
    assert_eq!(ctx.backend.rows("dbo.books").len(), 3);

    let again = ctx
        .call(
            Some("editor"),
            "delete_record",
            json!({"entity": "Book", "keys": {"id": 9}}),
        )
        .await;
    assert_error(&again, "InvalidArguments", "nothing left to delete");
    assert!(error_message(&again).contains("No record of entity 'Book'"));

    println!("    ✅ Passed");
}

pub async fn test_key_fields_enforced(ctx: &TestContext) {
    println!("  🧪 test_key_fields_enforced");

    let wrong_key = ctx
        .call(
            Some("editor"),
            "delete_record",
            json!({"entity": "Book", "keys": {"title": "Dune"}}),
        )
        .await;
    assert_error(&wrong_key, "InvalidArguments", "title is not a key field");
    assert!(error_message(&wrong_key).contains("Missing key field 'id'"));

    let extra_key = ctx
        .call(
            Some("editor"),
            "delete_record",
            json!({"entity": "Book", "keys": {"id": 1, "title": "Dune"}}),
        )
        .await;
    assert!(error_message(&extra_key).contains("'title' is not a key field"));

    println!("    ✅ Passed");
}

// =============================================================================
// GATING
// =============================================================================

pub async fn test_permission_denied(ctx: &TestContext) {
    println!("  🧪 test_permission_denied");

    let result = ctx
        .call(
            None,
            "create_record",
            json!({"entity": "Book", "data": {"id": 10}}),
        )
        .await;
    assert_error(&result, "PermissionDenied", "anonymous may only read");
    assert!(error_message(&result).contains("Role 'anonymous'"));

    let result = ctx
        .call(None, "execute_entity", json!({"entity": "CountBooks"}))
        .await;
    assert_error(&result, "PermissionDenied", "anonymous does not inherit authenticated");

    println!("    ✅ Passed");
}

pub async fn test_argument_errors_come_first(ctx: &TestContext) {
    println!("  🧪 test_argument_errors_come_first");

    // The entity does not exist, but the missing argument is reported first.
    let result = ctx
        .call(None, "create_record", json!({"entity": "Nope"}))
        .await;
    assert_error(&result, "InvalidArguments", "data is required");
    assert_eq!(error_message(&result), "Missing required argument 'data'");

    let result = ctx.call(None, "read_records", json!([1, 2])).await;
    assert_error(&result, "InvalidArguments", "arguments must be an object");

    println!("    ✅ Passed");
}

pub async fn test_unknown_entity(ctx: &TestContext) {
    println!("  🧪 test_unknown_entity");

    let result = ctx.call(None, "read_records", json!({"entity": "book"})).await;
    assert_error(&result, "EntityNotFound", "entity names are case-sensitive");

    println!("    ✅ Passed");
}

pub async fn test_entity_dml_tools_disabled(ctx: &TestContext) {
    println!("  🧪 test_entity_dml_tools_disabled");

    let result = ctx
        .call(None, "execute_entity", json!({"entity": "GetBookByID", "parameters": {"id": 1}}))
        .await;
    assert_error(&result, "ToolDisabled", "GetBookByID sets dml-tools: false");
    assert!(error_message(&result).contains("DML tools are disabled for entity 'GetBookByID'"));

    println!("    ✅ Passed");
}

pub async fn test_source_type_mismatch(ctx: &TestContext) {
    println!("  🧪 test_source_type_mismatch");

    let result = ctx
        .call(Some("editor"), "read_records", json!({"entity": "CountBooks"}))
        .await;
    assert_error(&result, "InvalidEntity", "procedures are not read");
    assert!(error_message(&result).contains("use execute_entity"));

    let result = ctx.call(None, "execute_entity", json!({"entity": "Sale"})).await;
    assert_error(&result, "InvalidEntity", "tables are not executed");

    println!("    ✅ Passed");
}

pub async fn test_runtime_flag_removes_tool() {
    println!("  🧪 test_runtime_flag_removes_tool");

    let mut flags = DmlToolFlags::default();
    flags.set(DmlToolKind::DeleteRecord, false);
    let config = bookstore_config().with_dml_tools(DmlToolsConfig::PerTool(flags));
    let ctx = TestContext::new(config, bookstore_backend());

    let err = ctx
        .surface
        .call_tool(
            &RequestContext::with_role("editor"),
            "delete_record",
            json!({"entity": "Book", "keys": {"id": 1}}),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, McpError::ToolNotFound { .. }));

    // The typed operation is still gated when called directly.
    let args = datagate_mcp::arguments::as_object(json!({"entity": "Book", "keys": {"id": 1}}))
        .unwrap();
    let err = ctx
        .surface
        .delete_record(&RequestContext::with_role("editor"), &args)
        .await
        .unwrap_err();
    assert!(err.message.contains("runtime.mcp.dml-tools.delete-record: false"));
    assert_eq!(ctx.backend.rows("dbo.books").len(), 3);

    println!("    ✅ Passed");
}

pub async fn test_backend_failure() {
    println!("  🧪 test_backend_failure");

    let ctx = TestContext::new(
        RuntimeConfig::with_entities([("Book", EntityConfig::table("dbo.books"))]),
        InMemoryBackend::new().failing("connection reset"),
    );
    let result = ctx.call(None, "read_records", json!({"entity": "Book"})).await;
    assert_error(&result, "DataSourceError", "backend failure");
    assert!(error_message(&result).contains("connection reset"));

    println!("    ✅ Passed");
}

pub async fn test_execute_entity_binds_parameters(ctx: &TestContext) {
    println!("  🧪 test_execute_entity_binds_parameters");

    let result = ctx
        .call(Some("reader"), "execute_entity", json!({"entity": "CountBooks"}))
        .await;
    assert_success(&result, "authenticated roles may execute");
    assert_eq!(result.structured_content["records"], json!([{"count": 2}]));

    let (object, params) = ctx.backend.last_execution().unwrap();
    assert_eq!(object, "dbo.count_books");
    assert_eq!(serde_json::Value::Object(params), json!({"genre": "fiction"}));

    let result = ctx
        .call(
            Some("reader"),
            "execute_entity",
            json!({"entity": "CountBooks", "parameters": {"author": "x"}}),
        )
        .await;
    assert_error(&result, "InvalidArguments", "undeclared parameter");

    println!("    ✅ Passed");
}

// =============================================================================
// TEST RUNNER
// =============================================================================

pub async fn run_all_tests(ctx: &TestContext) {
    println!("\n📂 DML Tool Tests\n");

    test_read_records(ctx).await;
    test_create_update_delete_as_editor().await;
    test_key_fields_enforced(ctx).await;
    test_permission_denied(ctx).await;
    test_argument_errors_come_first(ctx).await;
    test_unknown_entity(ctx).await;
    test_entity_dml_tools_disabled(ctx).await;
    test_source_type_mismatch(ctx).await;
    test_runtime_flag_removes_tool().await;
    test_backend_failure().await;
    test_execute_entity_binds_parameters(ctx).await;
}
