//! `describe_entities` through the tool surface.
//!
//! Covers:
//! - Inclusion keyed solely on the resolved `dml-tools` flag
//! - Empty and filtered-to-empty configurations
//! - Full and name-only projections, `count == entities.len()`

use super::common::*;
use datagate_core::{EntityConfig, RuntimeConfig};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn names(result: &datagate_mcp::CallToolResult) -> Vec<String> {
    result.structured_content["entities"]
        .as_array()
        .map(|entities| {
            entities
                .iter()
                .filter_map(|e| e["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn assert_count_matches(result: &datagate_mcp::CallToolResult) {
    let len = result.structured_content["entities"]
        .as_array()
        .map(Vec::len)
        .unwrap_or_default();
    assert_eq!(result.structured_content["count"], json!(len));
}

// =============================================================================
// FILTERING
// =============================================================================

pub async fn test_only_dml_disabled_entity(_ctx: &TestContext) {
    println!("  🧪 test_only_dml_disabled_entity");

    let ctx = TestContext::new(
        RuntimeConfig::with_entities([(
            "GetBook",
            EntityConfig::stored_procedure("dbo.get_book").with_dml_tools(false),
        )]),
        InMemoryBackend::new(),
    );
    let result = ctx.call(None, "describe_entities", json!({})).await;

    assert_error(&result, "AllEntitiesFilteredDmlDisabled", "single disabled entity");
    let message = error_message(&result);
    assert!(message.contains("DML tools disabled"), "{}", message);
    assert!(message.contains("dml-tools: false"), "{}", message);
    assert!(message.contains("tools/list"), "{}", message);

    println!("    ✅ Passed");
}

pub async fn test_default_visibility(_ctx: &TestContext) {
    println!("  🧪 test_default_visibility");

    let ctx = TestContext::new(
        RuntimeConfig::with_entities([
            ("Book", EntityConfig::table("dbo.books")),
            ("BookView", EntityConfig::view("dbo.books_view")),
            (
                "GetBook",
                EntityConfig::stored_procedure("dbo.get_book").with_dml_tools(false),
            ),
        ]),
        InMemoryBackend::new(),
    );
    let result = ctx.call(None, "describe_entities", json!({})).await;

    assert_success(&result, "tables and views default to visible");
    assert_eq!(names(&result), vec!["Book", "BookView"]);
    assert_eq!(result.structured_content["count"], json!(2));

    println!("    ✅ Passed");
}

pub async fn test_custom_tool_entity_still_listed(_ctx: &TestContext) {
    println!("  🧪 test_custom_tool_entity_still_listed");

    let ctx = TestContext::new(
        RuntimeConfig::with_entities([(
            "GetBook",
            EntityConfig::stored_procedure("dbo.get_book")
                .with_custom_tool(true)
                .with_dml_tools(true),
        )]),
        InMemoryBackend::new(),
    );
    let result = ctx.call(None, "describe_entities", json!({})).await;

    assert_success(&result, "custom tool flag does not hide the entity");
    assert_eq!(names(&result), vec!["GetBook"]);
    assert_eq!(result.structured_content["count"], json!(1));

    println!("    ✅ Passed");
}

pub async fn test_no_entities_configured(_ctx: &TestContext) {
    println!("  🧪 test_no_entities_configured");

    let ctx = TestContext::new(RuntimeConfig::default(), InMemoryBackend::new());
    let result = ctx.call(None, "describe_entities", json!({"nameOnly": true})).await;

    assert_error(&result, "NoEntitiesConfigured", "empty entity map");
    assert!(error_message(&result).contains("No entities are configured"));

    println!("    ✅ Passed");
}

pub async fn test_bookstore_order_preserved(ctx: &TestContext) {
    println!("  🧪 test_bookstore_order_preserved");

    let result = ctx.call(None, "describe_entities", json!({})).await;

    assert_success(&result, "bookstore describe");
    assert_eq!(names(&result), vec!["Book", "BookView", "Sale", "CountBooks"]);
    assert_count_matches(&result);

    println!("    ✅ Passed");
}

// =============================================================================
// PROJECTIONS
// =============================================================================

pub async fn test_name_only_projection(ctx: &TestContext) {
    println!("  🧪 test_name_only_projection");

    let result = ctx.call(None, "describe_entities", json!({"nameOnly": true})).await;

    assert_success(&result, "name-only describe");
    assert_count_matches(&result);
    assert_eq!(
        result.structured_content["entities"][0],
        json!({"name": "Book", "description": "Books in the catalogue"})
    );
    assert_eq!(result.structured_content["entities"][1], json!({"name": "BookView"}));

    println!("    ✅ Passed");
}

pub async fn test_full_projection_reflects_role(ctx: &TestContext) {
    println!("  🧪 test_full_projection_reflects_role");

    let anonymous = ctx.call(None, "describe_entities", json!({"entities": ["Book"]})).await;
    assert_success(&anonymous, "anonymous describe");
    assert_eq!(
        anonymous.structured_content,
        json!({
            "entities": [{
                "name": "Book",
                "description": "Books in the catalogue",
                "sourceType": "table",
                "keyFields": ["id"],
                "permissions": ["read"]
            }],
            "count": 1
        })
    );

    let editor = ctx
        .call(Some("editor"), "describe_entities", json!({"entities": ["Book"]}))
        .await;
    assert_eq!(
        editor.structured_content["entities"][0]["permissions"],
        json!(["create", "read", "update", "delete"])
    );

    let procedure = ctx
        .call(Some("editor"), "describe_entities", json!({"entities": ["CountBooks"]}))
        .await;
    let entity = &procedure.structured_content["entities"][0];
    assert_eq!(entity["sourceType"], json!("stored-procedure"));
    assert_eq!(entity["parameters"], json!([{"name": "genre", "required": false, "default": "fiction"}]));
    assert_eq!(entity["permissions"], json!(["execute"]));
    assert_eq!(entity.get("keyFields"), None::<&Value>);

    println!("    ✅ Passed");
}

pub async fn test_entity_filter_ignores_unknown_and_hidden(ctx: &TestContext) {
    println!("  🧪 test_entity_filter_ignores_unknown_and_hidden");

    let result = ctx
        .call(
            None,
            "describe_entities",
            json!({"entities": ["Sale", "Nope", "GetBookByID"], "nameOnly": true}),
        )
        .await;

    assert_success(&result, "filtered describe");
    assert_eq!(names(&result), vec!["Sale"]);
    assert_count_matches(&result);

    println!("    ✅ Passed");
}

pub async fn test_invalid_describe_arguments(ctx: &TestContext) {
    println!("  🧪 test_invalid_describe_arguments");

    let result = ctx.call(None, "describe_entities", json!({"nameOnly": "yes"})).await;
    assert_error(&result, "InvalidArguments", "nameOnly must be a boolean");

    println!("    ✅ Passed");
}

// =============================================================================
// TEST RUNNER
// =============================================================================

pub async fn run_all_tests(ctx: &TestContext) {
    println!("\n📂 Describe Entities Tests\n");

    test_only_dml_disabled_entity(ctx).await;
    test_default_visibility(ctx).await;
    test_custom_tool_entity_still_listed(ctx).await;
    test_no_entities_configured(ctx).await;
    test_bookstore_order_preserved(ctx).await;
    test_name_only_projection(ctx).await;
    test_full_projection_reflects_role(ctx).await;
    test_entity_filter_ignores_unknown_and_hidden(ctx).await;
    test_invalid_describe_arguments(ctx).await;
}
