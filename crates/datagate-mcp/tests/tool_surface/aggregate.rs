//! `aggregate_records` through the tool surface.
//!
//! Covers:
//! - Whole-set and grouped aggregation over backend rows
//! - Pre-aggregation filter, having, first
//! - Validation before any policy or data access

use super::common::*;
use pretty_assertions::assert_eq;
use serde_json::json;

pub async fn test_avg_over_all_rows(ctx: &TestContext) {
    println!("  🧪 test_avg_over_all_rows");

    let result = ctx
        .call(
            None,
            "aggregate_records",
            json!({"entity": "Book", "function": "avg", "field": "price"}),
        )
        .await;

    assert_success(&result, "avg price");
    assert_eq!(
        result.structured_content,
        json!({"entity": "Book", "records": [{"avg_price": 20.0}], "count": 1})
    );

    println!("    ✅ Passed");
}

pub async fn test_sum_grouped_desc(ctx: &TestContext) {
    println!("  🧪 test_sum_grouped_desc");

    let result = ctx
        .call(
            None,
            "aggregate_records",
            json!({
                "entity": "Sale",
                "function": "sum",
                "field": "price",
                "groupby": ["category"],
                "orderby": "desc"
            }),
        )
        .await;

    assert_success(&result, "sum by category");
    assert_eq!(
        result.structured_content["records"],
        json!([
            {"category": "B", "sum_price": 50.0},
            {"category": "A", "sum_price": 30.0}
        ])
    );

    println!("    ✅ Passed");
}

pub async fn test_filter_having_first(ctx: &TestContext) {
    println!("  🧪 test_filter_having_first");

    let result = ctx
        .call(
            None,
            "aggregate_records",
            json!({
                "entity": "Book",
                "function": "count",
                "field": "*",
                "filter": {"genre": "fiction"}
            }),
        )
        .await;
    assert_eq!(result.structured_content["records"], json!([{"count": 2}]));

    let result = ctx
        .call(
            None,
            "aggregate_records",
            json!({
                "entity": "Book",
                "function": "count",
                "field": "*",
                "groupby": ["genre"],
                "having": {"gte": 1},
                "orderby": "asc",
                "first": 1
            }),
        )
        .await;
    assert_eq!(
        result.structured_content["records"],
        json!([{"genre": "science", "count": 1}])
    );

    println!("    ✅ Passed");
}

pub async fn test_count_on_empty_entity() {
    println!("  🧪 test_count_on_empty_entity");

    let ctx = TestContext::new(bookstore_config(), InMemoryBackend::new());
    let whole = ctx
        .call(
            None,
            "aggregate_records",
            json!({"entity": "Sale", "function": "count", "field": "*"}),
        )
        .await;
    assert_eq!(whole.structured_content["records"], json!([{"count": 0}]));

    let grouped = ctx
        .call(
            None,
            "aggregate_records",
            json!({"entity": "Sale", "function": "count", "field": "*", "groupby": ["category"]}),
        )
        .await;
    assert_eq!(grouped.structured_content["count"], json!(0));

    println!("    ✅ Passed");
}

pub async fn test_validation_errors(ctx: &TestContext) {
    println!("  🧪 test_validation_errors");

    let result = ctx
        .call(
            None,
            "aggregate_records",
            json!({"entity": "Book", "function": "median", "field": "price"}),
        )
        .await;
    assert_error(&result, "InvalidArguments", "unsupported function");
    assert!(error_message(&result).contains("median"));

    // Unknown entity, but the missing field is reported first.
    let result = ctx
        .call(
            None,
            "aggregate_records",
            json!({"entity": "Nope", "function": "sum"}),
        )
        .await;
    assert_eq!(error_message(&result), "Missing required argument 'field'");

    let result = ctx
        .call(
            None,
            "aggregate_records",
            json!({"function": "sum", "field": "price"}),
        )
        .await;
    assert_eq!(error_message(&result), "Missing required argument 'entity'");

    println!("    ✅ Passed");
}

pub async fn test_aggregate_requires_read(ctx: &TestContext) {
    println!("  🧪 test_aggregate_requires_read");

    let result = ctx
        .call(
            Some("reader"),
            "aggregate_records",
            json!({"entity": "CountBooks", "function": "count", "field": "*"}),
        )
        .await;
    assert_error(&result, "InvalidEntity", "procedures cannot be aggregated");

    println!("    ✅ Passed");
}

// =============================================================================
// TEST RUNNER
// =============================================================================

pub async fn run_all_tests(ctx: &TestContext) {
    println!("\n📂 Aggregate Records Tests\n");

    test_avg_over_all_rows(ctx).await;
    test_sum_grouped_desc(ctx).await;
    test_filter_having_first(ctx).await;
    test_count_on_empty_entity().await;
    test_validation_errors(ctx).await;
    test_aggregate_requires_read(ctx).await;
}
