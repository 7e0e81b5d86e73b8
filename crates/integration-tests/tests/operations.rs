//! Operation selection and basic resolution.

use engine::{BatchRequest, BatchResponse, Engine, ErrorCode, Request};
use integration_tests::runtime;
use schema::{FieldDefinition, ObjectDefinition, ResolvedValue, Schema};
use serde_json::json;
use similar_asserts::assert_serde_eq;

fn test_schema() -> Schema {
    Schema::builder()
        .register(
            ObjectDefinition::new("Query")
                .field(
                    FieldDefinition::new("x", "String")
                        .resolve(|_| async { Ok(ResolvedValue::new(json!("x-value"))) }),
                )
                .field(
                    FieldDefinition::new("y", "String")
                        .resolve(|_| async { Ok(ResolvedValue::new(json!("y-value"))) }),
                ),
        )
        .finish()
}

const TWO_OPERATIONS: &str = "query a { x } query b { y }";

#[test]
fn ambiguous_operation_requires_a_name() {
    let response = runtime().block_on(async {
        Engine::new(test_schema()).execute(TWO_OPERATIONS).await
    });

    assert_serde_eq!(
        response.to_json_value(),
        json!({
            "errors": [{
                "message": "Operation name required in request.",
                "extensions": { "code": "OPERATION_NOT_FOUND" }
            }]
        })
    );
}

#[test]
fn a_matching_hint_selects_the_operation() {
    let response = runtime().block_on(async {
        Engine::new(test_schema())
            .execute(Request::new(TWO_OPERATIONS).with_operation_name("a"))
            .await
    });

    assert_serde_eq!(response.to_json_value(), json!({ "data": { "x": "x-value" } }));
}

#[test]
fn an_unmatched_hint_is_an_error() {
    let response = runtime().block_on(async {
        Engine::new(test_schema())
            .execute(Request::new(TWO_OPERATIONS).with_operation_name("c"))
            .await
    });

    assert_serde_eq!(
        response.to_json_value(),
        json!({
            "errors": [{
                "message": "Unknown operation named \"c\"",
                "extensions": { "code": "OPERATION_NOT_FOUND" }
            }]
        })
    );
}

#[test]
fn a_single_operation_needs_no_name() {
    let response = runtime().block_on(async { Engine::new(test_schema()).execute("{ x y }").await });

    assert_serde_eq!(
        response.to_json_value(),
        json!({ "data": { "x": "x-value", "y": "y-value" } })
    );
}

#[test]
fn aliases_and_typename_resolve() {
    let response = runtime().block_on(async {
        Engine::new(test_schema()).execute("{ renamed: x __typename }").await
    });

    assert_serde_eq!(
        response.to_json_value(),
        json!({ "data": { "renamed": "x-value", "__typename": "Query" } })
    );
}

#[test]
fn skip_and_include_prune_fields() {
    let response = runtime().block_on(async {
        Engine::new(test_schema())
            .execute("{ x @skip(if: true) y @include(if: true) }")
            .await
    });

    assert_serde_eq!(response.to_json_value(), json!({ "data": { "y": "y-value" } }));
}

#[test]
fn parse_errors_are_request_level() {
    let response = runtime().block_on(async { Engine::new(test_schema()).execute("query {").await });

    assert!(response.is_request_error());
    assert_eq!(response.errors().len(), 1);
    assert_eq!(response.errors()[0].code, ErrorCode::OperationParsingError);
}

#[test]
fn unknown_fields_fail_validation() {
    let response = runtime().block_on(async { Engine::new(test_schema()).execute("{ nope }").await });

    assert!(response.is_request_error());
    assert_eq!(
        response.errors()[0].message,
        "Query does not have a field named 'nope'"
    );
    assert_eq!(response.errors()[0].code, ErrorCode::OperationValidationError);
}

#[test]
fn batches_execute_request_by_request() {
    let response = runtime().block_on(async {
        Engine::new(test_schema())
            .execute_batch(BatchRequest::Batch(vec![
                Request::new("{ x }"),
                Request::new("{ nope }"),
            ]))
            .await
    });

    let BatchResponse::Batch(responses) = response else {
        panic!("expected a batch response");
    };
    assert_serde_eq!(responses[0].to_json_value(), json!({ "data": { "x": "x-value" } }));
    assert!(responses[1].is_request_error());
}
