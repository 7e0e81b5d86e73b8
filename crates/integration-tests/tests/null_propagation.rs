//! A failed non-nullable field nulls the nearest nullable ancestor.

use engine::{Engine, ErrorCode, ErrorPath, ErrorPathSegment, GraphqlError};
use integration_tests::runtime;
use schema::{FieldDefinition, ObjectDefinition, ResolvedValue, Schema};
use serde_json::json;
use similar_asserts::assert_serde_eq;

fn test_schema() -> Schema {
    Schema::builder()
        .register(
            ObjectDefinition::new("Query")
                .field(
                    FieldDefinition::new("outer", "Outer")
                        .resolve(|_| async { Ok(ResolvedValue::new(json!({ "inner": {} }))) }),
                )
                .field(
                    FieldDefinition::new("ok", "String")
                        .resolve(|_| async { Ok(ResolvedValue::new(json!("fine"))) }),
                ),
        )
        .register(ObjectDefinition::new("Outer").field(FieldDefinition::new("inner", "Inner!")))
        .register(
            ObjectDefinition::new("Inner").field(FieldDefinition::new("boom", "String!").resolve(|_| async {
                Err(GraphqlError::new("boom failed", ErrorCode::ResolverError))
            })),
        )
        .finish()
}

#[test]
fn the_error_bubbles_to_the_nearest_nullable_ancestor() {
    let response = runtime().block_on(async {
        Engine::new(test_schema())
            .execute("{ outer { inner { boom } } ok }")
            .await
    });

    // `boom` and `inner` are non-nullable, `outer` is the nearest nullable
    // ancestor; siblings of `outer` are untouched.
    assert_serde_eq!(
        response.data.as_ref().unwrap(),
        &json!({ "outer": null, "ok": "fine" })
    );
    assert_eq!(response.errors().len(), 1);
    let error = &response.errors()[0];
    assert_eq!(error.message, "boom failed");
    assert_eq!(
        error.path,
        Some(ErrorPath::from(vec![
            ErrorPathSegment::from("outer"),
            ErrorPathSegment::from("inner"),
            ErrorPathSegment::from("boom"),
        ]))
    );
}

#[test]
fn a_failing_nullable_field_only_nulls_itself() {
    let schema = Schema::builder()
        .register(
            ObjectDefinition::new("Query")
                .field(
                    FieldDefinition::new("broken", "String")
                        .resolve(|_| async { Err(GraphqlError::new("nope", ErrorCode::ResolverError)) }),
                )
                .field(
                    FieldDefinition::new("ok", "String")
                        .resolve(|_| async { Ok(ResolvedValue::new(json!("fine"))) }),
                ),
        )
        .finish();

    let response = runtime().block_on(async { Engine::new(schema).execute("{ broken ok }").await });

    assert_serde_eq!(
        response.data.as_ref().unwrap(),
        &json!({ "broken": null, "ok": "fine" })
    );
    assert_eq!(response.errors().len(), 1);
    assert_eq!(
        response.errors()[0].path,
        Some(ErrorPath::from(vec![ErrorPathSegment::from("broken")]))
    );
}

#[test]
fn a_failed_non_null_root_field_nulls_the_whole_result() {
    let schema = Schema::builder()
        .register(
            ObjectDefinition::new("Query").field(
                FieldDefinition::new("required", "String!")
                    .resolve(|_| async { Err(GraphqlError::new("nope", ErrorCode::ResolverError)) }),
            ),
        )
        .finish();

    let response = runtime().block_on(async { Engine::new(schema).execute("{ required }").await });

    assert_serde_eq!(response.data.as_ref().unwrap(), &json!(null));
    assert_eq!(response.errors().len(), 1);
}

#[test]
fn nullable_list_items_absorb_failures() {
    let schema = Schema::builder()
        .register(
            ObjectDefinition::new("Query").field(FieldDefinition::new("items", "[Item]").resolve(|_| async {
                Ok(ResolvedValue::new(json!([{ "v": "a" }, { "v": null }, { "v": "c" }])))
            })),
        )
        .register(ObjectDefinition::new("Item").field(FieldDefinition::new("v", "String!")))
        .finish();

    let response = runtime().block_on(async { Engine::new(schema).execute("{ items { v } }").await });

    assert_serde_eq!(
        response.data.as_ref().unwrap(),
        &json!({ "items": [{ "v": "a" }, null, { "v": "c" }] })
    );
    assert_eq!(response.errors().len(), 1);
    assert_eq!(
        response.errors()[0].path,
        Some(ErrorPath::from(vec![
            ErrorPathSegment::from("items"),
            ErrorPathSegment::from(1usize),
            ErrorPathSegment::from("v"),
        ]))
    );
}

#[test]
fn a_non_null_item_failure_nulls_the_list() {
    let schema = Schema::builder()
        .register(
            ObjectDefinition::new("Query").field(FieldDefinition::new("items", "[Item!]").resolve(|_| async {
                Ok(ResolvedValue::new(json!([{ "v": "a" }, { "v": null }])))
            })),
        )
        .register(ObjectDefinition::new("Item").field(FieldDefinition::new("v", "String!")))
        .finish();

    let response = runtime().block_on(async { Engine::new(schema).execute("{ items { v } }").await });

    assert_serde_eq!(response.data.as_ref().unwrap(), &json!({ "items": null }));
    assert_eq!(response.errors().len(), 1);
}
