//! Custom request stages, field interceptors and scoped context data.

use engine::{Engine, ErrorCode, GraphqlError, Next, RequestContext, RequestStage, Response, StageHook};
use integration_tests::runtime;
use schema::{
    FieldDefinition, FieldInterceptor, NextResolver, ObjectDefinition, ResolvedValue, ResolverInput, Schema,
};
use serde_json::json;
use similar_asserts::assert_serde_eq;

fn test_schema() -> Schema {
    Schema::builder()
        .register(
            ObjectDefinition::new("Query")
                .field(FieldDefinition::new("greeting", "String").resolve(|input| async move {
                    let greeting = input
                        .data
                        .get::<Greeting>()
                        .map(|greeting| greeting.0.clone())
                        .unwrap_or_else(|| "hello".to_string());
                    Ok(ResolvedValue::new(json!(greeting)))
                }))
                .field(
                    FieldDefinition::new("secret", "String")
                        .resolve(|_| async { Ok(ResolvedValue::new(json!("classified"))) }),
                ),
        )
        .finish()
}

struct Greeting(String);

/// Rejects everything. Never calls the rest of the chain.
struct RejectAll;

#[async_trait::async_trait]
impl RequestStage for RejectAll {
    async fn handle(&self, _ctx: &mut RequestContext, _next: Next<'_>) -> Response {
        Response::request_error([GraphqlError::new("blocked at the door", ErrorCode::BadRequest)])
    }
}

#[test]
fn a_stage_can_short_circuit_the_whole_chain() {
    let response = runtime().block_on(async {
        Engine::builder(test_schema())
            .with_stage(StageHook::OnRequest, RejectAll)
            .finish()
            .execute("{ greeting }")
            .await
    });

    assert_serde_eq!(
        response.to_json_value(),
        json!({
            "errors": [{
                "message": "blocked at the door",
                "extensions": { "code": "BAD_REQUEST" }
            }]
        })
    );
}

/// Seeds the request-scoped bag before the built-in stages run.
struct SeedGreeting;

#[async_trait::async_trait]
impl RequestStage for SeedGreeting {
    async fn handle(&self, ctx: &mut RequestContext, next: Next<'_>) -> Response {
        ctx.data.insert(Greeting("howdy".to_string()));
        next.run(ctx).await
    }
}

#[test]
fn stages_pass_metadata_to_resolvers_through_the_request_bag() {
    let response = runtime().block_on(async {
        Engine::builder(test_schema())
            .with_stage(StageHook::OnRequest, SeedGreeting)
            .finish()
            .execute("{ greeting }")
            .await
    });

    assert_serde_eq!(response.to_json_value(), json!({ "data": { "greeting": "howdy" } }));
}

/// Records the admission-control verdict into the response, after the rest
/// of the chain ran.
struct EmitCost;

#[async_trait::async_trait]
impl RequestStage for EmitCost {
    async fn handle(&self, ctx: &mut RequestContext, next: Next<'_>) -> Response {
        let mut response = next.run(ctx).await;
        if let Some(complexity) = ctx.complexity {
            response.insert_extension("cost", complexity.cost);
        }
        response
    }
}

#[test]
fn a_pre_execution_stage_sees_the_computed_complexity() {
    let schema = Schema::builder()
        .register(
            ObjectDefinition::new("Query").field(
                FieldDefinition::new("greeting", "String")
                    .resolve(|_| async { Ok(ResolvedValue::new(json!("hello"))) }),
            ),
        )
        .settings(schema::Settings {
            complexity_control: schema::ComplexityControl::Measure { limit: None },
            ..Default::default()
        })
        .finish();

    let response = runtime().block_on(async {
        Engine::builder(schema)
            .with_stage(StageHook::PreExecution, EmitCost)
            .finish()
            .execute("{ greeting }")
            .await
    });

    assert_serde_eq!(
        response.to_json_value(),
        json!({ "data": { "greeting": "hello" }, "extensions": { "cost": 1 } })
    );
}

/// Field-level authorization: `secret` never reaches its resolver.
struct DenySecret;

#[async_trait::async_trait]
impl FieldInterceptor for DenySecret {
    async fn resolve(&self, input: ResolverInput, next: NextResolver<'_>) -> error::GraphqlResult<ResolvedValue> {
        if input.field_name == "secret" {
            return Err(GraphqlError::new("Not authorized", ErrorCode::ResolverError));
        }
        next.run(input).await
    }
}

#[test]
fn interceptors_can_short_circuit_a_single_field() {
    let response = runtime().block_on(async {
        Engine::builder(test_schema())
            .with_field_interceptor(DenySecret)
            .finish()
            .execute("{ greeting secret }")
            .await
    });

    assert_serde_eq!(
        response.data.as_ref().unwrap(),
        &json!({ "greeting": "hello", "secret": null })
    );
    assert_eq!(response.errors().len(), 1);
    assert_eq!(response.errors()[0].message, "Not authorized");
}

#[test]
fn scoped_data_reaches_descendants_but_not_siblings() {
    let node_field = |name: &str, tag: Option<&'static str>| {
        FieldDefinition::new(name, "Node").resolve(move |input| async move {
            let mut value = ResolvedValue::new(json!({}));
            if let Some(tag) = tag {
                value = value.with_scoped(input.scoped.clone().with("tag", tag));
            }
            Ok(value)
        })
    };

    let schema = Schema::builder()
        .register(
            ObjectDefinition::new("Query")
                .field(node_field("tagged", Some("from-tagged")))
                .field(node_field("plain", None)),
        )
        .register(
            ObjectDefinition::new("Node").field(FieldDefinition::new("tag", "String").resolve(|input| async move {
                let tag = input
                    .scoped
                    .get("tag")
                    .cloned()
                    .unwrap_or_else(|| json!("missing"));
                Ok(ResolvedValue::new(tag))
            })),
        )
        .finish();

    let response = runtime().block_on(async {
        Engine::new(schema).execute("{ tagged { tag } plain { tag } }").await
    });

    assert_serde_eq!(
        response.to_json_value(),
        json!({
            "data": {
                "tagged": { "tag": "from-tagged" },
                "plain": { "tag": "missing" },
            }
        })
    );
}
