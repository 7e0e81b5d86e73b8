//! The built-in request stages, in the order the assembler chains them:
//! parse, resolve operation, coerce variables, bind, complexity control,
//! execute.

use std::sync::Arc;

use async_graphql_parser::types::OperationType;
use error::{ErrorCode, GraphqlError};
use operation::{bind_operation, coerce_variables, compute_complexity, select_operation};
use schema::{ComplexityControl, FieldInterceptor};

use crate::{execution, Next, RequestContext, RequestStage, Response};

/// Runs the external parser over the request text.
pub(crate) struct ParseStage;

#[async_trait::async_trait]
impl RequestStage for ParseStage {
    async fn handle(&self, ctx: &mut RequestContext, next: Next<'_>) -> Response {
        match operation::parse_document(&ctx.request.query) {
            Ok(document) => {
                ctx.document = Some(document);
                next.run(ctx).await
            }
            Err(err) => Response::request_error([err.into_graphql_error()]),
        }
    }
}

/// Picks exactly one operation out of the parsed document.
pub(crate) struct ResolveOperationStage;

#[async_trait::async_trait]
impl RequestStage for ResolveOperationStage {
    async fn handle(&self, ctx: &mut RequestContext, next: Next<'_>) -> Response {
        let Some(document) = ctx.document.take() else {
            return Response::request_error([GraphqlError::internal_server_error()]);
        };
        match select_operation(document, ctx.request.operation_name.as_deref()) {
            Ok(operation) => {
                ctx.operation = Some(operation);
                next.run(ctx).await
            }
            Err(err) => Response::request_error([err.into_graphql_error()]),
        }
    }
}

/// Binds the caller-supplied raw values against the declared variables.
pub(crate) struct CoerceVariablesStage;

#[async_trait::async_trait]
impl RequestStage for CoerceVariablesStage {
    async fn handle(&self, ctx: &mut RequestContext, next: Next<'_>) -> Response {
        let operation = match ctx.operation() {
            Ok(operation) => operation,
            Err(err) => return Response::request_error([err]),
        };
        match coerce_variables(&ctx.schema, operation, &ctx.request.variables) {
            Ok(variables) => {
                ctx.variables = Some(variables);
                next.run(ctx).await
            }
            Err(errors) => {
                Response::request_error(errors.into_iter().map(operation::VariableError::into_graphql_error))
            }
        }
    }
}

/// Builds the immutable selection tree, with each field's resolver pipeline
/// compiled in.
pub(crate) struct BindOperationStage {
    pub interceptors: Arc<[Arc<dyn FieldInterceptor>]>,
}

#[async_trait::async_trait]
impl RequestStage for BindOperationStage {
    async fn handle(&self, ctx: &mut RequestContext, next: Next<'_>) -> Response {
        let (operation, variables) = match (ctx.operation(), ctx.variables()) {
            (Ok(operation), Ok(variables)) => (operation, variables),
            (Err(err), _) | (_, Err(err)) => return Response::request_error([err]),
        };
        match bind_operation(&ctx.schema, operation, variables, self.interceptors.clone()) {
            Ok(bound) => {
                ctx.bound = Some(Arc::new(bound));
                next.run(ctx).await
            }
            Err(err) => Response::request_error([err.into_graphql_error()]),
        }
    }
}

/// The admission-control gate: reject operations whose computed complexity
/// exceeds the configured ceiling before any resolver runs.
pub(crate) struct ComplexityControlStage;

#[async_trait::async_trait]
impl RequestStage for ComplexityControlStage {
    async fn handle(&self, ctx: &mut RequestContext, next: Next<'_>) -> Response {
        let control = ctx.schema.settings.complexity_control.clone();
        if control.is_enabled() {
            let (bound, variables) = match (ctx.bound_operation(), ctx.variables()) {
                (Ok(bound), Ok(variables)) => (bound, variables),
                (Err(err), _) | (_, Err(err)) => return Response::request_error([err]),
            };
            let cost = compute_complexity(bound, variables, ctx.schema.settings.complexity_multipliers);
            ctx.complexity = Some(cost);

            match control {
                ComplexityControl::Enforce { limit } => {
                    if let Err(err) = cost.enforce(limit) {
                        return Response::request_error([err.into_graphql_error()]);
                    }
                }
                ComplexityControl::Measure { limit } => {
                    tracing::info!(cost = cost.cost, "operation complexity measured");
                    if let Some(limit) = limit {
                        if cost.cost > limit {
                            tracing::warn!(
                                cost = cost.cost,
                                limit,
                                "operation would have exceeded the complexity limit"
                            );
                        }
                    }
                }
                ComplexityControl::Disabled => {}
            }
        }
        next.run(ctx).await
    }
}

/// Terminal stage: picks the execution strategy for the operation kind and
/// drives the resolver tree walk.
pub(crate) struct ExecuteStage;

#[async_trait::async_trait]
impl RequestStage for ExecuteStage {
    async fn handle(&self, ctx: &mut RequestContext, _next: Next<'_>) -> Response {
        let bound = match ctx.bound_operation() {
            Ok(bound) => bound.clone(),
            Err(err) => return Response::request_error([err]),
        };

        if bound.ty == OperationType::Subscription {
            return Response::request_error([GraphqlError::new(
                "Subscriptions are not supported on this transport.",
                ErrorCode::BadRequest,
            )]);
        }

        let variables = ctx.variables.clone().unwrap_or_default();
        let data = Arc::new(std::mem::take(&mut ctx.data));

        let response = execution::execute_operation(execution::ExecutionContext {
            schema: ctx.schema.clone(),
            operation: bound,
            variables,
            data: data.clone(),
            errors: Default::default(),
            cancellation: ctx.cancellation.clone(),
            resolver_permits: Arc::new(tokio::sync::Semaphore::new(
                ctx.schema.settings.max_concurrent_resolvers,
            )),
        })
        .await;

        // Hand the bag back to later (outer) stages; a resolver holding onto
        // a clone forfeits that.
        ctx.data = Arc::try_unwrap(data).unwrap_or_default();

        if ctx.cancellation.is_cancelled() {
            // Partial results gathered before cancellation are not a payload.
            return Response::request_error([GraphqlError::request_cancelled()]);
        }

        response
    }
}
