use std::sync::{Arc, Mutex};

use async_graphql_parser::types::OperationType;
use error::{ErrorCode, GraphqlError};
use operation::{BoundOperation, Variables};
use schema::{Data, ResolvedValue, Schema, ScopedData};
use tokio_util::sync::CancellationToken;

use crate::{
    resolver_utils::{resolve_root_container, resolve_root_container_serial, SelectionContext},
    QueryPath, Response,
};

/// Everything the resolver tree walk needs, owned for the duration of one
/// request's execution.
///
/// Concurrency exists only in the fan-out of field resolution; all mutation
/// of the response happens in per-subtree accumulators, so the only shared
/// mutable state is the error sink.
pub(crate) struct ExecutionContext {
    pub schema: Schema,
    pub operation: Arc<BoundOperation>,
    pub variables: Variables,
    pub data: Arc<Data>,
    pub errors: Mutex<Vec<GraphqlError>>,
    pub cancellation: CancellationToken,
    /// Bounds concurrent in-flight resolver invocations for this request.
    pub resolver_permits: Arc<tokio::sync::Semaphore>,
}

impl ExecutionContext {
    /// Record a field-level error without aborting the walk.
    pub fn add_error(&self, error: GraphqlError) {
        self.errors.lock().expect("error sink poisoned").push(error);
    }
}

/// Resolve the root selection set with the strategy the operation kind
/// demands: mutations strictly serially in document order, everything else
/// concurrently.
pub(crate) async fn execute_operation(ctx: ExecutionContext) -> Response {
    let root = SelectionContext {
        ctx: &ctx,
        type_name: &ctx.operation.root_type,
        selection: &ctx.operation.selection_set,
        path: QueryPath::empty(),
        scoped: ScopedData::default(),
        parent: ResolvedValue::null(),
    };

    let result = match ctx.operation.ty {
        OperationType::Query => resolve_root_container(root).await,
        OperationType::Mutation => resolve_root_container_serial(root).await,
        OperationType::Subscription => Err(GraphqlError::new(
            "Subscriptions are not supported on this transport.",
            ErrorCode::BadRequest,
        )),
    };

    let mut errors = std::mem::take(&mut *ctx.errors.lock().expect("error sink poisoned"));
    match result {
        Ok(data) => Response::from_data(data, errors),
        Err(err) => {
            // A non-nullable root field failed: the whole result nulls out.
            errors.push(err);
            Response::from_data(serde_json::Value::Null, errors)
        }
    }
}
