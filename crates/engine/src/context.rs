use std::sync::Arc;

use async_graphql_parser::types::ExecutableDocument;
use error::{GraphqlError, GraphqlResult};
use operation::{BoundOperation, ComplexityCost, SelectedOperation, Variables};
use schema::{Data, Schema};
use tokio_util::sync::CancellationToken;

use crate::Request;

/// The mutable, request-scoped state threaded through every pipeline stage.
///
/// Each stage reads the artifacts of the stages before it and records its
/// own. Exactly one request context exists per request and it is never shared
/// across requests.
pub struct RequestContext {
    pub schema: Schema,
    pub request: Request,
    /// Raised when the request timed out or the caller went away.
    pub cancellation: CancellationToken,
    /// The request-scoped property bag, seeded from the request's data.
    pub data: Data,
    /// Written by the parse stage.
    pub document: Option<ExecutableDocument>,
    /// Written by the operation resolution stage.
    pub operation: Option<SelectedOperation>,
    /// The coerced variable values, written by the variable coercion stage.
    pub variables: Option<Variables>,
    /// The bound selection tree, written by the bind stage.
    pub bound: Option<Arc<BoundOperation>>,
    /// The computed operation complexity, when complexity control ran.
    pub complexity: Option<ComplexityCost>,
}

impl RequestContext {
    pub(crate) fn new(schema: Schema, mut request: Request, cancellation: CancellationToken) -> Self {
        let data = std::mem::take(&mut request.data);
        RequestContext {
            schema,
            request,
            cancellation,
            data,
            document: None,
            operation: None,
            variables: None,
            bound: None,
            complexity: None,
        }
    }

    pub fn operation(&self) -> GraphqlResult<&SelectedOperation> {
        self.operation.as_ref().ok_or_else(out_of_order)
    }

    pub fn variables(&self) -> GraphqlResult<&Variables> {
        self.variables.as_ref().ok_or_else(out_of_order)
    }

    pub fn bound_operation(&self) -> GraphqlResult<&Arc<BoundOperation>> {
        self.bound.as_ref().ok_or_else(out_of_order)
    }
}

fn out_of_order() -> GraphqlError {
    tracing::error!("a pipeline stage ran before the stage it depends on");
    GraphqlError::internal_server_error()
}
