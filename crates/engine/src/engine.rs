use std::sync::Arc;

use error::GraphqlError;
use schema::{FieldInterceptor, Schema};
use tokio_util::sync::CancellationToken;

use crate::{
    pipeline::stages::{
        BindOperationStage, CoerceVariablesStage, ComplexityControlStage, ExecuteStage, ParseStage,
        ResolveOperationStage,
    },
    BatchRequest, BatchResponse, Next, Request, RequestContext, RequestStage, Response, StageHook,
};

/// The assembled request processor.
///
/// Cheap to clone; one engine serves any number of concurrent requests, each
/// with its own request context.
#[derive(Clone)]
pub struct Engine {
    schema: Schema,
    stages: Arc<[Arc<dyn RequestStage>]>,
}

impl Engine {
    pub fn new(schema: Schema) -> Self {
        Self::builder(schema).finish()
    }

    pub fn builder(schema: Schema) -> EngineBuilder {
        EngineBuilder {
            schema,
            on_request: Vec::new(),
            pre_execution: Vec::new(),
            interceptors: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Run one request through the stage chain, wrapped in the configured
    /// timeout.
    ///
    /// On timeout the request's cancellation signal is raised, in-flight
    /// resolvers are abandoned and the caller gets a single timeout error
    /// rather than a partial payload.
    pub async fn execute(&self, request: impl Into<Request>) -> Response {
        let request = request.into();
        let cancellation = CancellationToken::new();
        // Dropping the execute future (caller went away) cancels too.
        let _cancel_on_drop = cancellation.clone().drop_guard();

        let mut ctx = RequestContext::new(self.schema.clone(), request, cancellation.clone());
        let timeout = self.schema.settings.timeout;

        tokio::select! {
            response = Next::new(&self.stages).run(&mut ctx) => response,
            () = tokio::time::sleep(timeout) => {
                cancellation.cancel();
                tracing::warn!(timeout_ms = timeout.as_millis() as u64, "request timed out");
                Response::request_error([GraphqlError::request_timeout()])
            }
        }
    }

    /// Execute a batch of requests, each under its own timeout window.
    pub async fn execute_batch(&self, batch_request: BatchRequest) -> BatchResponse {
        match batch_request {
            BatchRequest::Single(request) => BatchResponse::Single(self.execute(request).await),
            BatchRequest::Batch(requests) => {
                let mut responses = Vec::with_capacity(requests.len());
                for request in requests {
                    responses.push(self.execute(request).await);
                }
                BatchResponse::Batch(responses)
            }
        }
    }
}

/// Assembles the stage chain: custom `OnRequest` stages wrap the built-ins,
/// custom `PreExecution` stages sit between admission control and the
/// executor.
pub struct EngineBuilder {
    schema: Schema,
    on_request: Vec<Arc<dyn RequestStage>>,
    pre_execution: Vec<Arc<dyn RequestStage>>,
    interceptors: Vec<Arc<dyn FieldInterceptor>>,
}

impl EngineBuilder {
    #[must_use]
    pub fn with_stage(mut self, hook: StageHook, stage: impl RequestStage + 'static) -> Self {
        match hook {
            StageHook::OnRequest => self.on_request.push(Arc::new(stage)),
            StageHook::PreExecution => self.pre_execution.push(Arc::new(stage)),
        }
        self
    }

    /// Register an interceptor compiled into every field's resolver
    /// pipeline, in registration order, ending in the field's resolver.
    #[must_use]
    pub fn with_field_interceptor(mut self, interceptor: impl FieldInterceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn finish(self) -> Engine {
        let interceptors: Arc<[Arc<dyn FieldInterceptor>]> = self.interceptors.into();

        let mut stages: Vec<Arc<dyn RequestStage>> = Vec::new();
        stages.extend(self.on_request);
        stages.push(Arc::new(ParseStage));
        stages.push(Arc::new(ResolveOperationStage));
        stages.push(Arc::new(CoerceVariablesStage));
        stages.push(Arc::new(BindOperationStage { interceptors }));
        stages.push(Arc::new(ComplexityControlStage));
        stages.extend(self.pre_execution);
        stages.push(Arc::new(ExecuteStage));

        Engine {
            schema: self.schema,
            stages: stages.into(),
        }
    }
}
