pub(crate) mod stages;

use std::sync::Arc;

use crate::{RequestContext, Response};

/// One link of the request-processing chain.
///
/// Stages compose like an onion: a stage may run logic before calling the
/// next link, after it returns, or both. Returning a response without calling
/// `next` short-circuits the request.
#[async_trait::async_trait]
pub trait RequestStage: Send + Sync {
    async fn handle(&self, ctx: &mut RequestContext, next: Next<'_>) -> Response;
}

/// Where a custom stage is inserted relative to the built-in ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageHook {
    /// Outermost: wraps the whole chain, including parsing.
    OnRequest,
    /// After admission control, immediately before the executor.
    PreExecution,
}

/// The remainder of the chain, handed to each stage.
pub struct Next<'a> {
    stages: &'a [Arc<dyn RequestStage>],
}

impl<'a> Next<'a> {
    pub(crate) fn new(stages: &'a [Arc<dyn RequestStage>]) -> Self {
        Next { stages }
    }

    pub async fn run(self, ctx: &mut RequestContext) -> Response {
        match self.stages.split_first() {
            Some((stage, rest)) => stage.handle(ctx, Next { stages: rest }).await,
            None => {
                // The execute stage terminates the chain without calling
                // `next`; running past it is a wiring bug.
                tracing::error!("request pipeline ran out of stages without producing a response");
                Response::request_error([error::GraphqlError::internal_server_error()])
            }
        }
    }
}
