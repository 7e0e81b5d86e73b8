//! Resolver contracts.
//!
//! A field is produced by its resolver pipeline: an ordered list of
//! interceptors ending in the field's resolver. The pipeline for a field is
//! compiled once when the selection tree is bound and reused for every
//! resolution pass.

use std::{future::Future, pin::Pin, sync::Arc};

use async_graphql_value::{ConstValue, Name};
use error::GraphqlResult;
use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;

use crate::{Data, ScopedData};

/// Values passed around between resolvers.
///
/// Carries the resolver's JSON output plus the scope updates it made for its
/// descendants. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ResolvedValue {
    data: Arc<serde_json::Value>,
    scoped: Option<ScopedData>,
}

impl ResolvedValue {
    pub fn new(value: serde_json::Value) -> Self {
        ResolvedValue {
            data: Arc::new(value),
            scoped: None,
        }
    }

    pub fn null() -> Self {
        Self::new(serde_json::Value::Null)
    }

    /// Attach scope data visible to this field's descendants only.
    #[must_use]
    pub fn with_scoped(mut self, scoped: ScopedData) -> Self {
        self.scoped = Some(scoped);
        self
    }

    pub fn scoped(&self) -> Option<&ScopedData> {
        self.scoped.as_ref()
    }

    pub fn data_resolved(&self) -> &serde_json::Value {
        &self.data
    }

    pub fn is_null(&self) -> bool {
        self.data.is_null()
    }

    pub fn take(self) -> serde_json::Value {
        Arc::try_unwrap(self.data).unwrap_or_else(|data| (*data).clone())
    }

    /// The named property of the resolved object, `Null` when absent.
    pub fn get_field(&self, name: &str) -> ResolvedValue {
        let value = self.data.get(name).cloned().unwrap_or(serde_json::Value::Null);
        ResolvedValue {
            data: Arc::new(value),
            scoped: self.scoped.clone(),
        }
    }

    /// The list item at `index`, `Null` when out of bounds.
    pub fn get_index(&self, index: usize) -> ResolvedValue {
        let value = self.data.get(index).cloned().unwrap_or(serde_json::Value::Null);
        ResolvedValue {
            data: Arc::new(value),
            scoped: self.scoped.clone(),
        }
    }
}

impl From<serde_json::Value> for ResolvedValue {
    fn from(value: serde_json::Value) -> Self {
        ResolvedValue::new(value)
    }
}

/// Everything one resolver invocation gets to see.
pub struct ResolverInput {
    pub parent_type: String,
    pub field_name: String,
    pub parent: ResolvedValue,
    pub arguments: IndexMap<Name, ConstValue>,
    /// Request-scoped data, shared with every other resolver of the request.
    pub data: Arc<Data>,
    /// Tree-scoped data inherited from the ancestors of this field.
    pub scoped: ScopedData,
    /// Raised when the request timed out or the caller went away. Suspending
    /// resolvers must observe it and stop promptly.
    pub cancellation: CancellationToken,
}

impl ResolverInput {
    pub fn argument(&self, name: &str) -> Option<&ConstValue> {
        self.arguments.get(name)
    }
}

pub type BoxResolverFuture = Pin<Box<dyn Future<Output = GraphqlResult<ResolvedValue>> + Send>>;

/// A user-supplied resolver function bound to a (type, field) pair.
#[derive(Clone)]
pub struct ResolverFunction(Arc<dyn Fn(ResolverInput) -> BoxResolverFuture + Send + Sync>);

impl ResolverFunction {
    pub fn new<F, Fut>(function: F) -> Self
    where
        F: Fn(ResolverInput) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = GraphqlResult<ResolvedValue>> + Send + 'static,
    {
        ResolverFunction(Arc::new(move |input| Box::pin(function(input))))
    }

    pub fn invoke(&self, input: ResolverInput) -> BoxResolverFuture {
        (self.0)(input)
    }
}

impl std::fmt::Debug for ResolverFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverFunction").finish()
    }
}

/// How a field produces its value.
#[derive(Debug, Clone, Default)]
pub enum Resolver {
    /// Forward the parent value untouched to child selections.
    Parent,
    /// Select the property named after the field from the parent object.
    #[default]
    Select,
    Function(ResolverFunction),
}

/// A field-level interceptor, e.g. authorization or instrumentation.
///
/// Interceptors wrap the resolver the same way request stages wrap the
/// pipeline: run logic, then call `next`. Not calling `next` short-circuits
/// the field with a value or an error.
#[async_trait::async_trait]
pub trait FieldInterceptor: Send + Sync {
    async fn resolve(&self, input: ResolverInput, next: NextResolver<'_>) -> GraphqlResult<ResolvedValue>;
}

/// The per-field pipeline cached on a bound selection node.
#[derive(Clone)]
pub struct ResolverPipeline {
    interceptors: Arc<[Arc<dyn FieldInterceptor>]>,
    resolver: Resolver,
}

impl std::fmt::Debug for ResolverPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverPipeline")
            .field("interceptors", &self.interceptors.len())
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl ResolverPipeline {
    pub fn new(interceptors: Arc<[Arc<dyn FieldInterceptor>]>, resolver: Resolver) -> Self {
        ResolverPipeline { interceptors, resolver }
    }

    pub async fn run(&self, input: ResolverInput) -> GraphqlResult<ResolvedValue> {
        NextResolver {
            interceptors: &self.interceptors,
            resolver: &self.resolver,
        }
        .run(input)
        .await
    }
}

/// The remainder of a field's pipeline, handed to each interceptor.
pub struct NextResolver<'a> {
    interceptors: &'a [Arc<dyn FieldInterceptor>],
    resolver: &'a Resolver,
}

impl NextResolver<'_> {
    pub async fn run(self, input: ResolverInput) -> GraphqlResult<ResolvedValue> {
        match self.interceptors.split_first() {
            Some((interceptor, rest)) => {
                interceptor
                    .resolve(
                        input,
                        NextResolver {
                            interceptors: rest,
                            resolver: self.resolver,
                        },
                    )
                    .await
            }
            None => match self.resolver {
                Resolver::Parent => Ok(input.parent),
                Resolver::Select => Ok(input.parent.get_field(&input.field_name)),
                Resolver::Function(function) => function.invoke(input).await,
            },
        }
    }
}
