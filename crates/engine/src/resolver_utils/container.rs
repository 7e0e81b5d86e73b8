use std::{future::Future, pin::Pin};

use async_graphql_value::Name;
use error::GraphqlResult;
use operation::BoundField;
use schema::{ResolvedValue, ScopedData};

use super::field::resolve_field;
use crate::{execution::ExecutionContext, QueryPath};

/// A selection set being resolved on one concrete type.
#[derive(Clone)]
pub(crate) struct SelectionContext<'a> {
    pub ctx: &'a ExecutionContext,
    /// The declaring type of this selection set.
    pub type_name: &'a str,
    pub selection: &'a [BoundField],
    pub path: QueryPath,
    /// The tree-scoped bag inherited from the ancestors of this selection.
    pub scoped: ScopedData,
    pub parent: ResolvedValue,
}

type BoxFieldFuture<'a> = Pin<Box<dyn Future<Output = GraphqlResult<(Name, serde_json::Value)>> + Send + 'a>>;

/// Resolve a container by executing each of the fields concurrently.
pub(crate) async fn resolve_root_container(ctx: SelectionContext<'_>) -> GraphqlResult<serde_json::Value> {
    resolve_container_inner(ctx, true).await
}

/// Resolve a container by executing each of the fields serially.
pub(crate) async fn resolve_root_container_serial(ctx: SelectionContext<'_>) -> GraphqlResult<serde_json::Value> {
    resolve_container_inner(ctx, false).await
}

/// Non-root selection sets always resolve their fields concurrently,
/// including the result subtrees of mutation fields.
pub(crate) async fn resolve_container(ctx: SelectionContext<'_>) -> GraphqlResult<serde_json::Value> {
    resolve_container_inner(ctx, true).await
}

async fn resolve_container_inner(ctx: SelectionContext<'_>, parallel: bool) -> GraphqlResult<serde_json::Value> {
    tracing::trace!(ty = ctx.type_name, "resolving selection set");

    let exec = ctx.ctx;
    let type_name = ctx.type_name;

    let mut futures: Vec<BoxFieldFuture<'_>> = Vec::with_capacity(ctx.selection.len());
    for field in ctx.selection {
        let path = ctx.path.child(field.response_key.clone());
        let scoped = ctx.scoped.clone();
        let parent = ctx.parent.clone();
        futures.push(Box::pin(async move {
            let value = resolve_field(exec, type_name, field, path, scoped, parent).await?;
            Ok((field.response_key.clone(), value))
        }));
    }

    let results = if parallel {
        futures_util::future::try_join_all(futures).await?
    } else {
        let mut results = Vec::with_capacity(futures.len());
        for field in futures {
            results.push(field.await?);
        }
        results
    };

    // Final shape always follows the declared field order, whatever order
    // the futures completed in.
    let mut container = serde_json::Map::with_capacity(results.len());
    for (key, value) in results {
        match container.get_mut(key.as_str()) {
            Some(existing) => merge_duplicate_field(existing, value),
            None => {
                container.insert(key.to_string(), value);
            }
        }
    }

    Ok(serde_json::Value::Object(container))
}

/// Duplicate response keys merge pairwise: objects deep-merge, anything else
/// keeps the first occurrence.
fn merge_duplicate_field(existing: &mut serde_json::Value, incoming: serde_json::Value) {
    if let (serde_json::Value::Object(existing), serde_json::Value::Object(incoming)) = (existing, incoming) {
        for (key, value) in incoming {
            match existing.get_mut(&key) {
                Some(slot) => merge_duplicate_field(slot, value),
                None => {
                    existing.insert(key, value);
                }
            }
        }
    }
}
