use error::{ErrorCode, GraphqlError, GraphqlResult};
use operation::BoundField;
use schema::{ResolvedValue, ResolverInput, ScopedData, TypeDefinition};
use tracing::Instrument;

use super::{container::SelectionContext, list::resolve_list, resolve_container, set_error_path};
use crate::{execution::ExecutionContext, QueryPath};

/// Resolve one field of `parent_type` and complete its value against the
/// declared type.
///
/// A failing nullable field records its error and yields `null`; a failing
/// non-nullable field propagates, nulling out the nearest nullable ancestor.
pub(crate) async fn resolve_field(
    ctx: &ExecutionContext,
    parent_type: &str,
    field: &BoundField,
    path: QueryPath,
    scoped: ScopedData,
    parent: ResolvedValue,
) -> GraphqlResult<serde_json::Value> {
    if field.is_typename() {
        return Ok(serde_json::Value::String(parent_type.to_string()));
    }

    let result = resolve_field_inner(ctx, field, &path, scoped, parent)
        .await
        .map_err(|error| set_error_path(error, &path));

    match result {
        Ok(value) => Ok(value),
        Err(error) if field.definition.ty.is_nullable() => {
            ctx.add_error(error);
            Ok(serde_json::Value::Null)
        }
        Err(error) => {
            // Propagate to a parent that can null itself out.
            Err(error)
        }
    }
}

async fn resolve_field_inner(
    ctx: &ExecutionContext,
    field: &BoundField,
    path: &QueryPath,
    scoped: ScopedData,
    parent: ResolvedValue,
) -> GraphqlResult<serde_json::Value> {
    let arguments = field.resolve_arguments(&ctx.variables)?;
    let resolved = run_field_resolver(ctx, field, scoped.clone(), parent, arguments).await?;

    // Scope updates the resolver made are visible below this field only.
    let child_scope = resolved.scoped().cloned().unwrap_or(scoped);

    if field.definition.ty.is_list() {
        return resolve_list(ctx, field, path, child_scope, resolved).await;
    }

    let named_type = field.definition.ty.named_type();
    let type_definition = ctx.schema.type_by_name(named_type).ok_or_else(|| {
        tracing::error!(ty = named_type, "bound field references an unknown type");
        GraphqlError::internal_server_error()
    })?;

    if type_definition.is_leaf() {
        complete_leaf(field, resolved)
    } else {
        resolve_container_field(ctx, field, type_definition, path, child_scope, resolved).await
    }
}

fn complete_leaf(field: &BoundField, resolved: ResolvedValue) -> GraphqlResult<serde_json::Value> {
    if resolved.is_null() && field.definition.ty.is_non_null() {
        return Err(GraphqlError::new(
            format!(
                "An error happened while fetching `{}`, expected a non null value but found a null",
                field.name
            ),
            ErrorCode::ResolverError,
        )
        .with_location(field.pos));
    }
    Ok(resolved.take())
}

async fn resolve_container_field(
    ctx: &ExecutionContext,
    field: &BoundField,
    type_definition: &TypeDefinition,
    path: &QueryPath,
    scoped: ScopedData,
    resolved: ResolvedValue,
) -> GraphqlResult<serde_json::Value> {
    if resolved.is_null() {
        if field.definition.ty.is_non_null() {
            return Err(GraphqlError::new(
                format!(
                    "An error occurred while fetching `{}`, a non-nullable value was expected but no value was found.",
                    field.name
                ),
                ErrorCode::ResolverError,
            )
            .with_location(field.pos));
        }
        return Ok(serde_json::Value::Null);
    }

    resolve_container(SelectionContext {
        ctx,
        type_name: type_definition.name(),
        selection: &field.selection_set,
        path: path.clone(),
        scoped,
        parent: resolved,
    })
    .await
}

/// Invoke the field's cached pipeline: interceptors first, the resolver last.
///
/// Gated on the per-request concurrency cap and raced against the request's
/// cancellation signal so an unresponsive resolver cannot outlive the
/// request.
pub(super) async fn run_field_resolver(
    ctx: &ExecutionContext,
    field: &BoundField,
    scoped: ScopedData,
    parent: ResolvedValue,
    arguments: indexmap::IndexMap<async_graphql_value::Name, async_graphql_value::ConstValue>,
) -> GraphqlResult<ResolvedValue> {
    let input = ResolverInput {
        parent_type: field.parent_type.clone(),
        field_name: field.name.to_string(),
        parent,
        arguments,
        data: ctx.data.clone(),
        scoped,
        cancellation: ctx.cancellation.clone(),
    };

    let _permit = ctx
        .resolver_permits
        .acquire()
        .await
        .map_err(|_| GraphqlError::request_cancelled())?;

    let span = tracing::info_span!(
        "resolver",
        parent_type = %field.parent_type,
        field = %field.name,
    );
    let resolve_fut = field.pipeline.run(input).instrument(span);

    tokio::select! {
        biased;
        () = ctx.cancellation.cancelled() => Err(GraphqlError::request_cancelled()),
        result = resolve_fut => result.map_err(|error| {
            if error.locations.is_empty() {
                error.with_location(field.pos)
            } else {
                error
            }
        }),
    }
}
