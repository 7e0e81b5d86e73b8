use std::iter::Peekable;

use async_recursion::async_recursion;
use error::{ErrorCode, GraphqlError, GraphqlResult};
use operation::BoundField;
use schema::{FieldType, ResolvedValue, ScopedData, WrappingType, WrappingTypeIter};

use super::{container::SelectionContext, resolve_container, set_error_path};
use crate::{execution::ExecutionContext, QueryPath};

/// Resolve a list by completing each of the items concurrently, preserving
/// the output order.
pub(crate) async fn resolve_list(
    ctx: &ExecutionContext,
    field: &BoundField,
    path: &QueryPath,
    scoped: ScopedData,
    value: ResolvedValue,
) -> GraphqlResult<serde_json::Value> {
    let list_kinds = ListNullabilityIter::new(&field.definition.ty).collect::<Vec<_>>();
    resolve_list_level(ctx, field, &list_kinds, path.clone(), scoped, value).await
}

#[async_recursion]
async fn resolve_list_level(
    ctx: &ExecutionContext,
    field: &BoundField,
    list_kinds: &[ListKind],
    path: QueryPath,
    scoped: ScopedData,
    value: ResolvedValue,
) -> GraphqlResult<serde_json::Value> {
    // No list wrapper left: this is the innermost item.
    let Some(list_kind) = list_kinds.first() else {
        return resolve_item(ctx, field, path, scoped, value).await;
    };

    let len = match (list_kind, value.data_resolved()) {
        (ListKind::NullableList(_), serde_json::Value::Null) => {
            return Ok(serde_json::Value::Null);
        }
        (ListKind::NonNullList(_), serde_json::Value::Null) => {
            return Err(set_error_path(
                GraphqlError::new(
                    format!(
                        "An error occurred while fetching `{}`, a non-nullable value was expected but no value was found.",
                        field.name
                    ),
                    ErrorCode::ResolverError,
                )
                .with_location(field.pos),
                &path,
            ));
        }
        (_, serde_json::Value::Array(items)) => items.len(),
        (_, other) => {
            return Err(set_error_path(
                GraphqlError::new(
                    format!("Encountered a {} where we expected a list", json_kind_str(other)),
                    ErrorCode::ResolverError,
                )
                .with_location(field.pos),
                &path,
            ));
        }
    };

    let futures = (0..len).map(|index| {
        let item = value.get_index(index);
        let item_path = path.child(index);
        let scoped = scoped.clone();
        resolve_list_level(ctx, field, &list_kinds[1..], item_path, scoped, item)
    });

    let mut children = Vec::with_capacity(len);
    for (index, result) in futures_util::future::join_all(futures).await.into_iter().enumerate() {
        // Error propagation and nullability are validated per item.
        match result {
            Ok(serde_json::Value::Null) if list_kind.has_non_null_item() => {
                let mut error = GraphqlError::new(
                    format!(
                        "An error occurred while fetching `{}`, a non-nullable value was expected but no value was found.",
                        field.name
                    ),
                    ErrorCode::ResolverError,
                )
                .with_location(field.pos);
                error.path = Some((&path.child(index)).into());
                return Err(error);
            }
            Ok(value) => children.push(value),
            Err(error) if list_kind.has_nullable_item() => {
                ctx.add_error(error);
                children.push(serde_json::Value::Null);
            }
            Err(error) => return Err(error),
        }
    }

    Ok(serde_json::Value::Array(children))
}

async fn resolve_item(
    ctx: &ExecutionContext,
    field: &BoundField,
    path: QueryPath,
    scoped: ScopedData,
    item: ResolvedValue,
) -> GraphqlResult<serde_json::Value> {
    if item.is_null() {
        // The enclosing level enforces item nullability.
        return Ok(serde_json::Value::Null);
    }

    let named_type = field.definition.ty.named_type();
    let type_definition = ctx.schema.type_by_name(named_type).ok_or_else(|| {
        tracing::error!(ty = named_type, "bound field references an unknown type");
        GraphqlError::internal_server_error()
    })?;

    if type_definition.is_leaf() {
        return Ok(item.take());
    }

    resolve_container(SelectionContext {
        ctx,
        type_name: type_definition.name(),
        selection: &field.selection_set,
        path: path.clone(),
        scoped,
        parent: item,
    })
    .await
    .map_err(|error| set_error_path(error, &path))
}

/// The nullability of a list _and_ its contents.
#[derive(Debug, PartialEq, Clone, Copy)]
enum ListKind {
    NullableList(ListInner),
    NonNullList(ListInner),
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum ListInner {
    Nullable,
    NonNullable,
}

impl ListKind {
    fn has_nullable_item(self) -> bool {
        matches!(self.inner_nullability(), ListInner::Nullable)
    }

    fn has_non_null_item(self) -> bool {
        matches!(self.inner_nullability(), ListInner::NonNullable)
    }

    fn inner_nullability(self) -> ListInner {
        match self {
            ListKind::NullableList(inner) => inner,
            ListKind::NonNullList(inner) => inner,
        }
    }
}

/// An iterator over the nullability of the lists in a wrapped type,
/// outermost list first.
struct ListNullabilityIter<'a>(Peekable<WrappingTypeIter<'a>>);

impl<'a> ListNullabilityIter<'a> {
    fn new(ty: &'a FieldType) -> Self {
        ListNullabilityIter(ty.wrapping_types().peekable())
    }
}

impl Iterator for ListNullabilityIter<'_> {
    type Item = ListKind;

    fn next(&mut self) -> Option<Self::Item> {
        let mut nullable = true;
        loop {
            match self.0.next()? {
                WrappingType::NonNull => {
                    nullable = false;
                    continue;
                }
                WrappingType::List => {
                    let inner = match self.0.peek() {
                        Some(WrappingType::NonNull) => ListInner::NonNullable,
                        _ => ListInner::Nullable,
                    };
                    return Some(if nullable {
                        ListKind::NullableList(inner)
                    } else {
                        ListKind::NonNullList(inner)
                    });
                }
            }
        }
    }
}

fn json_kind_str(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn list_nullability(ty: &str) -> Vec<ListKind> {
        ListNullabilityIter::new(&FieldType::from(ty)).collect()
    }

    #[test]
    fn test_list_nullability_iter() {
        assert_eq!(list_nullability("String"), vec![]);
        assert_eq!(list_nullability("String!"), vec![]);
        assert_eq!(
            list_nullability("[String!]"),
            vec![ListKind::NullableList(ListInner::NonNullable)]
        );
        assert_eq!(
            list_nullability("[String!]!"),
            vec![ListKind::NonNullList(ListInner::NonNullable)]
        );
        assert_eq!(
            list_nullability("[String]!"),
            vec![ListKind::NonNullList(ListInner::Nullable)]
        );
        assert_eq!(
            list_nullability("[[String!]!]"),
            vec![
                ListKind::NullableList(ListInner::NonNullable),
                ListKind::NonNullList(ListInner::NonNullable)
            ]
        );
        assert_eq!(
            list_nullability("[[String!]]!"),
            vec![
                ListKind::NonNullList(ListInner::Nullable),
                ListKind::NullableList(ListInner::NonNullable)
            ]
        );
    }
}
