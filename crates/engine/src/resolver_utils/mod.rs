mod container;
mod field;
mod list;

pub(crate) use container::{resolve_container, resolve_root_container, resolve_root_container_serial, SelectionContext};

use error::GraphqlError;

use crate::QueryPath;

/// Field-level errors point at the field whose resolution failed; keep the
/// innermost path if one was already set.
pub(crate) fn set_error_path(mut error: GraphqlError, path: &QueryPath) -> GraphqlError {
    if error.path.is_none() {
        error.path = Some(path.into());
    }
    error
}
