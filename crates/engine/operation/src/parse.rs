use std::collections::HashMap;

use async_graphql_parser::{
    parse_query,
    types::{DocumentOperations, ExecutableDocument, FragmentDefinition, OperationDefinition, OperationType},
    Positioned,
};
use async_graphql_value::Name;

use crate::ParseError;

/// The one operation of a request, picked out of a possibly multi-operation
/// document. Immutable once selected.
#[derive(Debug)]
pub struct SelectedOperation {
    pub name: Option<String>,
    pub definition: Positioned<OperationDefinition>,
    pub fragments: HashMap<Name, Positioned<FragmentDefinition>>,
}

impl SelectedOperation {
    pub fn ty(&self) -> OperationType {
        self.definition.node.ty
    }
}

/// Run the external parser over the request text.
pub fn parse_document(query: &str) -> Result<ExecutableDocument, ParseError> {
    parse_query(query).map_err(|err| ParseError::Syntax {
        message: err.to_string(),
    })
}

/// Pick the operation to execute.
///
/// A single-operation document is selected as-is; a name hint that cannot be
/// matched is a hard error either way. Anonymous operations can never be
/// matched by name.
pub fn select_operation(
    document: ExecutableDocument,
    operation_name: Option<&str>,
) -> Result<SelectedOperation, ParseError> {
    let fragments = document.fragments;

    let (name, definition) = if let Some(operation_name) = operation_name.filter(|name| !name.is_empty()) {
        match document.operations {
            DocumentOperations::Single(_) => None,
            DocumentOperations::Multiple(mut operations) => operations
                .remove(operation_name)
                .map(|operation| (Some(operation_name.to_string()), operation)),
        }
        .ok_or_else(|| ParseError::UnknownOperation {
            name: operation_name.to_string(),
        })?
    } else {
        match document.operations {
            DocumentOperations::Single(operation) => (None, operation),
            DocumentOperations::Multiple(operations) if operations.len() == 1 => {
                let (name, operation) = operations.into_iter().next().expect("just checked the length");
                (Some(name.to_string()), operation)
            }
            DocumentOperations::Multiple(_) => return Err(ParseError::OperationNameRequired),
        }
    };

    Ok(SelectedOperation {
        name,
        definition,
        fragments,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn select(query: &str, name: Option<&str>) -> Result<SelectedOperation, ParseError> {
        select_operation(parse_document(query).unwrap(), name)
    }

    const TWO_OPERATIONS: &str = "query a { x } query b { y }";

    #[test]
    fn anonymous_single_operation_needs_no_name() {
        let operation = select("{ x }", None).unwrap();
        assert_eq!(operation.name, None);
        assert_eq!(operation.ty(), OperationType::Query);
    }

    #[test]
    fn named_single_operation_is_selected_without_a_hint() {
        let operation = select("mutation doIt { x }", None).unwrap();
        assert_eq!(operation.name.as_deref(), Some("doIt"));
        assert_eq!(operation.ty(), OperationType::Mutation);
    }

    #[test]
    fn multiple_operations_require_a_name() {
        let err = select(TWO_OPERATIONS, None).unwrap_err();
        assert!(matches!(err, ParseError::OperationNameRequired));
    }

    #[test]
    fn matching_name_selects_the_operation() {
        let operation = select(TWO_OPERATIONS, Some("a")).unwrap();
        assert_eq!(operation.name.as_deref(), Some("a"));
    }

    #[test]
    fn unknown_name_is_an_error() {
        let err = select(TWO_OPERATIONS, Some("c")).unwrap_err();
        assert_eq!(err.to_string(), r#"Unknown operation named "c""#);
    }

    #[test]
    fn name_hint_cannot_match_an_anonymous_operation() {
        let err = select("{ x }", Some("a")).unwrap_err();
        assert!(matches!(err, ParseError::UnknownOperation { .. }));
    }

    #[test]
    fn empty_name_hint_counts_as_no_hint() {
        assert!(select("{ x }", Some("")).is_ok());
        assert!(matches!(
            select(TWO_OPERATIONS, Some("")).unwrap_err(),
            ParseError::OperationNameRequired
        ));
    }

    #[test]
    fn syntax_errors_come_from_the_parser() {
        assert!(matches!(
            parse_document("query {").unwrap_err(),
            ParseError::Syntax { .. }
        ));
    }
}
