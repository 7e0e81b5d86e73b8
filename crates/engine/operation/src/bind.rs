use std::{collections::HashMap, sync::Arc};

use async_graphql_parser::{
    types::{Directive, FragmentDefinition, OperationType, Selection, SelectionSet},
    Pos, Positioned,
};
use async_graphql_value::{ConstValue, Name, Value, Variables};
use error::{ErrorCode, GraphqlError, GraphqlResult};
use indexmap::IndexMap;
use schema::{FieldDefinition, FieldInterceptor, ObjectDefinition, Resolver, ResolverPipeline, Schema};

use crate::{BindError, SelectedOperation};

/// The selection tree of one operation, bound against the schema.
///
/// Built once per request after variable coercion and reused by every
/// subsequent pass: cost analysis walks it, and the executor resolves it.
#[derive(Debug)]
pub struct BoundOperation {
    pub ty: OperationType,
    pub root_type: String,
    pub selection_set: Vec<BoundField>,
}

/// One field invocation within the selection tree.
///
/// Arguments are kept in raw form (literal or variable reference) and
/// resolved per pass; the per-field resolver pipeline is compiled here, once.
#[derive(Debug)]
pub struct BoundField {
    pub parent_type: String,
    pub response_key: Name,
    pub name: Name,
    pub definition: FieldDefinition,
    pub arguments: Vec<(Positioned<Name>, Positioned<Value>)>,
    pub pos: Pos,
    pub selection_set: Vec<BoundField>,
    pub pipeline: ResolverPipeline,
}

impl BoundField {
    pub fn is_typename(&self) -> bool {
        self.name.as_str() == "__typename"
    }

    /// Build the argument map for one pass: literals as written, variable
    /// references resolved from the coerced variable values, declared
    /// argument defaults filled in for arguments the query does not provide.
    pub fn resolve_arguments(&self, variables: &Variables) -> GraphqlResult<IndexMap<Name, ConstValue>> {
        let mut arguments = IndexMap::new();
        for (name, value) in &self.arguments {
            let pos = value.pos;
            let value = value.node.clone().into_const_with(|variable_name| {
                variables.get(&variable_name).cloned().ok_or_else(|| {
                    GraphqlError::new(
                        format!("Variable ${variable_name} is not defined"),
                        ErrorCode::VariableError,
                    )
                    .with_location(pos)
                })
            })?;
            arguments.insert(name.node.clone(), value);
        }

        for (name, definition) in &self.definition.args {
            if !arguments.contains_key(name.as_str()) {
                if let Some(default) = &definition.default_value {
                    arguments.insert(Name::new(name), default.clone());
                }
            }
        }

        Ok(arguments)
    }
}

/// Bind the selected operation's selections against the schema.
///
/// Prunes `@skip`/`@include`d selections, flattens fragment spreads, checks
/// the operation limits and attaches each field's resolver pipeline.
pub fn bind_operation(
    schema: &Schema,
    operation: &SelectedOperation,
    variables: &Variables,
    interceptors: Arc<[Arc<dyn FieldInterceptor>]>,
) -> Result<BoundOperation, BindError> {
    let root = match operation.ty() {
        OperationType::Query => schema.query_root().ok_or(BindError::NoQueryDefined)?,
        OperationType::Mutation => schema.mutation_root().ok_or(BindError::NoMutationDefined)?,
        OperationType::Subscription => schema.subscription_root().ok_or(BindError::NoSubscriptionDefined)?,
    };

    let mut binder = Binder {
        schema,
        fragments: &operation.fragments,
        variables,
        interceptors,
        fragment_stack: Vec::new(),
        max_depth: 0,
        aliases: 0,
    };

    let selection_set = binder.bind_selection_set(root, &operation.definition.node.selection_set, 1)?;

    let limits = schema.settings.operation_limits;
    if let Some(max_depth) = limits.depth {
        if binder.max_depth > max_depth as usize {
            return Err(BindError::QueryTooDeep);
        }
    }
    if let Some(max_root_fields) = limits.root_fields {
        if selection_set.len() > max_root_fields as usize {
            return Err(BindError::QueryContainsTooManyRootFields);
        }
    }
    if let Some(max_aliases) = limits.aliases {
        if binder.aliases > max_aliases as usize {
            return Err(BindError::QueryContainsTooManyAliases);
        }
    }

    Ok(BoundOperation {
        ty: operation.ty(),
        root_type: root.name.clone(),
        selection_set,
    })
}

struct Binder<'a> {
    schema: &'a Schema,
    fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    variables: &'a Variables,
    interceptors: Arc<[Arc<dyn FieldInterceptor>]>,
    fragment_stack: Vec<String>,
    max_depth: usize,
    aliases: usize,
}

impl Binder<'_> {
    fn bind_selection_set(
        &mut self,
        object: &ObjectDefinition,
        selection_set: &Positioned<SelectionSet>,
        depth: usize,
    ) -> Result<Vec<BoundField>, BindError> {
        self.max_depth = self.max_depth.max(depth);

        let mut fields = Vec::new();
        for selection in &selection_set.node.items {
            if self.is_skipped(selection.node.directives()) {
                continue;
            }

            match &selection.node {
                Selection::Field(field) => {
                    fields.push(self.bind_field(object, field, depth)?);
                }
                Selection::FragmentSpread(spread) => {
                    let name = &spread.node.fragment_name.node;
                    if self.fragment_stack.iter().any(|candidate| candidate == name.as_str()) {
                        let mut cycle = self.fragment_stack.clone();
                        cycle.push(name.to_string());
                        return Err(BindError::FragmentCycle {
                            cycle,
                            location: spread.pos,
                        });
                    }
                    let fragment = self.fragments.get(name).ok_or_else(|| BindError::UnknownFragment {
                        name: name.to_string(),
                        location: spread.pos,
                    })?;
                    // A type condition naming another concrete type never
                    // applies; the spread is pruned.
                    if fragment.node.type_condition.node.on.node.as_str() != object.name {
                        continue;
                    }
                    self.fragment_stack.push(name.to_string());
                    fields.extend(self.bind_selection_set(object, &fragment.node.selection_set, depth)?);
                    self.fragment_stack.pop();
                }
                Selection::InlineFragment(inline) => {
                    if let Some(condition) = &inline.node.type_condition {
                        if condition.node.on.node.as_str() != object.name {
                            continue;
                        }
                    }
                    fields.extend(self.bind_selection_set(object, &inline.node.selection_set, depth)?);
                }
            }
        }
        Ok(fields)
    }

    fn bind_field(
        &mut self,
        object: &ObjectDefinition,
        field: &Positioned<async_graphql_parser::types::Field>,
        depth: usize,
    ) -> Result<BoundField, BindError> {
        if field.node.alias.is_some() {
            self.aliases += 1;
        }

        let name = field.node.name.node.clone();
        let response_key = field.node.response_key().node.clone();

        if name.as_str() == "__typename" {
            return Ok(BoundField {
                parent_type: object.name.clone(),
                response_key,
                name,
                definition: FieldDefinition::new("__typename", "String!"),
                arguments: Vec::new(),
                pos: field.pos,
                selection_set: Vec::new(),
                pipeline: ResolverPipeline::new(Vec::new().into(), Resolver::Parent),
            });
        }

        let definition = object
            .field_by_name(name.as_str())
            .ok_or_else(|| BindError::UnknownField {
                container: object.name.clone(),
                name: name.to_string(),
                location: field.pos,
            })?
            .clone();

        for (argument_name, _) in &field.node.arguments {
            if !definition.args.contains_key(argument_name.node.as_str()) {
                return Err(BindError::UnknownArgument {
                    field: name.to_string(),
                    name: argument_name.node.to_string(),
                    location: argument_name.pos,
                });
            }
        }
        for (argument_name, argument) in &definition.args {
            let provided = field
                .node
                .arguments
                .iter()
                .any(|(candidate, _)| candidate.node.as_str() == argument_name);
            if !provided && argument.ty.is_non_null() && argument.default_value.is_none() {
                return Err(BindError::MissingArgument {
                    field: name.to_string(),
                    name: argument_name.clone(),
                    location: field.pos,
                });
            }
        }

        let named_type = definition.ty.named_type();
        let field_type = self
            .schema
            .type_by_name(named_type)
            .ok_or_else(|| BindError::UnknownType {
                name: named_type.to_string(),
                location: field.pos,
            })?;

        let has_selection = !field.node.selection_set.node.items.is_empty();
        let selection_set = if field_type.is_leaf() {
            if has_selection {
                return Err(BindError::CannotHaveSelectionSet {
                    name: name.to_string(),
                    ty: field_type.kind().to_string(),
                    location: field.pos,
                });
            }
            Vec::new()
        } else {
            let Some(child_object) = field_type.as_object() else {
                return Err(BindError::InvalidOutputType {
                    name: name.to_string(),
                    ty: named_type.to_string(),
                    location: field.pos,
                });
            };
            if !has_selection {
                return Err(BindError::LeafMustBeAScalarOrEnum {
                    name: name.to_string(),
                    ty: field_type.kind().to_string(),
                    location: field.pos,
                });
            }
            self.bind_selection_set(child_object, &field.node.selection_set, depth + 1)?
        };

        let pipeline = ResolverPipeline::new(self.interceptors.clone(), definition.resolver.clone());

        Ok(BoundField {
            parent_type: object.name.clone(),
            response_key,
            name,
            definition,
            arguments: field.node.arguments.clone(),
            pos: field.pos,
            selection_set,
            pipeline,
        })
    }

    /// `@skip` / `@include` against the coerced variables. Malformed
    /// conditions leave the selection in place.
    fn is_skipped(&self, directives: &[Positioned<Directive>]) -> bool {
        for directive in directives {
            let include = match directive.node.name.node.as_str() {
                "skip" => false,
                "include" => true,
                _ => continue,
            };

            if let Some(condition) = directive.node.get_argument("if") {
                let value = condition
                    .node
                    .clone()
                    .into_const_with(|name| self.variables.get(&name).cloned().ok_or(()))
                    .unwrap_or_default();
                let value = matches!(value, ConstValue::Boolean(true));
                if include != value {
                    return true;
                }
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use schema::InputValueDefinition;
    use serde_json::json;

    use super::*;
    use crate::{parse_document, select_operation};

    fn test_schema() -> Schema {
        Schema::builder()
            .register(
                ObjectDefinition::new("Query")
                    .field(FieldDefinition::new("user", "User"))
                    .field(
                        FieldDefinition::new("greeting", "String")
                            .argument(InputValueDefinition::new("name", "String!")),
                    ),
            )
            .register(
                ObjectDefinition::new("User")
                    .field(FieldDefinition::new("id", "ID!"))
                    .field(FieldDefinition::new("name", "String")),
            )
            .finish()
    }

    fn bind(query: &str, variables: serde_json::Value) -> Result<BoundOperation, BindError> {
        bind_with_schema(&test_schema(), query, variables)
    }

    fn bind_with_schema(
        schema: &Schema,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<BoundOperation, BindError> {
        let operation = select_operation(parse_document(query).unwrap(), None).unwrap();
        let variables = Variables::from_json(variables);
        bind_operation(schema, &operation, &variables, Vec::new().into())
    }

    fn keys(operation: &BoundOperation) -> Vec<&str> {
        operation
            .selection_set
            .iter()
            .map(|field| field.response_key.as_str())
            .collect()
    }

    #[test]
    fn binds_fields_in_document_order() {
        let operation = bind("{ user { name id } greeting(name: \"hi\") }", json!({})).unwrap();
        assert_eq!(keys(&operation), vec!["user", "greeting"]);
        assert_eq!(
            operation.selection_set[0]
                .selection_set
                .iter()
                .map(|field| field.name.as_str())
                .collect::<Vec<_>>(),
            vec!["name", "id"]
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = bind("{ nope }", json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Query does not have a field named 'nope'");
    }

    #[test]
    fn selection_set_on_a_leaf_is_rejected() {
        let err = bind("{ user { id { x } } }", json!({})).unwrap_err();
        assert!(matches!(err, BindError::CannotHaveSelectionSet { .. }));
    }

    #[test]
    fn composite_without_selection_set_is_rejected() {
        let err = bind("{ user }", json!({})).unwrap_err();
        assert!(matches!(err, BindError::LeafMustBeAScalarOrEnum { .. }));
    }

    #[test]
    fn missing_required_argument_is_rejected() {
        let err = bind("{ greeting }", json!({})).unwrap_err();
        assert!(matches!(err, BindError::MissingArgument { .. }));
    }

    #[test]
    fn unknown_argument_is_rejected() {
        let err = bind("{ greeting(name: \"x\", nope: 1) }", json!({})).unwrap_err();
        assert!(matches!(err, BindError::UnknownArgument { .. }));
    }

    #[test]
    fn skip_and_include_prune_selections() {
        let operation = bind(
            "query q($yes: Boolean, $no: Boolean) { user @skip(if: $yes) { id } greeting(name: \"x\") @include(if: $no) }",
            json!({ "yes": true, "no": false }),
        )
        .unwrap();
        assert!(keys(&operation).is_empty());
    }

    #[test]
    fn fragments_flatten_into_the_parent_selection() {
        let operation = bind(
            "query { user { ...userFields } } fragment userFields on User { id name }",
            json!({}),
        )
        .unwrap();
        assert_eq!(
            operation.selection_set[0]
                .selection_set
                .iter()
                .map(|field| field.name.as_str())
                .collect::<Vec<_>>(),
            vec!["id", "name"]
        );
    }

    #[test]
    fn mismatched_type_condition_prunes_the_spread() {
        let operation = bind(
            "query { user { ...queryFields } } fragment queryFields on Query { user { id } }",
            json!({}),
        )
        .unwrap();
        assert!(operation.selection_set[0].selection_set.is_empty());
    }

    #[test]
    fn fragment_cycles_are_detected() {
        let err = bind(
            "query { user { ...a } } fragment a on User { ...b } fragment b on User { ...a }",
            json!({}),
        )
        .unwrap_err();
        assert!(matches!(err, BindError::FragmentCycle { .. }));
    }

    #[test]
    fn unknown_fragment_is_an_error() {
        let err = bind("{ user { ...nope } }", json!({})).unwrap_err();
        assert!(matches!(err, BindError::UnknownFragment { .. }));
    }

    #[test]
    fn depth_limit_applies() {
        let schema = Schema::builder()
            .register(
                ObjectDefinition::new("Query")
                    .field(FieldDefinition::new("user", "User"))
                    .field(FieldDefinition::new("id", "ID")),
            )
            .register(
                ObjectDefinition::new("User")
                    .field(FieldDefinition::new("friend", "User"))
                    .field(FieldDefinition::new("id", "ID!")),
            )
            .settings(schema::Settings {
                operation_limits: schema::OperationLimits {
                    depth: Some(2),
                    ..Default::default()
                },
                ..Default::default()
            })
            .finish();

        assert!(bind_with_schema(&schema, "{ user { id } }", json!({})).is_ok());
        let err = bind_with_schema(&schema, "{ user { friend { id } } }", json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Query is nested too deep.");
    }

    #[test]
    fn argument_defaults_fill_in() {
        let schema = Schema::builder()
            .register(
                ObjectDefinition::new("Query").field(
                    FieldDefinition::new("foo", "String")
                        .argument(InputValueDefinition::new("i", "Int").default_value(2)),
                ),
            )
            .finish();
        let operation = bind_with_schema(&schema, "{ foo }", json!({})).unwrap();
        let arguments = operation.selection_set[0]
            .resolve_arguments(&Variables::default())
            .unwrap();
        assert_eq!(arguments.get("i"), Some(&ConstValue::Number(2.into())));
    }

    #[test]
    fn variable_references_resolve_from_coerced_values() {
        let operation = bind("query q($n: String!) { greeting(name: $n) }", json!({})).unwrap();
        let mut variables = Variables::default();
        variables.insert(Name::new("n"), ConstValue::String("hello".to_string()));
        let arguments = operation.selection_set[0].resolve_arguments(&variables).unwrap();
        assert_eq!(arguments.get("name"), Some(&ConstValue::String("hello".to_string())));
    }
}
