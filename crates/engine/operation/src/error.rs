use error::{ErrorCode, GraphqlError, Pos};
use itertools::Itertools;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{message}")]
    Syntax { message: String },
    #[error(r#"Unknown operation named "{name}""#)]
    UnknownOperation { name: String },
    #[error("Operation name required in request.")]
    OperationNameRequired,
}

impl ParseError {
    pub fn into_graphql_error(self) -> GraphqlError {
        let code = match &self {
            ParseError::Syntax { .. } => ErrorCode::OperationParsingError,
            ParseError::UnknownOperation { .. } | ParseError::OperationNameRequired => ErrorCode::OperationNotFound,
        };
        GraphqlError::new(self.to_string(), code)
    }
}

/// Where inside a variable's value a coercion failure happened.
#[derive(Debug, Clone, Default)]
pub struct ValuePath(Vec<ValuePathSegment>);

#[derive(Debug, Clone)]
pub enum ValuePathSegment {
    Field(String),
    Index(usize),
}

impl ValuePath {
    pub(crate) fn push(&mut self, segment: impl Into<ValuePathSegment>) {
        self.0.push(segment.into());
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ValuePathSegment {
    fn from(field: &str) -> Self {
        ValuePathSegment::Field(field.to_string())
    }
}

impl From<usize> for ValuePathSegment {
    fn from(index: usize) -> Self {
        ValuePathSegment::Index(index)
    }
}

impl std::fmt::Display for ValuePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        write!(f, " at path '")?;
        for segment in &self.0 {
            match segment {
                ValuePathSegment::Field(field) => write!(f, ".{field}")?,
                ValuePathSegment::Index(index) => write!(f, ".{index}")?,
            }
        }
        write!(f, "'")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VariableError {
    #[error("Variable ${name} is missing")]
    Missing { name: String, location: Pos },
    #[error("Variable ${name} has an invalid value. Found a null where we expected a '{expected}'{path}")]
    UnexpectedNull {
        name: String,
        expected: String,
        path: ValuePath,
        location: Pos,
    },
    #[error("Variable ${name} has an invalid value. Found a {actual} value where we expected a '{expected}' scalar{path}")]
    IncorrectScalarType {
        name: String,
        actual: &'static str,
        expected: String,
        path: ValuePath,
        location: Pos,
    },
    #[error("Variable ${name} has an invalid value. Found value '{actual}' which cannot be coerced into a '{expected}' scalar{path}")]
    IncorrectScalarValue {
        name: String,
        actual: String,
        expected: String,
        path: ValuePath,
        location: Pos,
    },
    #[error("Variable ${name} has an invalid value. Found a {actual} value where we expected an enum value of '{enum_name}'{path}")]
    IncorrectEnumValueType {
        name: String,
        enum_name: String,
        actual: &'static str,
        path: ValuePath,
        location: Pos,
    },
    #[error("Variable ${name} has an invalid value. Unknown enum value '{value}' for enum '{enum_name}'{path}")]
    UnknownEnumValue {
        name: String,
        enum_name: String,
        value: String,
        path: ValuePath,
        location: Pos,
    },
    #[error("Variable ${name} has an invalid value. Found a {actual} value where we expected a '{expected}' input object{path}")]
    MissingObject {
        name: String,
        expected: String,
        actual: &'static str,
        path: ValuePath,
        location: Pos,
    },
    #[error("Variable ${name} has an invalid value. Input object '{input_object}' does not have a field named '{field}'{path}")]
    UnknownInputField {
        name: String,
        input_object: String,
        field: String,
        path: ValuePath,
        location: Pos,
    },
    #[error("Variable ${name} does not have a valid input type: '{ty}'")]
    InvalidVariableType { name: String, ty: String, location: Pos },
    #[error("Variable ${name} references the unknown type '{ty}'")]
    UnknownType { name: String, ty: String, location: Pos },
}

impl VariableError {
    pub fn location(&self) -> Pos {
        match self {
            VariableError::Missing { location, .. }
            | VariableError::UnexpectedNull { location, .. }
            | VariableError::IncorrectScalarType { location, .. }
            | VariableError::IncorrectScalarValue { location, .. }
            | VariableError::IncorrectEnumValueType { location, .. }
            | VariableError::UnknownEnumValue { location, .. }
            | VariableError::MissingObject { location, .. }
            | VariableError::UnknownInputField { location, .. }
            | VariableError::InvalidVariableType { location, .. }
            | VariableError::UnknownType { location, .. } => *location,
        }
    }

    pub fn into_graphql_error(self) -> GraphqlError {
        let location = self.location();
        GraphqlError::new(self.to_string(), ErrorCode::VariableError).with_location(location)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("{container} does not have a field named '{name}'")]
    UnknownField {
        container: String,
        name: String,
        location: Pos,
    },
    #[error("The field `{field}` does not have an argument named `{name}`")]
    UnknownArgument { field: String, name: String, location: Pos },
    #[error("Missing argument named '{name}' for field '{field}'")]
    MissingArgument { field: String, name: String, location: Pos },
    #[error("Unknown fragment named '{name}'")]
    UnknownFragment { name: String, location: Pos },
    #[error("Fragment cycle detected: {}", .cycle.iter().join(", "))]
    FragmentCycle { cycle: Vec<String>, location: Pos },
    #[error("Field '{name}' cannot have a selection set, it's a {ty}. Only objects can.")]
    CannotHaveSelectionSet { name: String, ty: String, location: Pos },
    #[error("Leaf field '{name}' must be a scalar or an enum, but is a {ty}.")]
    LeafMustBeAScalarOrEnum { name: String, ty: String, location: Pos },
    #[error("Field '{name}' has type '{ty}' which cannot be used as an output type.")]
    InvalidOutputType { name: String, ty: String, location: Pos },
    #[error("Unknown type named '{name}'")]
    UnknownType { name: String, location: Pos },
    #[error("Queries are not defined on this schema.")]
    NoQueryDefined,
    #[error("Mutations are not defined on this schema.")]
    NoMutationDefined,
    #[error("Subscriptions are not defined on this schema.")]
    NoSubscriptionDefined,
    #[error("Query is nested too deep.")]
    QueryTooDeep,
    #[error("Query contains too many root fields.")]
    QueryContainsTooManyRootFields,
    #[error("Query contains too many aliases.")]
    QueryContainsTooManyAliases,
}

impl BindError {
    pub fn location(&self) -> Option<Pos> {
        match self {
            BindError::UnknownField { location, .. }
            | BindError::UnknownArgument { location, .. }
            | BindError::MissingArgument { location, .. }
            | BindError::UnknownFragment { location, .. }
            | BindError::FragmentCycle { location, .. }
            | BindError::CannotHaveSelectionSet { location, .. }
            | BindError::LeafMustBeAScalarOrEnum { location, .. }
            | BindError::InvalidOutputType { location, .. }
            | BindError::UnknownType { location, .. } => Some(*location),
            BindError::NoQueryDefined
            | BindError::NoMutationDefined
            | BindError::NoSubscriptionDefined
            | BindError::QueryTooDeep
            | BindError::QueryContainsTooManyRootFields
            | BindError::QueryContainsTooManyAliases => None,
        }
    }

    pub fn into_graphql_error(self) -> GraphqlError {
        let location = self.location();
        let error = GraphqlError::new(self.to_string(), ErrorCode::OperationValidationError);
        match location {
            Some(location) => error.with_location(location),
            None => error,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ComplexityError {
    #[error("Query exceeded complexity limit")]
    ExceedsLimit { cost: u64, limit: u64 },
}

impl ComplexityError {
    pub fn into_graphql_error(self) -> GraphqlError {
        match self {
            ComplexityError::ExceedsLimit { cost, limit } => {
                GraphqlError::new("Query exceeded complexity limit", ErrorCode::OperationValidationError)
                    .with_extension("cost", cost)
                    .with_extension("limit", limit)
            }
        }
    }
}
