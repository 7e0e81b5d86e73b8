use async_graphql_value::ConstValue;
use indexmap::IndexMap;

use crate::{CostAnnotation, FieldType, Resolver};

#[derive(Debug, Clone)]
pub enum TypeDefinition {
    Scalar(ScalarDefinition),
    Object(ObjectDefinition),
    Enum(EnumDefinition),
    InputObject(InputObjectDefinition),
}

impl TypeDefinition {
    pub fn name(&self) -> &str {
        match self {
            TypeDefinition::Scalar(scalar) => &scalar.name,
            TypeDefinition::Object(object) => &object.name,
            TypeDefinition::Enum(r#enum) => &r#enum.name,
            TypeDefinition::InputObject(input_object) => &input_object.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TypeDefinition::Scalar(_) => "scalar",
            TypeDefinition::Object(_) => "object",
            TypeDefinition::Enum(_) => "enum",
            TypeDefinition::InputObject(_) => "input object",
        }
    }

    /// Leaf types terminate a selection; only objects can have sub-selections.
    pub fn is_leaf(&self) -> bool {
        matches!(self, TypeDefinition::Scalar(_) | TypeDefinition::Enum(_))
    }

    pub fn as_object(&self) -> Option<&ObjectDefinition> {
        match self {
            TypeDefinition::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl From<ScalarDefinition> for TypeDefinition {
    fn from(scalar: ScalarDefinition) -> Self {
        TypeDefinition::Scalar(scalar)
    }
}

impl From<ObjectDefinition> for TypeDefinition {
    fn from(object: ObjectDefinition) -> Self {
        TypeDefinition::Object(object)
    }
}

impl From<EnumDefinition> for TypeDefinition {
    fn from(r#enum: EnumDefinition) -> Self {
        TypeDefinition::Enum(r#enum)
    }
}

impl From<InputObjectDefinition> for TypeDefinition {
    fn from(input_object: InputObjectDefinition) -> Self {
        TypeDefinition::InputObject(input_object)
    }
}

#[derive(Debug, Clone)]
pub struct ScalarDefinition {
    pub name: String,
    pub ty: ScalarType,
}

impl ScalarDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let ty = ScalarType::from_scalar_name(&name);
        ScalarDefinition { name, ty }
    }
}

/// The parse contract of a scalar. Custom scalars are `Unknown` and pass
/// through coercion untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    String,
    Float,
    Int,
    Boolean,
    Unknown,
}

impl ScalarType {
    pub fn from_scalar_name(name: &str) -> ScalarType {
        match name {
            "String" => ScalarType::String,
            "Float" => ScalarType::Float,
            "Int" => ScalarType::Int,
            "Boolean" => ScalarType::Boolean,
            _ => ScalarType::Unknown,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObjectDefinition {
    pub name: String,
    pub fields: IndexMap<String, FieldDefinition>,
}

impl ObjectDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        ObjectDefinition {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }
}

#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub ty: FieldType,
    pub args: IndexMap<String, InputValueDefinition>,
    pub cost: Option<CostAnnotation>,
    pub resolver: Resolver,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, ty: impl Into<FieldType>) -> Self {
        FieldDefinition {
            name: name.into(),
            ty: ty.into(),
            args: IndexMap::new(),
            cost: None,
            resolver: Resolver::default(),
        }
    }

    #[must_use]
    pub fn argument(mut self, argument: InputValueDefinition) -> Self {
        self.args.insert(argument.name.clone(), argument);
        self
    }

    #[must_use]
    pub fn with_cost(mut self, cost: CostAnnotation) -> Self {
        self.cost = Some(cost);
        self
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Attach a resolver function. Shorthand for
    /// `with_resolver(Resolver::Function(ResolverFunction::new(f)))`.
    #[must_use]
    pub fn resolve<F, Fut>(self, function: F) -> Self
    where
        F: Fn(crate::ResolverInput) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = error::GraphqlResult<crate::ResolvedValue>> + Send + 'static,
    {
        self.with_resolver(Resolver::Function(crate::ResolverFunction::new(function)))
    }
}

#[derive(Debug, Clone)]
pub struct InputValueDefinition {
    pub name: String,
    pub ty: FieldType,
    pub default_value: Option<ConstValue>,
}

impl InputValueDefinition {
    pub fn new(name: impl Into<String>, ty: impl Into<FieldType>) -> Self {
        InputValueDefinition {
            name: name.into(),
            ty: ty.into(),
            default_value: None,
        }
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<ConstValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct EnumDefinition {
    pub name: String,
    pub values: Vec<String>,
}

impl EnumDefinition {
    pub fn new<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        EnumDefinition {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|candidate| candidate == value)
    }
}

#[derive(Debug, Clone)]
pub struct InputObjectDefinition {
    pub name: String,
    pub input_fields: IndexMap<String, InputValueDefinition>,
}

impl InputObjectDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        InputObjectDefinition {
            name: name.into(),
            input_fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn input_field(mut self, field: InputValueDefinition) -> Self {
        self.input_fields.insert(field.name.clone(), field);
        self
    }
}
