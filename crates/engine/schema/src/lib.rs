mod config;
mod context;
mod cost;
mod definitions;
mod resolver;
mod type_names;

pub use config::{ComplexityControl, OperationLimits, Settings};
pub use context::{Data, ScopedData};
pub use cost::CostAnnotation;
pub use definitions::{
    EnumDefinition, FieldDefinition, InputObjectDefinition, InputValueDefinition, ObjectDefinition, ScalarDefinition,
    ScalarType, TypeDefinition,
};
pub use resolver::{
    BoxResolverFuture, FieldInterceptor, NextResolver, ResolvedValue, Resolver, ResolverFunction, ResolverInput,
    ResolverPipeline,
};
pub use type_names::{FieldType, WrappingType, WrappingTypeIter};

use std::{ops::Deref, sync::Arc};

use indexmap::IndexMap;

/// The type system one engine executes against.
///
/// Cloning a schema is cheap, so it can be easily shared.
#[derive(Debug, Clone)]
pub struct Schema(Arc<SchemaInner>);

#[derive(Debug)]
pub struct SchemaInner {
    pub types: IndexMap<String, TypeDefinition>,
    pub query_type: String,
    pub mutation_type: Option<String>,
    pub subscription_type: Option<String>,
    pub settings: Settings,
    pub data: Data,
}

impl Deref for Schema {
    type Target = SchemaInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn type_by_name(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn object(&self, name: &str) -> Option<&ObjectDefinition> {
        match self.types.get(name) {
            Some(TypeDefinition::Object(object)) => Some(object),
            _ => None,
        }
    }

    pub fn query_root(&self) -> Option<&ObjectDefinition> {
        self.object(&self.query_type)
    }

    pub fn mutation_root(&self) -> Option<&ObjectDefinition> {
        self.object(self.mutation_type.as_deref()?)
    }

    pub fn subscription_root(&self) -> Option<&ObjectDefinition> {
        self.object(self.subscription_type.as_deref()?)
    }
}

/// Schema builder.
///
/// Validating the registered types is the responsibility of whoever builds
/// the schema; the engine only looks types and fields up.
pub struct SchemaBuilder {
    types: IndexMap<String, TypeDefinition>,
    query_type: String,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
    settings: Settings,
    data: Data,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        SchemaBuilder {
            types: IndexMap::new(),
            query_type: "Query".to_string(),
            mutation_type: None,
            subscription_type: None,
            settings: Settings::default(),
            data: Data::default(),
        }
    }
}

impl SchemaBuilder {
    /// Register a type in the schema. Re-registering a name replaces the
    /// previous definition.
    #[must_use]
    pub fn register(mut self, ty: impl Into<TypeDefinition>) -> Self {
        let ty = ty.into();
        self.types.insert(ty.name().to_string(), ty);
        self
    }

    #[must_use]
    pub fn query_type(mut self, name: impl Into<String>) -> Self {
        self.query_type = name.into();
        self
    }

    #[must_use]
    pub fn mutation_type(mut self, name: impl Into<String>) -> Self {
        self.mutation_type = Some(name.into());
        self
    }

    #[must_use]
    pub fn subscription_type(mut self, name: impl Into<String>) -> Self {
        self.subscription_type = Some(name.into());
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Add global data resolvers can access alongside the request-scoped bag.
    #[must_use]
    pub fn data<D: std::any::Any + Send + Sync>(mut self, data: D) -> Self {
        self.data.insert(data);
        self
    }

    pub fn finish(mut self) -> Schema {
        for scalar in ["String", "Int", "Float", "Boolean", "ID"] {
            if !self.types.contains_key(scalar) {
                self.types
                    .insert(scalar.to_string(), TypeDefinition::Scalar(ScalarDefinition::new(scalar)));
            }
        }

        Schema(Arc::new(SchemaInner {
            types: self.types,
            query_type: self.query_type,
            mutation_type: self.mutation_type,
            subscription_type: self.subscription_type,
            settings: self.settings,
            data: self.data,
        }))
    }
}
