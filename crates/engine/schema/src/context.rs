use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
};

/// A request-scoped, type-keyed property bag.
///
/// Lives for the whole request and is visible to every pipeline stage and
/// resolver. One instance is never shared across requests.
#[derive(Default)]
pub struct Data(HashMap<TypeId, Box<dyn Any + Send + Sync>>);

impl Data {
    pub fn insert<D: Any + Send + Sync>(&mut self, data: D) {
        self.0.insert(TypeId::of::<D>(), Box::new(data));
    }

    pub fn get<D: Any + Send + Sync>(&self) -> Option<&D> {
        self.0.get(&TypeId::of::<D>()).and_then(|d| d.downcast_ref::<D>())
    }

    pub fn remove<D: Any + Send + Sync>(&mut self) -> Option<D> {
        self.0
            .remove(&TypeId::of::<D>())
            .and_then(|d| d.downcast::<D>().ok())
            .map(|boxed| *boxed)
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data").finish()
    }
}

/// The tree-scoped property bag.
///
/// Forked per selection subtree: values a resolver sets are visible to that
/// field's descendants but not to its siblings. Backed by a persistent map so
/// a fork is O(1) and never mutates the parent scope.
#[derive(Debug, Clone, Default)]
pub struct ScopedData(im::HashMap<String, serde_json::Value>);

impl ScopedData {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }
}
