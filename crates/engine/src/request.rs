use std::any::Any;

use operation::Variables;
use schema::Data;
use serde::{Deserialize, Serialize};

/// One request as handed to the pipeline.
///
/// This can be deserialized from the usual transport structure: the query
/// source, the operation name and the variables, all in `camelCase`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// The query source of the request.
    #[serde(default)]
    pub query: String,

    /// The operation name hint used to pick one operation out of a
    /// multi-operation document.
    #[serde(default)]
    pub operation_name: Option<String>,

    /// The raw, uncoerced variables of the request.
    #[serde(default)]
    pub variables: Variables,

    /// Request data resolvers and custom stages can access through the
    /// request context.
    ///
    /// **This data is only valid for this request.**
    #[serde(skip)]
    pub data: Data,
}

impl Request {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            operation_name: None,
            variables: Variables::default(),
            data: Data::default(),
        }
    }

    /// Specify the operation name of the request.
    #[must_use]
    pub fn with_operation_name<T: Into<String>>(self, name: T) -> Self {
        Self {
            operation_name: Some(name.into()),
            ..self
        }
    }

    /// Specify the variables.
    #[must_use]
    pub fn variables(self, variables: Variables) -> Self {
        Self { variables, ..self }
    }

    /// Insert some data for this request.
    #[must_use]
    pub fn data<D: Any + Send + Sync>(mut self, data: D) -> Self {
        self.data.insert(data);
        self
    }
}

impl<T: Into<String>> From<T> for Request {
    fn from(query: T) -> Self {
        Request::new(query)
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("query", &self.query)
            .field("operation_name", &self.operation_name)
            .field("variables", &self.variables)
            .finish()
    }
}

/// A batch of requests executed through the same engine.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchRequest {
    Single(Request),
    Batch(Vec<Request>),
}
