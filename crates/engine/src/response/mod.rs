mod path;

pub use path::{QueryPath, QueryPathSegment};

use error::GraphqlError;

/// The outcome of one request: data mixed with field-scoped errors, or
/// request-level errors with no data at all.
///
/// This is the boundary contract transport layers serialize. Every failure
/// path of the engine terminates in one of these; callers never see a raw
/// panic or unhandled error.
#[derive(Debug, Default)]
pub struct Response {
    pub data: Option<serde_json::Value>,
    pub errors: Vec<GraphqlError>,
    pub extensions: serde_json::Map<String, serde_json::Value>,
}

impl Response {
    /// A request-level failure: no data at all.
    pub fn request_error(errors: impl IntoIterator<Item = GraphqlError>) -> Self {
        Response {
            data: None,
            errors: errors.into_iter().collect(),
            extensions: Default::default(),
        }
    }

    pub fn from_data(data: serde_json::Value, errors: Vec<GraphqlError>) -> Self {
        Response {
            data: Some(data),
            errors,
            extensions: Default::default(),
        }
    }

    pub fn errors(&self) -> &[GraphqlError] {
        &self.errors
    }

    /// Whether the request was aborted before producing any data.
    pub fn is_request_error(&self) -> bool {
        self.data.is_none()
    }

    /// Attach a top-level response extension, e.g. from a custom stage.
    pub fn insert_extension(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.extensions.insert(key.into(), value.into());
    }

    /// The serialized form, convenient for assertions and logging.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("a response always serializes")
    }
}

impl serde::Serialize for Response {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;
        if !self.errors.is_empty() {
            map.serialize_entry("errors", &self.errors)?;
        }
        if let Some(data) = &self.data {
            map.serialize_entry("data", data)?;
        }
        if !self.extensions.is_empty() {
            map.serialize_entry("extensions", &self.extensions)?;
        }
        map.end()
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(untagged)]
pub enum BatchResponse {
    Single(Response),
    Batch(Vec<Response>),
}

#[cfg(test)]
mod tests {
    use error::ErrorCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn request_errors_serialize_without_data() {
        let response = Response::request_error([GraphqlError::new(
            "Operation name required in request.",
            ErrorCode::OperationNotFound,
        )]);
        assert_eq!(
            response.to_json_value(),
            json!({
                "errors": [{
                    "message": "Operation name required in request.",
                    "extensions": { "code": "OPERATION_NOT_FOUND" }
                }]
            })
        );
    }

    #[test]
    fn data_and_extensions_serialize_when_present() {
        let mut response = Response::from_data(json!({ "x": 1 }), Vec::new());
        response.insert_extension("took_ms", 3);
        assert_eq!(
            response.to_json_value(),
            json!({ "data": { "x": 1 }, "extensions": { "took_ms": 3 } })
        );
    }
}
