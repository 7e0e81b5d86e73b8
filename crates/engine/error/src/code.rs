#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::AsRefStr,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    BadRequest,
    InternalServerError,
    // Operation preparation phases
    OperationParsingError,
    OperationNotFound,
    OperationValidationError,
    VariableError,
    // Runtime
    ResolverError,
    // Timeouts & cancellation
    RequestTimeout,
    RequestCancelled,
}

impl ErrorCode {
    /// Whether an error with this code aborts the whole request rather than a
    /// single field.
    pub fn is_request_error(self) -> bool {
        !matches!(self, ErrorCode::ResolverError)
    }
}
