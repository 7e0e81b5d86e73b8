mod bind;
mod complexity;
mod error;
mod parse;
mod variables;

pub use async_graphql_parser::types::OperationType;
pub use async_graphql_value::Variables;
pub use bind::{bind_operation, BoundField, BoundOperation};
pub use complexity::{compute_complexity, ComplexityCost, ComplexityError};
pub use error::{BindError, ParseError, VariableError};
pub use parse::{parse_document, select_operation, SelectedOperation};
pub use variables::coerce_variables;
