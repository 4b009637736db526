//! Type definitions shared by the API surface
//!
//! - `response` - The response envelope and its token/field-error parts

pub mod response;

pub use response::{ApiResponse, FieldError, TokenInfo};
