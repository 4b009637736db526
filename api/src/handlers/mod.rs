//! Shared handler helpers

pub mod error;

pub use error::{
    forbidden, handle_domain_error, handle_token_error, json_error_handler, unauthorized,
    validate_request,
};
