//! HTTP protocol layer module
//!
//! Response builders and header handling, decoupled from the content routes.

pub mod response;

// Re-export commonly used builders
pub use response::{
    build_404_response, build_405_response, build_413_response, build_options_response,
    content_error_response, error_response, finalize, json_response,
};
