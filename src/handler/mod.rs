//! Request handler module
//!
//! Responsible for request routing dispatch and the content API handlers.

pub mod api;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
