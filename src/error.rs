//! Content error taxonomy
//!
//! Every failure a request handler can hit maps onto one of three HTTP
//! status classes. The message is what ends up in the `{"error": ...}` body.

use hyper::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    /// Rejected before any filesystem access
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// I/O or parse failure
    #[error("{0}")]
    Server(String),
}

impl ContentError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, ContentError>;
