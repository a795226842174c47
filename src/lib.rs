//! Matrix Dashboard Backend
//!
//! Serves chapter files (Markdown with frontmatter, JSON) and the matrix
//! document to the dashboard front-end over a small JSON HTTP API.

pub mod config;
pub mod content;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
