//! Content module
//!
//! Read-only access to the two content sources the dashboard consumes:
//! a directory of chapter files and a single matrix JSON document.

pub mod chapters;
pub mod frontmatter;
pub mod matrix;

use std::path::{Path, PathBuf};

pub use chapters::{ChapterContent, ChapterDescriptor};

/// Filesystem-backed content store
///
/// Holds only paths; every operation opens and closes its files on the spot.
#[derive(Debug, Clone)]
pub struct ContentStore {
    chapters_dir: PathBuf,
    matrix_file: PathBuf,
}

impl ContentStore {
    pub fn new(chapters_dir: impl Into<PathBuf>, matrix_file: impl Into<PathBuf>) -> Self {
        Self {
            chapters_dir: chapters_dir.into(),
            matrix_file: matrix_file.into(),
        }
    }

    pub fn chapters_dir(&self) -> &Path {
        &self.chapters_dir
    }

    pub fn matrix_file(&self) -> &Path {
        &self.matrix_file
    }
}
