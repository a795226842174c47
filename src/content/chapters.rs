//! Chapter listing and retrieval

use serde::Serialize;
use std::io;
use std::path::Path;
use tokio::fs;

use super::frontmatter;
use super::ContentStore;
use crate::error::{ContentError, Result};

/// Suffixes included in the plain filename listing
const LISTED_SUFFIXES: [&str; 2] = [".md", ".json"];
/// Only Markdown chapters carry frontmatter worth describing
const DESCRIBED_SUFFIX: &str = ".md";

const DEFAULT_TITLE: &str = "Untitled";

/// Chapter summary returned by the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterDescriptor {
    pub filename: String,
    pub title: String,
    pub theme: String,
    pub tone: String,
    pub anchor: String,
}

impl ChapterDescriptor {
    /// Build a descriptor from raw chapter text
    pub fn from_text(
        filename: &str,
        text: &str,
    ) -> std::result::Result<Self, frontmatter::FrontmatterError> {
        let doc = frontmatter::parse(text)?;
        Ok(Self {
            filename: filename.to_string(),
            title: doc.get_str("title", DEFAULT_TITLE),
            theme: doc.get_str("theme", ""),
            tone: doc.get_str("tone", ""),
            anchor: doc.get_str("anchor", ""),
        })
    }
}

/// Full chapter text returned by the retrieval endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterContent {
    pub filename: String,
    pub content: String,
}

impl ContentStore {
    /// Describe every Markdown chapter, sorted by filename
    ///
    /// A chapter that cannot be read or whose frontmatter fails to parse is
    /// handed to `on_skip` and left out of the result.
    pub async fn list_chapters<F>(&self, mut on_skip: F) -> Result<Vec<ChapterDescriptor>>
    where
        F: FnMut(&str, &ContentError),
    {
        let mut descriptors = Vec::new();
        for filename in self.chapter_files(&[DESCRIBED_SUFFIX]).await? {
            match self.describe_chapter(&filename).await {
                Ok(descriptor) => descriptors.push(descriptor),
                Err(e) => on_skip(&filename, &e),
            }
        }
        Ok(descriptors)
    }

    /// Filenames of all `.md` and `.json` chapters, sorted
    pub async fn list_chapter_names(&self) -> Result<Vec<String>> {
        self.chapter_files(&LISTED_SUFFIXES).await
    }

    /// Read a chapter by filename
    pub async fn read_chapter(&self, filename: &str) -> Result<ChapterContent> {
        validate_filename(filename)?;

        let read_error =
            |e: io::Error| ContentError::Server(format!("Failed to read chapter '{filename}': {e}"));

        let path = self.chapters_dir.join(filename);
        if !fs::try_exists(&path).await.map_err(read_error)? {
            return Err(ContentError::NotFound(format!(
                "Chapter '{filename}' not found"
            )));
        }

        let content = fs::read_to_string(&path).await.map_err(read_error)?;

        Ok(ChapterContent {
            filename: filename.to_string(),
            content,
        })
    }

    async fn describe_chapter(&self, filename: &str) -> Result<ChapterDescriptor> {
        let text = fs::read_to_string(self.chapters_dir.join(filename))
            .await
            .map_err(|e| ContentError::Server(format!("Failed to read '{filename}': {e}")))?;
        ChapterDescriptor::from_text(filename, &text)
            .map_err(|e| ContentError::Server(format!("Failed to parse '{filename}': {e}")))
    }

    /// Regular files in the chapters directory matching one of `suffixes`
    async fn chapter_files(&self, suffixes: &[&str]) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.chapters_dir)
            .await
            .map_err(|e| dir_error(&self.chapters_dir, &e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| dir_error(&self.chapters_dir, &e))?
        {
            // Non UTF-8 names cannot be requested back through the API
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !suffixes.iter().any(|s| name.ends_with(s)) {
                continue;
            }
            // Follows symlinks so linked chapters are listed like regular ones
            let is_file = fs::metadata(entry.path())
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if is_file {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }
}

/// Reject names that could escape the chapters directory
pub fn validate_filename(filename: &str) -> Result<()> {
    if filename.is_empty() {
        return Err(ContentError::BadRequest("Filename is required".to_string()));
    }
    if filename.contains("..") || filename.contains('/') {
        return Err(ContentError::BadRequest("Invalid filename".to_string()));
    }
    Ok(())
}

fn dir_error(dir: &Path, err: &io::Error) -> ContentError {
    ContentError::Server(format!(
        "Failed to read chapters directory '{}': {err}",
        dir.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn store_with(files: &[(&str, &str)]) -> (tempfile::TempDir, ContentStore) {
        let dir = tempfile::tempdir().unwrap();
        for (name, text) in files {
            std::fs::write(dir.path().join(name), text).unwrap();
        }
        let store = ContentStore::new(dir.path(), dir.path().join("matrix.json"));
        (dir, store)
    }

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("x.md").is_ok());
        assert!(validate_filename("chapter.one.md").is_ok());
        assert!(matches!(
            validate_filename("../secret"),
            Err(ContentError::BadRequest(_))
        ));
        assert!(matches!(
            validate_filename("a/b.md"),
            Err(ContentError::BadRequest(_))
        ));
        assert!(matches!(
            validate_filename(".."),
            Err(ContentError::BadRequest(_))
        ));
        assert!(matches!(
            validate_filename(""),
            Err(ContentError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_list_chapters_with_frontmatter() {
        let (_dir, store) = store_with(&[("x.md", "---\ntitle: Intro\ntheme: light\n---\nHello")]);
        let chapters = store.list_chapters(|_, _| {}).await.unwrap();
        assert_eq!(
            chapters,
            vec![ChapterDescriptor {
                filename: "x.md".to_string(),
                title: "Intro".to_string(),
                theme: "light".to_string(),
                tone: String::new(),
                anchor: String::new(),
            }]
        );
    }

    #[tokio::test]
    async fn test_list_chapters_defaults_and_order() {
        let (_dir, store) = store_with(&[
            ("b.md", "plain body"),
            ("a.md", "---\ntone: grim\nanchor: ch1\n---\n"),
            ("notes.txt", "ignored"),
            ("data.json", "{}"),
        ]);
        let chapters = store.list_chapters(|_, _| {}).await.unwrap();
        let names: Vec<_> = chapters.iter().map(|c| c.filename.as_str()).collect();
        assert_eq!(names, ["a.md", "b.md"]);
        assert_eq!(chapters[0].title, "Untitled");
        assert_eq!(chapters[0].tone, "grim");
        assert_eq!(chapters[0].anchor, "ch1");
        assert_eq!(chapters[1].title, "Untitled");
        assert_eq!(chapters[1].theme, "");
    }

    #[tokio::test]
    async fn test_list_chapters_skips_broken_frontmatter() {
        let (_dir, store) = store_with(&[
            ("bad.md", "---\ntitle: [oops\n---\n"),
            ("good.md", "---\ntitle: Fine\n---\n"),
        ]);
        let mut skipped = Vec::new();
        let chapters = store
            .list_chapters(|name, _| skipped.push(name.to_string()))
            .await
            .unwrap();
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].filename, "good.md");
        assert_eq!(skipped, ["bad.md"]);
    }

    #[tokio::test]
    async fn test_list_chapters_ignores_directories() {
        let (dir, store) = store_with(&[("real.md", "text")]);
        std::fs::create_dir(dir.path().join("folder.md")).unwrap();
        let chapters = store.list_chapters(|_, _| {}).await.unwrap();
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].filename, "real.md");
    }

    #[tokio::test]
    async fn test_list_empty_directory() {
        let (_dir, store) = store_with(&[]);
        assert!(store.list_chapters(|_, _| {}).await.unwrap().is_empty());
        assert!(store.list_chapter_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_missing_directory() {
        let store = ContentStore::new(
            PathBuf::from("/nonexistent/chapters"),
            PathBuf::from("/nonexistent/matrix.json"),
        );
        let err = store.list_chapters(|_, _| {}).await.unwrap_err();
        assert!(matches!(err, ContentError::Server(_)));
        assert!(matches!(
            store.list_chapter_names().await,
            Err(ContentError::Server(_))
        ));
    }

    #[tokio::test]
    async fn test_list_chapter_names() {
        let (_dir, store) = store_with(&[
            ("b.json", "{}"),
            ("a.md", "---\ntitle: [broken\n---\n"),
            ("c.txt", ""),
        ]);
        let names = store.list_chapter_names().await.unwrap();
        assert_eq!(names, ["a.md", "b.json"]);
    }

    #[tokio::test]
    async fn test_read_chapter() {
        let (_dir, store) = store_with(&[("x.md", "body text")]);
        let chapter = store.read_chapter("x.md").await.unwrap();
        assert_eq!(
            chapter,
            ChapterContent {
                filename: "x.md".to_string(),
                content: "body text".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_read_chapter_keeps_frontmatter() {
        let text = "---\ntitle: Intro\n---\nHello";
        let (_dir, store) = store_with(&[("x.md", text)]);
        assert_eq!(store.read_chapter("x.md").await.unwrap().content, text);
    }

    #[tokio::test]
    async fn test_read_missing_chapter() {
        let (_dir, store) = store_with(&[]);
        let err = store.read_chapter("missing.md").await.unwrap_err();
        assert!(matches!(err, ContentError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_read_chapter_traversal_rejected() {
        let parent = tempfile::tempdir().unwrap();
        let chapters = parent.path().join("chapters");
        std::fs::create_dir(&chapters).unwrap();
        std::fs::write(parent.path().join("secret.md"), "secret").unwrap();
        let store = ContentStore::new(&chapters, parent.path().join("matrix.json"));

        let err = store.read_chapter("../secret.md").await.unwrap_err();
        assert!(matches!(err, ContentError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_read_directory_is_server_error() {
        let (dir, store) = store_with(&[]);
        std::fs::create_dir(dir.path().join("folder.md")).unwrap();
        let err = store.read_chapter("folder.md").await.unwrap_err();
        assert!(matches!(err, ContentError::Server(_)));
    }

    #[tokio::test]
    async fn test_read_chapter_when_dir_is_a_file() {
        let (dir, _) = store_with(&[("plain.txt", "not a directory")]);
        let store = ContentStore::new(dir.path().join("plain.txt"), dir.path().join("matrix.json"));

        let err = store.read_chapter("x.md").await.unwrap_err();
        assert!(matches!(err, ContentError::Server(_)));
        assert!(err.to_string().starts_with("Failed to read chapter 'x.md'"));
        assert!(matches!(
            store.list_chapters(|_, _| {}).await,
            Err(ContentError::Server(_))
        ));
    }

    #[tokio::test]
    async fn test_read_invalid_utf8_is_server_error() {
        let (dir, store) = store_with(&[]);
        std::fs::write(dir.path().join("bin.md"), [0xff, 0xfe, 0x00]).unwrap();
        let err = store.read_chapter("bin.md").await.unwrap_err();
        assert!(matches!(err, ContentError::Server(_)));
    }
}
