//! Frontmatter parsing module
//!
//! Splits a leading `---` delimited YAML block from the document body.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

const DELIMITER: &str = "---";
const END_DELIMITER_ALT: &str = "...";

#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("frontmatter block is not closed")]
    Unterminated,

    #[error("invalid frontmatter YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("frontmatter must be a key/value mapping")]
    NotAMapping,
}

/// A text document split into metadata and body
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub metadata: Mapping,
    pub body: String,
}

impl Document {
    /// Look up a metadata key as text
    ///
    /// Numbers and booleans are rendered to text. Missing keys, nulls and
    /// nested structures fall back to `default`.
    pub fn get_str(&self, key: &str, default: &str) -> String {
        match self.metadata.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => default.to_string(),
        }
    }
}

/// Parse a document with optional frontmatter
///
/// # Examples
/// ```
/// use matrix_dashboard_backend::content::frontmatter::parse;
/// let doc = parse("---\ntitle: Intro\n---\nHello").unwrap();
/// assert_eq!(doc.get_str("title", "Untitled"), "Intro");
/// assert_eq!(doc.body, "Hello");
/// ```
pub fn parse(text: &str) -> Result<Document, FrontmatterError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let Some(rest) = strip_delimiter_line(text, DELIMITER) else {
        return Ok(Document {
            metadata: Mapping::new(),
            body: text.to_string(),
        });
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == DELIMITER || trimmed == END_DELIMITER_ALT {
            let block = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok(Document {
                metadata: parse_block(block)?,
                body: body.to_string(),
            });
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unterminated)
}

/// Return the text after the first line if that line is `delimiter`
fn strip_delimiter_line<'a>(text: &'a str, delimiter: &str) -> Option<&'a str> {
    let (first, rest) = match text.split_once('\n') {
        Some((first, rest)) => (first, rest),
        None => (text, ""),
    };
    (first.trim_end() == delimiter).then_some(rest)
}

fn parse_block(block: &str) -> Result<Mapping, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_str::<Value>(block)? {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(FrontmatterError::NotAMapping),
    }
}
