use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One document as returned by the Readwise Reader list endpoint.
///
/// Only the fields this crate consumes are modelled; unknown fields are
/// ignored during deserialization. Tags arrive as a dictionary keyed by
/// tag name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadwiseDocument {
    pub id: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub source_url: Option<String>,
    pub published_date: Option<String>,
    pub summary: Option<String>,
    pub word_count: Option<u32>,
    #[serde(default)]
    pub tags: HashMap<String, ReadwiseTag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadwiseTag {
    pub name: String,
}

impl ReadwiseDocument {
    /// Tag names in a stable order.
    pub fn tag_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tags.values().map(|tag| tag.name.clone()).collect();
        names.sort();
        names
    }
}

/// Renders the document and its body as a markdown article with YAML
/// front matter, in the shape the ingestion side reads back.
pub fn compose_markdown(doc: &ReadwiseDocument, body: &str) -> String {
    let mut out = String::from("---\n");
    if let Some(title) = &doc.title {
        out.push_str(&format!("title: \"{}\"\n", quote_safe(title)));
    }
    if let Some(author) = &doc.author {
        out.push_str(&format!("author: \"{}\"\n", quote_safe(author)));
    }
    if let Some(source) = &doc.source_url {
        out.push_str(&format!("source: {source}\n"));
    }
    if let Some(published) = &doc.published_date {
        out.push_str(&format!("published: {published}\n"));
    }
    let tags = doc.tag_names();
    if !tags.is_empty() {
        out.push_str(&format!("tags: [{}]\n", tags.join(", ")));
    }
    out.push_str("---\n\n");
    out.push_str(body);
    out
}

/// Turns a document title into a safe file name.
///
/// Path separators and drive markers become hyphens, shell-hostile glob
/// characters are dropped, double quotes become single quotes, and the
/// result is trimmed and capped at 200 characters. A title that sanitizes
/// to nothing becomes "Untitled".
pub fn sanitize_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter_map(|c| match c {
            '/' | '\\' | ':' | '|' => Some('-'),
            '*' | '?' | '<' | '>' => None,
            '"' => Some('\''),
            _ => Some(c),
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return "Untitled".to_string();
    }
    trimmed.chars().take(200).collect()
}

/// Writes the document into the articles folder as `<title>.md`.
///
/// Returns the created path, or `None` when a file with that name already
/// exists; existing articles are never overwritten so local edits and
/// reading state survive re-imports.
pub fn import_document(
    folder: &Path,
    doc: &ReadwiseDocument,
    body: &str,
) -> Result<Option<PathBuf>, ImportError> {
    let title = doc.title.as_deref().unwrap_or("Untitled");
    let path = folder.join(format!("{}.md", sanitize_filename(title)));
    if path.exists() {
        debug!("Skipping existing article {}", path.display());
        return Ok(None);
    }
    fs::write(&path, compose_markdown(doc, body))?;
    Ok(Some(path))
}

fn quote_safe(text: &str) -> String {
    text.replace('"', "'")
}
