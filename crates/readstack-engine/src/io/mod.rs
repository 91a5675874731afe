use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::ingest;
use crate::models::Article;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("No articles folder configured")]
    NoFolderConfigured,
    #[error("Articles folder not found: {0}")]
    FolderNotFound(PathBuf),
    #[error("Failed to parse article: {0}")]
    Parsing(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Picks the articles folder from an explicit argument first, then the
/// configured fallback, and checks it exists.
pub fn resolve_folder(
    arg: Option<PathBuf>,
    configured: Option<PathBuf>,
) -> Result<PathBuf, LoadError> {
    let folder = arg.or(configured).ok_or(LoadError::NoFolderConfigured)?;
    validate_folder(&folder)?;
    Ok(folder)
}

pub fn validate_folder(folder: &Path) -> Result<(), LoadError> {
    if folder.is_dir() {
        Ok(())
    } else {
        Err(LoadError::FolderNotFound(folder.to_path_buf()))
    }
}

/// Loads every article in the folder, top level only.
///
/// Hidden files and non-markdown files are ignored. A file that cannot be
/// read or decoded is skipped with a warning rather than failing the whole
/// scan. Files are visited in path order so ingestion is deterministic.
pub fn load_articles(folder: &Path) -> Result<Vec<Article>, LoadError> {
    validate_folder(folder)?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && !is_hidden(&path) && path.extension().is_some_and(|ext| ext == "md") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut articles = Vec::with_capacity(paths.len());
    for path in &paths {
        match load_article(path) {
            Ok(article) => articles.push(article),
            Err(err) => warn!("Skipping {}: {err}", path.display()),
        }
    }
    debug!("Loaded {} articles from {}", articles.len(), folder.display());
    Ok(articles)
}

/// Reads and parses a single article file. The file name becomes the
/// article id; the filesystem creation time becomes the added date, with
/// the current time standing in where the platform cannot provide one.
pub fn load_article(path: &Path) -> Result<Article, LoadError> {
    let id = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| LoadError::Parsing(format!("{} has no file name", path.display())))?;
    let bytes = fs::read(path)?;
    let raw = String::from_utf8(bytes)
        .map_err(|_| LoadError::Parsing(format!("{} is not valid UTF-8", path.display())))?;
    Ok(ingest::parse_article(&id, &raw, created_at(path)))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn created_at(path: &Path) -> chrono::DateTime<chrono::Utc> {
    fs::metadata(path)
        .and_then(|meta| meta.created())
        .map(chrono::DateTime::<chrono::Utc>::from)
        .unwrap_or_else(|_| chrono::Utc::now())
}
