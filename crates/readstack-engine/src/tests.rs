use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary articles directory
pub fn create_test_library() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a test article file with content
pub fn create_test_article(library: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = library.path().join(filename);
    fs::write(&file_path, content).unwrap();
    file_path
}
