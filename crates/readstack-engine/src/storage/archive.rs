use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use tracing::warn;

use super::StoreError;

/// The set of archived article ids, persisted as a JSON array of strings.
#[derive(Debug)]
pub struct ArchiveStore {
    path: PathBuf,
    ids: HashSet<String>,
}

impl ArchiveStore {
    /// Opens the store at `path`; missing or corrupt files yield an empty
    /// set so the library still opens.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let ids = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(list) => list.into_iter().collect(),
                Err(err) => {
                    warn!("Ignoring corrupt archive file {}: {err}", path.display());
                    HashSet::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(err) => {
                warn!("Cannot read archive file {}: {err}", path.display());
                HashSet::new()
            }
        };
        Self { path, ids }
    }

    pub fn is_archived(&self, article_id: &str) -> bool {
        self.ids.contains(article_id)
    }

    pub fn all(&self) -> &HashSet<String> {
        &self.ids
    }

    /// Adds the article to the archive. Archiving an already archived
    /// article changes nothing and skips the write.
    pub fn archive(&mut self, article_id: &str) -> Result<(), StoreError> {
        if self.ids.insert(article_id.to_string()) {
            self.save()?;
        }
        Ok(())
    }

    /// Removes the article from the archive; a no-op when it was not
    /// archived.
    pub fn unarchive(&mut self, article_id: &str) -> Result<(), StoreError> {
        if self.ids.remove(article_id) {
            self.save()?;
        }
        Ok(())
    }

    fn save(&self) -> Result<(), StoreError> {
        let mut list: Vec<&String> = self.ids.iter().collect();
        list.sort();
        let json = serde_json::to_string_pretty(&list)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::create_test_library;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_opens_as_an_empty_store() {
        let dir = create_test_library();
        let store = ArchiveStore::open(dir.path().join("archive.json"));

        assert!(store.all().is_empty());
    }

    #[test]
    fn archive_and_unarchive_are_idempotent() {
        let dir = create_test_library();
        let mut store = ArchiveStore::open(dir.path().join("archive.json"));

        store.archive("a.md").unwrap();
        store.archive("a.md").unwrap();
        assert!(store.is_archived("a.md"));
        assert_eq!(store.all().len(), 1);

        store.unarchive("a.md").unwrap();
        store.unarchive("a.md").unwrap();
        assert!(!store.is_archived("a.md"));
        assert!(store.all().is_empty());
    }

    #[test]
    fn archived_ids_survive_reopening_the_store() {
        let dir = create_test_library();
        let path = dir.path().join("archive.json");

        let mut store = ArchiveStore::open(&path);
        store.archive("a.md").unwrap();
        store.archive("b.md").unwrap();
        drop(store);

        let reopened = ArchiveStore::open(&path);
        assert!(reopened.is_archived("a.md"));
        assert!(reopened.is_archived("b.md"));
        assert_eq!(reopened.all().len(), 2);
    }

    #[test]
    fn corrupt_file_opens_as_an_empty_store() {
        let dir = create_test_library();
        let path = dir.path().join("archive.json");
        std::fs::write(&path, "[\"unterminated").unwrap();

        let store = ArchiveStore::open(&path);

        assert!(store.all().is_empty());
    }
}
