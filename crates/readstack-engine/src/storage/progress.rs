use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use tracing::warn;

use super::StoreError;
use crate::models::ReadingProgress;

/// Per-article reading positions, persisted as a JSON array next to the
/// archive store.
///
/// Progress lives outside the articles themselves so that the markdown
/// folder stays untouched by reading activity. Records are keyed by
/// article id and written through on every update.
#[derive(Debug)]
pub struct ProgressLedger {
    path: PathBuf,
    records: HashMap<String, ReadingProgress>,
}

impl ProgressLedger {
    /// Opens the ledger at `path`. A missing file is an empty ledger; a
    /// corrupt one is logged and treated as empty rather than blocking
    /// the library from opening.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Vec<ReadingProgress>>(&raw) {
                Ok(list) => list
                    .into_iter()
                    .map(|record| (record.article_id.clone(), record))
                    .collect(),
                Err(err) => {
                    warn!("Ignoring corrupt progress file {}: {err}", path.display());
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                warn!("Cannot read progress file {}: {err}", path.display());
                HashMap::new()
            }
        };
        Self { path, records }
    }

    pub fn get(&self, article_id: &str) -> Option<&ReadingProgress> {
        self.records.get(article_id)
    }

    pub fn all(&self) -> &HashMap<String, ReadingProgress> {
        &self.records
    }

    /// Records a new position for the article, stamping it with the
    /// current time, and persists the whole ledger.
    pub fn set(
        &mut self,
        article_id: &str,
        percentage: f64,
        scroll_position: f64,
    ) -> Result<(), StoreError> {
        let record = ReadingProgress {
            article_id: article_id.to_string(),
            percentage: percentage.clamp(0.0, 100.0),
            scroll_position,
            last_read_date: Utc::now(),
        };
        self.records.insert(article_id.to_string(), record);
        self.save()
    }

    fn save(&self) -> Result<(), StoreError> {
        let mut list: Vec<&ReadingProgress> = self.records.values().collect();
        list.sort_by(|a, b| a.article_id.cmp(&b.article_id));
        let json = serde_json::to_string_pretty(&list)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, json)?;
        Ok(())
    }
}
