use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reading position for one article.
///
/// `percentage` and `scroll_position` describe the same position at two
/// granularities; they are always written together as one record so a reader
/// never sees one updated without the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingProgress {
    pub article_id: String,
    /// How much of the article has been read, 0.0 to 100.0.
    pub percentage: f64,
    /// Scroll offset to restore the reading view to.
    pub scroll_position: f64,
    pub last_read_date: DateTime<Utc>,
}

impl ReadingProgress {
    /// True once the article has been read to the end.
    pub fn is_finished(&self) -> bool {
        self.percentage >= 100.0
    }
}
