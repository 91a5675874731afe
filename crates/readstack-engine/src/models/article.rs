use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, NaiveDate, Utc};
use url::Url;

/// Words per minute assumed when estimating reading time.
const WORDS_PER_MINUTE: usize = 225;

/// A single library entry, parsed from one markdown file.
///
/// Articles are immutable value records; reading position lives in the
/// progress ledger and is joined by id at presentation time. Identity is the
/// source file name, so equality and hashing use `id` alone and a re-parsed
/// copy of the same file compares equal.
#[derive(Debug, Clone)]
pub struct Article {
    /// Source file name including extension, unique within a library folder.
    pub id: String,
    /// First `# ` heading in the body, else the file name without extension.
    pub title: String,
    pub author: Option<String>,
    /// Where the article was clipped from, when the front matter carries a
    /// parseable `source` URL.
    pub source_url: Option<Url>,
    pub published: Option<NaiveDate>,
    /// Body text with the front-matter block stripped.
    pub content: String,
    /// File creation time, or the ingestion time where the filesystem
    /// doesn't record one.
    pub date_added: DateTime<Utc>,
    /// Whitespace-delimited non-empty tokens in `content`.
    pub word_count: usize,
    /// Union of front-matter tags and inline `#hashtag`s, deduplicated,
    /// never containing the empty string.
    pub tags: BTreeSet<String>,
}

impl Article {
    /// Estimated reading time in whole minutes, never less than one.
    pub fn estimated_reading_time(&self) -> usize {
        (self.word_count / WORDS_PER_MINUTE).max(1)
    }

    /// Host part of the source URL, for compact display next to the title.
    pub fn source_domain(&self) -> Option<&str> {
        self.source_url.as_ref().and_then(|url| url.host_str())
    }
}

impl PartialEq for Article {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Article {}

impl Hash for Article {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
