pub mod import;
pub mod ingest;
pub mod io;
pub mod library;
pub mod models;
pub mod parsing;
pub mod storage;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use ingest::parse_article;
pub use io::{LoadError, load_article, load_articles, resolve_folder};
pub use library::{LibraryQuery, LibraryView, SortOrder, all_tags, classify, next_unread, pick_random};
pub use models::{Article, ReadingProgress};
pub use parsing::{MarkdownElement, SpanStyle, StyledSpan, parse_blocks, plain_text, resolve_spans};
pub use storage::{ArchiveStore, ProgressLedger, StoreError};
