pub mod frontmatter;
pub mod metadata;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::models::Article;

/// Builds an [`Article`] from one file's raw text.
///
/// This never fails: missing or malformed metadata degrades to absent
/// fields and the body is kept as-is. `id` is the source file name and
/// `date_added` the file's creation time, both supplied by the caller.
pub fn parse_article(id: &str, raw: &str, date_added: DateTime<Utc>) -> Article {
    let (front_matter, body) = frontmatter::parse(raw);
    let title = extract_title(body).unwrap_or_else(|| file_stem(id).to_string());
    let tags = metadata::tags(&front_matter, body);

    Article {
        id: id.to_string(),
        title,
        author: metadata::author(&front_matter),
        source_url: metadata::source_url(&front_matter),
        published: metadata::published(&front_matter),
        content: body.to_string(),
        date_added,
        word_count: body.split_whitespace().count(),
        tags,
    }
}

/// First level-1 heading in the body. The scan is a plain line match and
/// does not skip fenced code blocks.
fn extract_title(body: &str) -> Option<String> {
    use std::sync::OnceLock;

    static TITLE_REGEX: OnceLock<Regex> = OnceLock::new();
    let title_regex = TITLE_REGEX
        .get_or_init(|| Regex::new(r"(?m)^#\s+(.+)$").expect("Invalid title regex"));

    title_regex
        .captures(body)
        .map(|capture| capture[1].trim().to_string())
}

/// File name without a trailing `.md`, the title fallback.
fn file_stem(id: &str) -> &str {
    id.strip_suffix(".md").unwrap_or(id)
}
