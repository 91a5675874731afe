use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use super::frontmatter::{FrontMatter, Value};

/// Author from the `author` field: first element of a list, or a non-empty
/// scalar.
pub fn author(front_matter: &FrontMatter) -> Option<String> {
    match front_matter.get("author") {
        Some(Value::List(items)) => items.first().cloned(),
        Some(Value::Scalar(value)) if !value.is_empty() => Some(value.clone()),
        _ => None,
    }
}

/// Source link from the `source` field. An unparseable URL is simply absent.
pub fn source_url(front_matter: &FrontMatter) -> Option<url::Url> {
    front_matter
        .scalar("source")
        .and_then(|value| url::Url::parse(value).ok())
}

/// Published date from the `published` field, trying date-only, naive
/// datetime and offset datetime in that order.
pub fn published(front_matter: &FrontMatter) -> Option<NaiveDate> {
    let value = front_matter.scalar("published")?.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime.date());
    }
    if let Ok(datetime) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(datetime.date_naive());
    }
    None
}

/// Union of front-matter tags and inline hashtags in the body.
///
/// The `tags` field contributes its items when it is a list, or its
/// comma-separated pieces when it is a scalar. The ordered set deduplicates
/// and drops empties.
pub fn tags(front_matter: &FrontMatter, body: &str) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();

    match front_matter.get("tags") {
        Some(Value::List(items)) => tags.extend(
            items
                .iter()
                .map(|item| item.trim())
                .filter(|item| !item.is_empty())
                .map(str::to_string),
        ),
        Some(Value::Scalar(value)) => tags.extend(
            value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string),
        ),
        None => {}
    }

    for capture in hashtag_regex().captures_iter(body) {
        if let Some(tag) = capture.get(1) {
            tags.insert(tag.as_str().to_string());
        }
    }

    tags
}

/// A hashtag is `#` followed by a letter then letters, digits, `_` or `-`.
/// The leading group keeps header markers (`##`), mid-word hashes and
/// path-like `/#` tokens from matching.
fn hashtag_regex() -> &'static Regex {
    use std::sync::OnceLock;

    static HASHTAG_REGEX: OnceLock<Regex> = OnceLock::new();
    HASHTAG_REGEX.get_or_init(|| {
        Regex::new(r"(?:^|[^#\w/])#([A-Za-z][A-Za-z0-9_-]*)").expect("Invalid hashtag regex")
    })
}
