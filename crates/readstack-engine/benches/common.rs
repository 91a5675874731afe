// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use chrono::{Duration, Utc};
use readstack_engine::{Article, ReadingProgress};
use std::collections::HashMap;

#[allow(dead_code)]
pub fn generate_article_markdown(sections: usize) -> String {
    let mut content = String::from(
        "---\ntitle: Benchmark Article\nauthor: Bench Author\ntags: [benchmark, markdown]\n---\n\n# Benchmark Article\n\n",
    );
    for section in 0..sections {
        content.push_str(&format!("## Section {section}\n\n"));
        content.push_str(
            "A paragraph with **bold** text, *emphasis*, `inline code` and a [link](https://example.com/page).\nIt continues on a second line with a #hashtag.\n\n",
        );
        content.push_str("- First point\n- Second point\n- Third point\n\n");
        content.push_str("> A quoted line worth keeping.\n\n");
        content.push_str("```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n");
        content.push_str("![diagram](https://example.com/diagram.png)\n\n---\n\n");
    }
    content
}

#[allow(dead_code)]
pub fn generate_library(count: usize) -> Vec<Article> {
    let tag_pool = ["rust", "essays", "productivity", "science"];
    (0..count)
        .map(|i| Article {
            id: format!("article-{i}.md"),
            title: format!("Article {i}"),
            author: Some(format!("Author {}", i % 17)),
            source_url: None,
            published: None,
            content: String::new(),
            date_added: Utc::now() - Duration::seconds(i as i64),
            word_count: 150 + (i % 40) * 120,
            tags: [tag_pool[i % tag_pool.len()].to_string()].into_iter().collect(),
        })
        .collect()
}

/// Progress records for every third article, half way through.
#[allow(dead_code)]
pub fn generate_progress(articles: &[Article]) -> HashMap<String, ReadingProgress> {
    articles
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 3 == 0)
        .map(|(_, article)| {
            (
                article.id.clone(),
                ReadingProgress {
                    article_id: article.id.clone(),
                    percentage: 50.0,
                    scroll_position: 0.0,
                    last_read_date: Utc::now(),
                },
            )
        })
        .collect()
}
