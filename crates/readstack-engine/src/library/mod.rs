use std::collections::{BTreeSet, HashMap, HashSet};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::models::{Article, ReadingProgress};

/// Longest estimated reading time, in minutes, that still counts as a
/// quick win.
const QUICK_WIN_MINUTES: usize = 5;

/// Sort applied to the active (unarchived) list. Archived articles are
/// always shown newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    DateAdded,
    Title,
    Progress,
}

/// Search, tag and sort state for one library view.
#[derive(Debug, Clone, Default)]
pub struct LibraryQuery {
    /// Case-insensitive substring matched against title, author and tags.
    pub search_text: String,
    /// Keep articles whose tag set intersects this one; empty means no
    /// tag filtering.
    pub selected_tags: BTreeSet<String>,
    pub sort_order: SortOrder,
}

/// One classified snapshot of the library.
///
/// Every list borrows from the article slice passed to [`classify`]; the
/// classifier holds no state and is recomputed per query change.
#[derive(Debug)]
pub struct LibraryView<'a> {
    /// Unarchived articles after filtering, in the query's sort order.
    pub active: Vec<&'a Article>,
    /// Started but unfinished, most progress first.
    pub continue_reading: Vec<&'a Article>,
    /// Unread and short, shortest first.
    pub quick_wins: Vec<&'a Article>,
    /// The rest of `active`, keeping its sort order.
    pub stack: Vec<&'a Article>,
    /// Archived articles after the same filtering, newest first.
    pub archived: Vec<&'a Article>,
}

/// Partitions, filters, sorts and buckets one snapshot of the library.
///
/// Reading state comes from the progress map and is joined by article id;
/// an article without a record counts as unread. The three buckets all
/// derive from the same filtered and sorted active list: `continue_reading`
/// takes anything strictly between 0 and 100 percent, `quick_wins` takes
/// unread articles of at most five estimated minutes, and `stack` is the
/// remainder by id subtraction.
pub fn classify<'a>(
    articles: &'a [Article],
    progress: &HashMap<String, ReadingProgress>,
    query: &LibraryQuery,
    archived_ids: &HashSet<String>,
) -> LibraryView<'a> {
    let (mut active, mut archived): (Vec<&'a Article>, Vec<&'a Article>) = articles
        .iter()
        .partition(|article| !archived_ids.contains(&article.id));

    let needle = query.search_text.trim().to_lowercase();
    if !needle.is_empty() {
        active.retain(|article| matches_search(article, &needle));
        archived.retain(|article| matches_search(article, &needle));
    }
    if !query.selected_tags.is_empty() {
        active.retain(|article| !query.selected_tags.is_disjoint(&article.tags));
        archived.retain(|article| !query.selected_tags.is_disjoint(&article.tags));
    }

    // Stable sorts, so equal keys keep their prior relative order.
    match query.sort_order {
        SortOrder::DateAdded => active.sort_by(|a, b| b.date_added.cmp(&a.date_added)),
        SortOrder::Title => {
            active.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        }
        SortOrder::Progress => active.sort_by(|a, b| {
            percentage_of(progress, &b.id).total_cmp(&percentage_of(progress, &a.id))
        }),
    }
    archived.sort_by(|a, b| b.date_added.cmp(&a.date_added));

    let mut continue_reading: Vec<&'a Article> = active
        .iter()
        .copied()
        .filter(|article| {
            let pct = percentage_of(progress, &article.id);
            pct > 0.0 && pct < 100.0
        })
        .collect();
    continue_reading.sort_by(|a, b| {
        percentage_of(progress, &b.id).total_cmp(&percentage_of(progress, &a.id))
    });

    let mut quick_wins: Vec<&'a Article> = active
        .iter()
        .copied()
        .filter(|article| {
            is_unread(progress, article) && article.estimated_reading_time() <= QUICK_WIN_MINUTES
        })
        .collect();
    quick_wins.sort_by_key(|article| article.estimated_reading_time());

    let bucketed: HashSet<&str> = continue_reading
        .iter()
        .chain(&quick_wins)
        .map(|article| article.id.as_str())
        .collect();
    let stack: Vec<&'a Article> = active
        .iter()
        .copied()
        .filter(|article| !bucketed.contains(article.id.as_str()))
        .collect();

    LibraryView {
        active,
        continue_reading,
        quick_wins,
        stack,
        archived,
    }
}

/// Weighted random selection across the buckets: articles mid-read are
/// three times as likely as stack entries, quick wins twice as likely.
/// `None` when the view has nothing active.
pub fn pick_random<'a, R: Rng + ?Sized>(
    view: &LibraryView<'a>,
    rng: &mut R,
) -> Option<&'a Article> {
    let mut pool: Vec<&'a Article> = Vec::with_capacity(
        3 * view.continue_reading.len() + 2 * view.quick_wins.len() + view.stack.len(),
    );
    for _ in 0..3 {
        pool.extend_from_slice(&view.continue_reading);
    }
    for _ in 0..2 {
        pool.extend_from_slice(&view.quick_wins);
    }
    pool.extend_from_slice(&view.stack);

    pool.choose(rng).copied()
}

/// Next not-yet-finished article after `current_id`, wrapping around but
/// never returning the current article itself. When `current_id` is not in
/// the list the scan starts from the top.
pub fn next_unread<'a>(
    articles: &[&'a Article],
    current_id: &str,
    progress: &HashMap<String, ReadingProgress>,
) -> Option<&'a Article> {
    match articles.iter().position(|article| article.id == current_id) {
        Some(index) => articles
            .iter()
            .cycle()
            .skip(index + 1)
            .take(articles.len().saturating_sub(1))
            .find(|article| percentage_of(progress, &article.id) < 100.0)
            .copied(),
        None => articles
            .iter()
            .find(|article| percentage_of(progress, &article.id) < 100.0)
            .copied(),
    }
}

/// Every tag across the given articles, deduplicated and ordered.
pub fn all_tags(articles: &[Article]) -> Vec<String> {
    let mut tags = BTreeSet::new();
    for article in articles {
        tags.extend(article.tags.iter().cloned());
    }
    tags.into_iter().collect()
}

fn matches_search(article: &Article, needle: &str) -> bool {
    article.title.to_lowercase().contains(needle)
        || article
            .author
            .as_deref()
            .is_some_and(|author| author.to_lowercase().contains(needle))
        || article.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
}

fn is_unread(progress: &HashMap<String, ReadingProgress>, article: &Article) -> bool {
    percentage_of(progress, &article.id) == 0.0
}

fn percentage_of(progress: &HashMap<String, ReadingProgress>, id: &str) -> f64 {
    progress.get(id).map_or(0.0, |record| record.percentage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn article(id: &str, title: &str, days_ago: i64, word_count: usize, tags: &[&str]) -> Article {
        Article {
            id: id.to_string(),
            title: title.to_string(),
            author: None,
            source_url: None,
            published: None,
            content: String::new(),
            date_added: Utc::now() - Duration::days(days_ago),
            word_count,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
        }
    }

    fn progress_map(entries: &[(&str, f64)]) -> HashMap<String, ReadingProgress> {
        entries
            .iter()
            .map(|(id, pct)| {
                (
                    id.to_string(),
                    ReadingProgress {
                        article_id: id.to_string(),
                        percentage: *pct,
                        scroll_position: 0.0,
                        last_read_date: Utc::now(),
                    },
                )
            })
            .collect()
    }

    fn ids(list: &[&Article]) -> Vec<String> {
        list.iter().map(|article| article.id.clone()).collect()
    }

    fn archived_set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn partitions_into_active_and_archived() {
        let articles = vec![
            article("a.md", "A", 3, 100, &[]),
            article("b.md", "B", 2, 100, &[]),
            article("c.md", "C", 1, 100, &[]),
        ];
        let view = classify(
            &articles,
            &HashMap::new(),
            &LibraryQuery::default(),
            &archived_set(&["b.md"]),
        );

        assert_eq!(ids(&view.active), vec!["c.md", "a.md"]);
        assert_eq!(ids(&view.archived), vec!["b.md"]);
    }

    #[test]
    fn archived_is_always_newest_first_whatever_the_sort_order() {
        let articles = vec![
            article("old.md", "Aardvark", 9, 100, &[]),
            article("new.md", "Zebra", 1, 100, &[]),
        ];
        let query = LibraryQuery {
            sort_order: SortOrder::Title,
            ..LibraryQuery::default()
        };
        let view = classify(
            &articles,
            &HashMap::new(),
            &query,
            &archived_set(&["old.md", "new.md"]),
        );

        assert_eq!(ids(&view.archived), vec!["new.md", "old.md"]);
    }

    #[test]
    fn search_matches_title_author_or_tag_case_insensitively() {
        let mut by_author = article("a.md", "Unrelated", 1, 100, &[]);
        by_author.author = Some("Cal Newport".to_string());
        let articles = vec![
            by_author,
            article("b.md", "Deep Focus", 2, 100, &[]),
            article("c.md", "Other", 3, 100, &["newsletters"]),
            article("d.md", "Nothing", 4, 100, &[]),
        ];
        let query = LibraryQuery {
            search_text: "NEW".to_string(),
            ..LibraryQuery::default()
        };
        let view = classify(&articles, &HashMap::new(), &query, &HashSet::new());

        assert_eq!(ids(&view.active), vec!["a.md", "c.md"]);
    }

    #[test]
    fn search_also_narrows_the_archived_list() {
        let articles = vec![
            article("a.md", "Rust ownership", 1, 100, &[]),
            article("b.md", "Gardening", 2, 100, &[]),
        ];
        let query = LibraryQuery {
            search_text: "rust".to_string(),
            ..LibraryQuery::default()
        };
        let view = classify(
            &articles,
            &HashMap::new(),
            &query,
            &archived_set(&["a.md", "b.md"]),
        );

        assert_eq!(ids(&view.archived), vec!["a.md"]);
    }

    #[test]
    fn tag_filter_keeps_any_intersection() {
        let articles = vec![
            article("a.md", "A", 1, 100, &["rust", "systems"]),
            article("b.md", "B", 2, 100, &["cooking"]),
            article("c.md", "C", 3, 100, &["systems"]),
        ];
        let query = LibraryQuery {
            selected_tags: ["systems".to_string()].into_iter().collect(),
            ..LibraryQuery::default()
        };
        let view = classify(&articles, &HashMap::new(), &query, &HashSet::new());

        assert_eq!(ids(&view.active), vec!["a.md", "c.md"]);
    }

    #[test]
    fn sort_by_title_ignores_case() {
        let articles = vec![
            article("1.md", "banana", 1, 100, &[]),
            article("2.md", "Apple", 2, 100, &[]),
            article("3.md", "cherry", 3, 100, &[]),
        ];
        let query = LibraryQuery {
            sort_order: SortOrder::Title,
            ..LibraryQuery::default()
        };
        let view = classify(&articles, &HashMap::new(), &query, &HashSet::new());

        assert_eq!(ids(&view.active), vec!["2.md", "1.md", "3.md"]);
    }

    #[test]
    fn sort_by_progress_treats_absent_as_zero() {
        let articles = vec![
            article("none.md", "A", 1, 100, &[]),
            article("half.md", "B", 2, 100, &[]),
            article("done.md", "C", 3, 100, &[]),
        ];
        let progress = progress_map(&[("half.md", 50.0), ("done.md", 100.0)]);
        let query = LibraryQuery {
            sort_order: SortOrder::Progress,
            ..LibraryQuery::default()
        };
        let view = classify(&articles, &progress, &query, &HashSet::new());

        assert_eq!(ids(&view.active), vec!["done.md", "half.md", "none.md"]);
    }

    #[test]
    fn equal_sort_keys_keep_their_relative_order() {
        // Identical progress everywhere: the stable sort must keep the
        // incoming order.
        let articles = vec![
            article("a.md", "A", 1, 100, &[]),
            article("b.md", "B", 2, 100, &[]),
            article("c.md", "C", 3, 100, &[]),
        ];
        let query = LibraryQuery {
            sort_order: SortOrder::Progress,
            ..LibraryQuery::default()
        };
        let view = classify(&articles, &HashMap::new(), &query, &HashSet::new());

        assert_eq!(ids(&view.active), vec!["a.md", "b.md", "c.md"]);
    }

    #[test]
    fn mid_progress_lands_in_continue_reading_only() {
        let articles = vec![article("a.md", "A", 1, 2000, &[])];
        let progress = progress_map(&[("a.md", 45.0)]);
        let view = classify(&articles, &progress, &LibraryQuery::default(), &HashSet::new());

        assert_eq!(ids(&view.continue_reading), vec!["a.md"]);
        assert!(view.quick_wins.is_empty());
        assert!(view.stack.is_empty());
    }

    #[test]
    fn short_unread_article_is_a_quick_win() {
        let articles = vec![article("short.md", "S", 1, 675, &[])]; // 3 minutes
        let view = classify(
            &articles,
            &HashMap::new(),
            &LibraryQuery::default(),
            &HashSet::new(),
        );

        assert_eq!(ids(&view.quick_wins), vec!["short.md"]);
        assert!(view.stack.is_empty());
    }

    #[test]
    fn quick_win_boundary_is_five_minutes() {
        let articles = vec![
            article("five.md", "Five", 1, 1125, &[]),  // exactly 5 minutes
            article("six.md", "Six", 2, 1350, &[]),    // 6 minutes
        ];
        let view = classify(
            &articles,
            &HashMap::new(),
            &LibraryQuery::default(),
            &HashSet::new(),
        );

        assert_eq!(ids(&view.quick_wins), vec!["five.md"]);
        assert_eq!(ids(&view.stack), vec!["six.md"]);
    }

    #[test]
    fn finished_articles_fall_through_to_the_stack() {
        let articles = vec![article("done.md", "D", 1, 2000, &[])];
        let progress = progress_map(&[("done.md", 100.0)]);
        let view = classify(&articles, &progress, &LibraryQuery::default(), &HashSet::new());

        assert!(view.continue_reading.is_empty());
        assert!(view.quick_wins.is_empty());
        assert_eq!(ids(&view.stack), vec!["done.md"]);
    }

    #[test]
    fn continue_reading_is_ordered_by_progress_descending() {
        let articles = vec![
            article("a.md", "A", 1, 2000, &[]),
            article("b.md", "B", 2, 2000, &[]),
            article("c.md", "C", 3, 2000, &[]),
        ];
        let progress = progress_map(&[("a.md", 20.0), ("b.md", 80.0), ("c.md", 50.0)]);
        let view = classify(&articles, &progress, &LibraryQuery::default(), &HashSet::new());

        assert_eq!(ids(&view.continue_reading), vec!["b.md", "c.md", "a.md"]);
    }

    #[test]
    fn quick_wins_are_ordered_shortest_first() {
        let articles = vec![
            article("four.md", "Four", 1, 900, &[]),
            article("one.md", "One", 2, 100, &[]),
            article("two.md", "Two", 3, 450, &[]),
        ];
        let view = classify(
            &articles,
            &HashMap::new(),
            &LibraryQuery::default(),
            &HashSet::new(),
        );

        assert_eq!(ids(&view.quick_wins), vec!["one.md", "two.md", "four.md"]);
    }

    #[test]
    fn stack_preserves_the_active_sort_order() {
        let articles = vec![
            article("long-old.md", "LO", 9, 9000, &[]),
            article("long-new.md", "LN", 1, 9000, &[]),
            article("short.md", "S", 5, 100, &[]),
        ];
        let view = classify(
            &articles,
            &HashMap::new(),
            &LibraryQuery::default(),
            &HashSet::new(),
        );

        // short.md is a quick win; the stack keeps date-added ordering.
        assert_eq!(ids(&view.stack), vec!["long-new.md", "long-old.md"]);
    }

    #[test]
    fn archiving_removes_an_article_from_every_bucket() {
        let articles = vec![
            article("a.md", "A", 1, 100, &[]),
            article("b.md", "B", 2, 9000, &[]),
        ];
        let view = classify(
            &articles,
            &HashMap::new(),
            &LibraryQuery::default(),
            &archived_set(&["a.md"]),
        );

        assert!(ids(&view.active).iter().all(|id| id != "a.md"));
        assert!(ids(&view.quick_wins).is_empty());
        assert_eq!(ids(&view.archived), vec!["a.md"]);
    }

    #[test]
    fn pick_random_returns_none_for_an_empty_view() {
        let articles: Vec<Article> = Vec::new();
        let view = classify(
            &articles,
            &HashMap::new(),
            &LibraryQuery::default(),
            &HashSet::new(),
        );
        let mut rng = StdRng::seed_from_u64(7);

        assert!(pick_random(&view, &mut rng).is_none());
    }

    #[test]
    fn pick_random_with_one_candidate_returns_it() {
        let articles = vec![article("only.md", "Only", 1, 9000, &[])];
        let view = classify(
            &articles,
            &HashMap::new(),
            &LibraryQuery::default(),
            &HashSet::new(),
        );
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(pick_random(&view, &mut rng).map(|a| a.id.as_str()), Some("only.md"));
    }

    #[test]
    fn pick_random_prefers_in_progress_over_quick_over_stack() {
        let articles = vec![
            article("continue.md", "C", 1, 2000, &[]),
            article("quick.md", "Q", 2, 100, &[]),
            article("stack.md", "S", 3, 9000, &[]),
        ];
        let progress = progress_map(&[("continue.md", 40.0)]);
        let view = classify(&articles, &progress, &LibraryQuery::default(), &HashSet::new());

        let mut rng = StdRng::seed_from_u64(42);
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for _ in 0..3000 {
            let picked = pick_random(&view, &mut rng).unwrap();
            *counts.entry(picked.id.as_str()).or_default() += 1;
        }

        let continue_count = counts["continue.md"];
        let quick_count = counts["quick.md"];
        let stack_count = counts["stack.md"];
        assert!(
            continue_count > quick_count && quick_count > stack_count,
            "expected 3:2:1 bias, got {continue_count}/{quick_count}/{stack_count}"
        );
        assert_eq!(continue_count + quick_count + stack_count, 3000);
    }

    #[test]
    fn next_unread_skips_finished_and_wraps() {
        let articles = vec![
            article("a.md", "A", 1, 100, &[]),
            article("b.md", "B", 2, 100, &[]),
            article("c.md", "C", 3, 100, &[]),
        ];
        let refs: Vec<&Article> = articles.iter().collect();
        let progress = progress_map(&[("b.md", 100.0)]);

        // After c.md the scan wraps past finished b.md to a.md.
        let next = next_unread(&refs, "c.md", &progress);
        assert_eq!(next.map(|a| a.id.as_str()), Some("a.md"));
    }

    #[test]
    fn next_unread_never_returns_the_current_article() {
        let articles = vec![
            article("a.md", "A", 1, 100, &[]),
            article("b.md", "B", 2, 100, &[]),
        ];
        let refs: Vec<&Article> = articles.iter().collect();
        let progress = progress_map(&[("b.md", 100.0)]);

        assert_eq!(next_unread(&refs, "a.md", &progress), None);
    }

    #[test]
    fn next_unread_with_unknown_current_starts_from_the_top() {
        let articles = vec![
            article("a.md", "A", 1, 100, &[]),
            article("b.md", "B", 2, 100, &[]),
        ];
        let refs: Vec<&Article> = articles.iter().collect();

        let next = next_unread(&refs, "missing.md", &HashMap::new());
        assert_eq!(next.map(|a| a.id.as_str()), Some("a.md"));
    }

    #[test]
    fn all_tags_is_the_sorted_union() {
        let articles = vec![
            article("a.md", "A", 1, 100, &["rust", "focus"]),
            article("b.md", "B", 2, 100, &["focus", "essays"]),
        ];

        assert_eq!(all_tags(&articles), vec!["essays", "focus", "rust"]);
    }
}
