use std::collections::HashSet;

use super::domain::{CandidateItem, ScoredItem};
use super::normalizer::normalize_title;

/// Anything that wraps a candidate can be deduplicated.
pub trait Deduplicable {
    fn candidate(&self) -> &CandidateItem;
}

impl Deduplicable for CandidateItem {
    fn candidate(&self) -> &CandidateItem {
        self
    }
}

impl Deduplicable for ScoredItem {
    fn candidate(&self) -> &CandidateItem {
        &self.candidate
    }
}

/// Streaming first-seen-wins filter.
///
/// An item is a duplicate when its normalized title was already admitted
/// from any source, or when its source already produced the same id. Items
/// with an empty title are identified by id only.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen_titles: HashSet<String>,
    seen_ids: HashSet<(String, String)>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the item is new and records it.
    pub fn admit<T: Deduplicable>(&mut self, item: &T) -> bool {
        let candidate = item.candidate();
        let title = normalize_title(&candidate.title);
        let id_key = (candidate.source_name.clone(), candidate.id.clone());

        if self.seen_ids.contains(&id_key) {
            return false;
        }
        if !title.is_empty() && self.seen_titles.contains(&title) {
            return false;
        }

        self.seen_ids.insert(id_key);
        if !title.is_empty() {
            self.seen_titles.insert(title);
        }
        true
    }

    /// Keep the first occurrence of each item, preserving input order.
    pub fn dedupe<T: Deduplicable>(items: Vec<T>) -> Vec<T> {
        let mut deduplicator = Self::new();
        items
            .into_iter()
            .filter(|item| deduplicator.admit(item))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(source: &str, id: &str, title: &str) -> CandidateItem {
        CandidateItem {
            id: id.to_string(),
            title: title.to_string(),
            body: String::new(),
            source_name: source.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap(),
            upvote_count: None,
            comment_count: None,
            source_url: String::new(),
        }
    }

    #[test]
    fn first_seen_title_wins_across_sources() {
        let items = vec![
            item("board", "1", "Rust Developer"),
            item("forum", "a", "  rust   developer "),
            item("forum", "b", "Go Developer"),
        ];

        let unique = Deduplicator::dedupe(items);

        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].source_name, "board");
        assert_eq!(unique[1].title, "Go Developer");
    }

    #[test]
    fn repeated_ids_within_a_source_collapse() {
        let items = vec![
            item("forum", "a", "Rust Developer"),
            item("forum", "a", "Rust Developer (edited)"),
            item("board", "a", "Rust Developer (board)"),
        ];

        let unique = Deduplicator::dedupe(items);

        let ids: Vec<_> = unique
            .iter()
            .map(|item| (item.source_name.as_str(), item.title.as_str()))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("forum", "Rust Developer"),
                ("board", "Rust Developer (board)")
            ]
        );
    }

    #[test]
    fn untitled_items_are_kept_unless_ids_repeat() {
        let items = vec![
            item("forum", "a", ""),
            item("forum", "b", "   "),
            item("forum", "a", ""),
        ];

        let unique = Deduplicator::dedupe(items);

        assert_eq!(unique.len(), 2);
    }

    #[test]
    fn dedupe_is_a_fixed_point() {
        let items = vec![
            item("board", "1", "Rust Developer"),
            item("forum", "a", "rust developer"),
            item("forum", "b", "Designer"),
            item("forum", "b", "Designer II"),
        ];

        let once = Deduplicator::dedupe(items);
        let twice = Deduplicator::dedupe(once.clone());

        assert_eq!(once, twice);
    }
}
