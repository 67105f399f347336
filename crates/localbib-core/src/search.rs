//! Literal substring search over the display fields of a record.

use crate::BibEntry;

/// Fields concatenated into the searchable text, in this order.
pub const SEARCH_FIELDS: &[&str] = &[
    "title",
    "author",
    "note",
    "bibbase_note",
    "journal",
    "booktitle",
];

/// Trim and case-fold a user query.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Case-folded concatenation of [`SEARCH_FIELDS`], space separated.
pub fn searchable_text(entry: &BibEntry) -> String {
    SEARCH_FIELDS
        .iter()
        .filter_map(|f| entry.get(f))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// True if `entry` matches an already normalized query. Empty queries match everything.
pub fn matches(entry: &BibEntry, normalized_query: &str) -> bool {
    normalized_query.is_empty() || searchable_text(entry).contains(normalized_query)
}

/// Indices of the entries matching `query`.
pub fn filter_indices(entries: &[BibEntry], query: &str) -> Vec<usize> {
    let q = normalize_query(query);
    entries
        .iter()
        .enumerate()
        .filter(|(_, e)| matches(e, &q))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<BibEntry> {
        vec![
            BibEntry::new("article", "a")
                .with_field("title", "Deep Learning for Cats")
                .with_field("author", "Ada Lovelace")
                .with_field("journal", "Feline Review"),
            BibEntry::new("inproceedings", "b")
                .with_field("title", "Graph Theory Revisited")
                .with_field("author", "Leonhard Euler")
                .with_field("booktitle", "Proc. Bridges"),
            BibEntry::new("misc", "c")
                .with_field("title", "Notes")
                .with_field("bibbase_note", "<b>Best Paper</b>")
                .with_field("abstract", "ignored cats"),
        ]
    }

    #[test]
    fn empty_query_keeps_everything() {
        assert_eq!(filter_indices(&sample(), "   "), [0, 1, 2]);
    }

    #[test]
    fn query_is_trimmed_and_case_folded() {
        assert_eq!(filter_indices(&sample(), "  deep LEARNING "), [0]);
    }

    #[test]
    fn searches_author_venue_and_notes() {
        let entries = sample();
        assert_eq!(filter_indices(&entries, "euler"), [1]);
        assert_eq!(filter_indices(&entries, "bridges"), [1]);
        assert_eq!(filter_indices(&entries, "feline"), [0]);
        assert_eq!(filter_indices(&entries, "best paper"), [2]);
    }

    #[test]
    fn fields_outside_the_search_set_are_ignored() {
        assert_eq!(filter_indices(&sample(), "cats"), [0]);
    }

    #[test]
    fn no_match_is_empty() {
        assert!(filter_indices(&sample(), "quantum").is_empty());
    }
}
