use std::path::PathBuf;

use thiserror::Error;

pub mod accordion;
pub mod authors;
pub mod config_file;
pub mod group;
pub mod loader;
pub mod raw;
pub mod search;
pub mod sort;
pub mod source;
pub mod view;

// Re-export for convenience
pub use accordion::{Accordion, ExpandPolicy};
pub use authors::{AuthorList, AuthorName, AuthorOptions, format_authors};
pub use group::{Category, Group, GroupKey, GroupMode, group_entries};
pub use loader::Loader;
pub use raw::{RAW_PLACEHOLDER, generate_raw};
pub use sort::SortOrder;
pub use source::{Fetch, MemoryFetcher, SourceFetcher};
pub use view::{BibView, LoadStatus, Presentation, ViewOptions};

/// A single parsed bibliography record.
///
/// Fields are kept in source order so that regenerating the record is
/// deterministic. Field names are matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibEntry {
    /// Lower-cased type tag, e.g. `article`.
    pub entry_type: String,
    pub citation_key: String,
    pub fields: Vec<(String, String)>,
}

impl BibEntry {
    pub fn new(entry_type: impl Into<String>, citation_key: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into().to_lowercase(),
            citation_key: citation_key.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field, keeping insertion order.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Value of the first field called `name` whose value is not blank.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, v)| k.eq_ignore_ascii_case(name) && !v.trim().is_empty())
            .map(|(_, v)| v.as_str())
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    pub fn author(&self) -> Option<&str> {
        self.get("author")
    }

    pub fn year(&self) -> Option<&str> {
        self.get("year")
    }

    pub fn url(&self) -> Option<&str> {
        self.get("url")
    }

    /// Free-form HTML note attached by bibbase exports.
    pub fn bibbase_note(&self) -> Option<&str> {
        self.get("bibbase_note")
    }

    /// Where the work appeared: `journal`, falling back to `booktitle`.
    pub fn venue(&self) -> Option<&str> {
        self.get("journal").or_else(|| self.get("booktitle"))
    }
}

/// A bibliography parser. Implementations live outside this crate.
pub trait BibParser: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// Parse bibliography text into records, preserving source order.
    fn parse(&self, text: &str) -> Result<Vec<BibEntry>, ParseError>;
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unknown source: {0}")]
    UnknownSource(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("BibTeX parser not available: {0}")]
    Unavailable(String),
    #[error("malformed bibliography: {0}")]
    Malformed(String),
}

/// Reasons a bibliography load can fail. Any of these aborts the whole load.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("{0}")]
    Fetch(#[from] FetchError),
    #[error("{0}")]
    ParseUnavailable(String),
    #[error("{0}")]
    Parse(String),
    #[error("a bibliography load is already in progress")]
    Busy,
}

impl From<ParseError> for LoadError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Unavailable(msg) => LoadError::ParseUnavailable(msg),
            ParseError::Malformed(msg) => LoadError::Parse(msg),
        }
    }
}

/// Failure to regenerate the textual form of a single record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("entry `{0}` has no type tag")]
    MissingType(String),
    #[error("field `{field}` has unbalanced braces")]
    UnbalancedBraces { field: String },
    #[error("formatter error")]
    Fmt(#[from] std::fmt::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_is_case_insensitive_and_skips_blank_values() {
        let entry = BibEntry::new("Article", "k1")
            .with_field("Title", "  ")
            .with_field("title", "Real Title")
            .with_field("YEAR", "2021");
        assert_eq!(entry.entry_type, "article");
        assert_eq!(entry.title(), Some("Real Title"));
        assert_eq!(entry.year(), Some("2021"));
        assert_eq!(entry.author(), None);
    }

    #[test]
    fn venue_prefers_journal_over_booktitle() {
        let entry = BibEntry::new("inproceedings", "k")
            .with_field("booktitle", "Proc. X")
            .with_field("journal", "J. Y");
        assert_eq!(entry.venue(), Some("J. Y"));

        let entry = BibEntry::new("inproceedings", "k").with_field("booktitle", "Proc. X");
        assert_eq!(entry.venue(), Some("Proc. X"));
    }

    #[test]
    fn parse_errors_map_onto_load_errors() {
        let err: LoadError = ParseError::Unavailable("off".into()).into();
        assert!(matches!(err, LoadError::ParseUnavailable(_)));
        let err: LoadError = ParseError::Malformed("bad".into()).into();
        assert!(matches!(err, LoadError::Parse(_)));
    }
}
