//! Fetch + parse orchestration with a single-flight guard.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::source::Fetch;
use crate::{BibEntry, BibParser, LoadError};

/// Loads bibliographies through a fetcher and a parser.
///
/// At most one load runs at a time; a second call while one is pending
/// fails with [`LoadError::Busy`] instead of racing the first.
pub struct Loader {
    fetcher: Arc<dyn Fetch>,
    parser: Option<Arc<dyn BibParser>>,
    in_flight: AtomicBool,
}

impl Loader {
    pub fn new(fetcher: Arc<dyn Fetch>, parser: Option<Arc<dyn BibParser>>) -> Self {
        Self {
            fetcher,
            parser,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Fetch `source` and parse it into records.
    pub async fn fetch_entries(&self, source: &str) -> Result<Vec<BibEntry>, LoadError> {
        let _guard = InFlight::acquire(&self.in_flight).ok_or(LoadError::Busy)?;

        let parser = self.parser.as_ref().ok_or_else(|| {
            LoadError::ParseUnavailable("no BibTeX parser is configured".to_string())
        })?;

        let text = self.fetcher.fetch(source).await?;
        tracing::debug!(source, bytes = text.len(), "fetched bibliography");

        let entries = parser.parse(&text)?;
        tracing::info!(source, parser = parser.name(), entries = entries.len(), "parsed bibliography");
        Ok(entries)
    }
}

/// Holds the in-flight flag for the lifetime of one load.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
