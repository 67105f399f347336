//! The bibliography view model: record store, search, grouping.

use crate::accordion::{Accordion, ExpandPolicy};
use crate::authors::AuthorOptions;
use crate::group::{Group, GroupMode, group_entries};
use crate::loader::Loader;
use crate::search;
use crate::sort::{SortOrder, sort_entries};
use crate::{BibEntry, LoadError};

/// Options that shape how a loaded bibliography is presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    /// Field used to order records at load time.
    pub sort_by: String,
    pub order: SortOrder,
    /// Grouping applied to a freshly created view.
    pub group_mode: GroupMode,
    pub expand: ExpandPolicy,
    pub authors: AuthorOptions,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            sort_by: "year".to_string(),
            order: SortOrder::Desc,
            group_mode: GroupMode::Year,
            expand: ExpandPolicy::First,
            authors: AuthorOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing loaded yet.
    Empty,
    Loading,
    Ready,
    /// The last load failed; the message is meant for display.
    Failed(String),
}

/// What the view should currently show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation<'a> {
    Empty,
    Loading,
    Failed(&'a str),
    /// Nothing to show for a loaded bibliography: the query matched no
    /// records, or (with an empty query) the source held none.
    NoResults { query: &'a str },
    Groups(Vec<Group<'a>>),
}

#[derive(Debug, Clone)]
pub struct BibView {
    options: ViewOptions,
    raw_entries: Vec<BibEntry>,
    /// Indices into `raw_entries`, in display order.
    filtered: Vec<usize>,
    mode: GroupMode,
    query: String,
    status: LoadStatus,
}

impl Default for BibView {
    fn default() -> Self {
        Self::new(ViewOptions::default())
    }
}

impl BibView {
    pub fn new(options: ViewOptions) -> Self {
        Self {
            mode: options.group_mode,
            options,
            raw_entries: Vec::new(),
            filtered: Vec::new(),
            query: String::new(),
            status: LoadStatus::Empty,
        }
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn mode(&self) -> GroupMode {
        self.mode
    }

    /// The current query as the user typed it (trimmed).
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn raw_entries(&self) -> &[BibEntry] {
        &self.raw_entries
    }

    pub fn filtered_entries(&self) -> impl Iterator<Item = &BibEntry> + '_ {
        self.filtered.iter().map(|&i| &self.raw_entries[i])
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn find(&self, citation_key: &str) -> Option<&BibEntry> {
        self.raw_entries
            .iter()
            .find(|e| e.citation_key == citation_key)
    }

    /// Fetch, parse and install a bibliography.
    ///
    /// On failure the previous records are discarded and the error is kept
    /// in [`status`](Self::status) for display. A `Busy` loader leaves the
    /// view untouched.
    pub async fn load(&mut self, loader: &Loader, source: &str) -> Result<usize, LoadError> {
        let result = loader.fetch_entries(source).await;
        self.finish_load(source, result)
    }

    /// Mark the view as loading. Callers that fetch outside of
    /// [`load`](Self::load) use this together with [`finish_load`](Self::finish_load).
    pub fn begin_load(&mut self) {
        self.status = LoadStatus::Loading;
    }

    pub fn finish_load(
        &mut self,
        source: &str,
        result: Result<Vec<BibEntry>, LoadError>,
    ) -> Result<usize, LoadError> {
        match result {
            Ok(entries) => {
                let n = entries.len();
                self.set_entries(entries);
                Ok(n)
            }
            Err(LoadError::Busy) => Err(LoadError::Busy),
            Err(e) => {
                tracing::warn!(source, error = %e, "bibliography load failed");
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Replace all records. Clears the query.
    pub fn set_entries(&mut self, mut entries: Vec<BibEntry>) {
        sort_entries(&mut entries, &self.options.sort_by, self.options.order);
        self.filtered = (0..entries.len()).collect();
        self.raw_entries = entries;
        self.query.clear();
        self.status = LoadStatus::Ready;
    }

    fn fail(&mut self, err: &LoadError) {
        self.raw_entries.clear();
        self.filtered.clear();
        self.query.clear();
        self.status = LoadStatus::Failed(err.to_string());
    }

    /// Filter the records by a literal, case-insensitive substring.
    /// Returns the number of matches.
    pub fn handle_search(&mut self, query: &str) -> usize {
        self.query = query.trim().to_string();
        self.filtered = search::filter_indices(&self.raw_entries, &self.query);
        tracing::debug!(query = %self.query, matches = self.filtered.len(), "search applied");
        self.filtered.len()
    }

    pub fn set_group_mode(&mut self, mode: GroupMode) {
        self.mode = mode;
    }

    /// Filtered records grouped and ordered for the current mode.
    pub fn groups(&self) -> Vec<Group<'_>> {
        group_entries(self.filtered_entries(), self.mode)
    }

    pub fn presentation(&self) -> Presentation<'_> {
        match &self.status {
            LoadStatus::Empty => Presentation::Empty,
            LoadStatus::Loading => Presentation::Loading,
            LoadStatus::Failed(msg) => Presentation::Failed(msg),
            LoadStatus::Ready if self.filtered.is_empty() => Presentation::NoResults {
                query: &self.query,
            },
            LoadStatus::Ready => Presentation::Groups(self.groups()),
        }
    }

    /// Initial expansion state for the groups currently shown.
    pub fn accordion(&self) -> Accordion {
        let keys: Vec<_> = self.groups().into_iter().map(|g| g.key).collect();
        Accordion::new(&keys, self.options.expand)
    }
}
