//! Grouping of records by year or by publication category.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::BibEntry;

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|[^0-9])([0-9]{4})(?:[^0-9]|$)").unwrap());

/// Label used for records that fit no other group.
pub const OTHERS_LABEL: &str = "Others";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    #[default]
    Year,
    Type,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown group mode `{0}` (expected `year` or `type`)")]
pub struct ModeError(pub String);

impl GroupMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupMode::Year => "year",
            GroupMode::Type => "type",
        }
    }
}

impl fmt::Display for GroupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupMode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "year" => Ok(GroupMode::Year),
            "type" => Ok(GroupMode::Type),
            other => Err(ModeError(other.to_string())),
        }
    }
}

/// Publication category derived from the BibTeX entry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    JournalArticles,
    ConferencePapers,
    Books,
    Theses,
    TechnicalReports,
    Preprints,
    Others,
}

impl Category {
    pub fn from_entry_type(entry_type: &str) -> Self {
        match entry_type.trim().to_ascii_lowercase().as_str() {
            "article" => Category::JournalArticles,
            "inproceedings" | "proceedings" => Category::ConferencePapers,
            "book" => Category::Books,
            "phdthesis" | "mastersthesis" => Category::Theses,
            "techreport" => Category::TechnicalReports,
            "misc" => Category::Preprints,
            _ => Category::Others,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::JournalArticles => "Journal Articles",
            Category::ConferencePapers => "Conference Papers",
            Category::Books => "Books",
            Category::Theses => "Theses",
            Category::TechnicalReports => "Technical Reports",
            Category::Preprints => "Preprints & Others",
            Category::Others => OTHERS_LABEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Four ASCII digits.
    Year(String),
    Category(Category),
    /// Year mode bucket for records without a usable year.
    Undated,
}

impl GroupKey {
    pub fn for_entry(entry: &BibEntry, mode: GroupMode) -> Self {
        match mode {
            GroupMode::Year => entry
                .year()
                .and_then(extract_year)
                .map(GroupKey::Year)
                .unwrap_or(GroupKey::Undated),
            GroupMode::Type => GroupKey::Category(Category::from_entry_type(&entry.entry_type)),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            GroupKey::Year(y) => y,
            GroupKey::Category(c) => c.label(),
            GroupKey::Undated => OTHERS_LABEL,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pull a four-digit year out of a `year` tag such as `2020`, `2020a` or `{2020}`.
pub fn extract_year(value: &str) -> Option<String> {
    let value = value.trim();
    if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
        return Some(value.to_string());
    }
    YEAR_RE
        .captures(value)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// A bucket of records sharing a key, in filtered order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<'a> {
    pub key: GroupKey,
    pub entries: Vec<&'a BibEntry>,
}

impl Group<'_> {
    pub fn label(&self) -> &str {
        self.key.label()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Partition `entries` by key and order the groups for `mode`.
///
/// Year mode puts the newest year first and the undated bucket last.
/// Type mode orders groups by label.
pub fn group_entries<'a, I>(entries: I, mode: GroupMode) -> Vec<Group<'a>>
where
    I: IntoIterator<Item = &'a BibEntry>,
{
    let mut groups: Vec<Group<'a>> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for entry in entries {
        let key = GroupKey::for_entry(entry, mode);
        match index.get(&key) {
            Some(&i) => groups[i].entries.push(entry),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(Group {
                    key,
                    entries: vec![entry],
                });
            }
        }
    }

    groups.sort_by(|a, b| compare_keys(&a.key, &b.key, mode));
    groups
}

fn compare_keys(a: &GroupKey, b: &GroupKey, mode: GroupMode) -> Ordering {
    match mode {
        GroupMode::Year => match (a, b) {
            (GroupKey::Year(x), GroupKey::Year(y)) => y.cmp(x),
            (GroupKey::Year(_), _) => Ordering::Less,
            (_, GroupKey::Year(_)) => Ordering::Greater,
            _ => a.label().cmp(b.label()),
        },
        GroupMode::Type => a.label().cmp(b.label()),
    }
}
