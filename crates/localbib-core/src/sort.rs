use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::BibEntry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("asc"),
            SortOrder::Desc => f.write_str("desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order `{other}` (expected `asc` or `desc`)")),
        }
    }
}

/// Stable sort of `entries` by the value of `field`.
///
/// Integer values come first in numeric order, then everything else
/// case-insensitively. Records missing the field go last in either
/// direction.
pub fn sort_entries(entries: &mut [BibEntry], field: &str, order: SortOrder) {
    entries.sort_by(|a, b| match (a.get(field), b.get(field)) {
        (Some(x), Some(y)) => {
            let ord = SortKey::of(x).cmp(&SortKey::of(y));
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Total order over field values: every number sorts before every text.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Number(i64),
    Text(String),
}

impl SortKey {
    fn of(value: &str) -> Self {
        let value = value.trim();
        match value.parse::<i64>() {
            Ok(n) => SortKey::Number(n),
            Err(_) => SortKey::Text(value.to_lowercase()),
        }
    }
}
