use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::group::GroupKey;

/// Which groups start expanded after a render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpandPolicy {
    #[default]
    First,
    All,
    None,
}

impl fmt::Display for ExpandPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExpandPolicy::First => "first",
            ExpandPolicy::All => "all",
            ExpandPolicy::None => "none",
        })
    }
}

impl FromStr for ExpandPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(ExpandPolicy::First),
            "all" => Ok(ExpandPolicy::All),
            "none" => Ok(ExpandPolicy::None),
            other => Err(format!(
                "unknown expand policy `{other}` (expected `first`, `all` or `none`)"
            )),
        }
    }
}

/// Expanded/collapsed state of each rendered group.
///
/// Rebuilt from the policy on every render; [`toggle`](Accordion::toggle) is
/// the only transition.
#[derive(Debug, Clone, Default)]
pub struct Accordion {
    expanded: HashSet<GroupKey>,
}

impl Accordion {
    pub fn new<'a, I>(keys: I, policy: ExpandPolicy) -> Self
    where
        I: IntoIterator<Item = &'a GroupKey>,
    {
        let mut keys = keys.into_iter();
        let expanded = match policy {
            ExpandPolicy::All => keys.cloned().collect(),
            ExpandPolicy::First => keys.next().cloned().into_iter().collect(),
            ExpandPolicy::None => HashSet::new(),
        };
        Self { expanded }
    }

    pub fn is_expanded(&self, key: &GroupKey) -> bool {
        self.expanded.contains(key)
    }

    /// Flip one group; returns whether it is now expanded.
    pub fn toggle(&mut self, key: &GroupKey) -> bool {
        if self.expanded.remove(key) {
            false
        } else {
            self.expanded.insert(key.clone());
            true
        }
    }
}
