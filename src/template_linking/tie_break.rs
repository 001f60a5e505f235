//! Tie-break policy for stages that can return several candidates
//!
//! 1. A unique candidate ending in the preferred suffix wins.
//! 2. Otherwise the highest usage count wins (absent names count 0).
//! 3. Otherwise the earliest in catalog order wins.
//!
//! The same policy applies to the token, prefix and substring stages.

use super::catalog::CanonicalName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Historical usage frequency per canonical name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageCounts(HashMap<CanonicalName, u64>);

impl UsageCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count for a name, 0 when never seen
    pub fn get(&self, name: &str) -> u64 {
        self.0.get(name).copied().unwrap_or(0)
    }

    pub fn set(&mut self, name: impl Into<CanonicalName>, count: u64) {
        self.0.insert(name.into(), count);
    }

    /// Bump the count for a resolved name
    pub fn record(&mut self, name: &CanonicalName) {
        *self.0.entry(name.clone()).or_insert(0) += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<CanonicalName>> FromIterator<(N, u64)> for UsageCounts {
    fn from_iter<T: IntoIterator<Item = (N, u64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(n, c)| (n.into(), c)).collect())
    }
}

/// Why a candidate was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Only one candidate
    Unique,
    /// Only candidate ending in the preferred suffix
    PreferredSuffix,
    /// Highest usage count
    Usage,
    /// Equal on every rule; first in catalog order
    CatalogOrder,
}

/// A candidate as seen by the tie-break policy
pub(crate) struct Contender<'a> {
    pub position: usize,
    pub name: &'a CanonicalName,
    pub compact: &'a str,
}

/// Pick one candidate. `contenders` must be in catalog order.
pub(crate) fn break_tie(
    contenders: &[Contender<'_>],
    preferred_suffix: &str,
    usage: &UsageCounts,
) -> Option<(usize, TieBreak)> {
    match contenders {
        [] => return None,
        [only] => return Some((only.position, TieBreak::Unique)),
        _ => {}
    }

    let mut preferred = contenders
        .iter()
        .filter(|c| c.compact.ends_with(preferred_suffix));
    if let (Some(first), None) = (preferred.next(), preferred.next()) {
        return Some((first.position, TieBreak::PreferredSuffix));
    }

    // max_by_key keeps the last maximum; walk in reverse so the first wins
    let top = contenders
        .iter()
        .rev()
        .max_by_key(|c| usage.get(c.name.as_str()))?;
    let top_count = usage.get(top.name.as_str());
    let shared = contenders
        .iter()
        .filter(|c| usage.get(c.name.as_str()) == top_count)
        .count();

    let reason = if shared == 1 {
        TieBreak::Usage
    } else {
        TieBreak::CatalogOrder
    };
    Some((top.position, reason))
}
