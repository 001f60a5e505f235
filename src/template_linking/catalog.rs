//! Template catalog
//!
//! The catalog is the ordered list of canonical template names that a query
//! can resolve to. Order matters: every "first wins" rule in alias generation
//! and tie-breaking follows catalog order, so callers should hand in a stable
//! order (the column-derived constructor sorts).

use crate::config::Vocabulary;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

/// Authoritative name of one template in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalName(String);

impl CanonicalName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CanonicalName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CanonicalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CanonicalName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CanonicalName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Ordered, duplicate-free list of canonical names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    names: Vec<CanonicalName>,
}

impl Catalog {
    /// Build a catalog preserving caller order. Blank names are dropped and
    /// only the first of any exact duplicate is kept.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|name| !name.trim().is_empty())
            .filter(|name| seen.insert(name.clone()))
            .map(CanonicalName)
            .collect();
        Self { names }
    }

    /// Derive a catalog from a raw data column: trim, drop blanks,
    /// de-duplicate and sort. This is the stable order every resolution should use.
    pub fn from_column<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = values
            .into_iter()
            .map(|v| v.as_ref().trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        Self {
            names: unique.into_iter().map(CanonicalName).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanonicalName> {
        self.names.iter()
    }

    pub fn get(&self, position: usize) -> Option<&CanonicalName> {
        self.names.get(position)
    }

    pub fn names(&self) -> &[CanonicalName] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.as_str() == name)
    }

    /// Groups of names that collapse to the same compact form, in catalog
    /// order. The resolver cannot tell these apart past the literal stage;
    /// the first of each group wins every later comparison.
    pub fn compact_collisions(&self, vocabulary: &Vocabulary) -> Vec<Vec<CanonicalName>> {
        let normalizer = vocabulary.normalizer();
        let mut groups: Vec<Vec<CanonicalName>> = Vec::new();
        let mut group_of: HashMap<String, usize> = HashMap::new();

        for name in &self.names {
            let key = normalizer.compact(name.as_str());
            match group_of.get(&key) {
                Some(&idx) => groups[idx].push(name.clone()),
                None => {
                    group_of.insert(key, groups.len());
                    groups.push(vec![name.clone()]);
                }
            }
        }

        groups.retain(|g| g.len() > 1);
        groups
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CanonicalName;
    type IntoIter = std::slice::Iter<'a, CanonicalName>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}
