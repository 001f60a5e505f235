//! Alias table generation
//!
//! Every canonical name contributes a small, enumerable family of surface
//! variants. Each alias remembers the [`AliasRule`] that produced it, so a
//! surprising resolution can be traced back to a generation rule.
//!
//! Keys are unique. When two names generate the same key, the name that
//! comes first in catalog order keeps it.

use super::catalog::{CanonicalName, Catalog};
use super::normalize::{sanitize, strip_compact};
use crate::config::Vocabulary;
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

/// A string produced by the normalizer; compared byte-wise
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NormalizedKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generation rule that produced an alias
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasRule {
    /// The canonical name as stored
    Verbatim,
    /// Separator-unified, casefolded
    Folded,
    /// Folded with whitespace removed
    Compact,
    /// Alphanumeric characters only
    Sanitized,
    /// Variant + " " + suffix word
    SuffixSpaced,
    /// Variant + suffix word, whitespace removed
    SuffixCompact,
    /// Name with its own suffix replaced, spaced
    BaseSuffixSpaced,
    /// Name with its own suffix replaced, whitespace removed
    BaseSuffixCompact,
}

/// One alias table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasEntry {
    pub key: NormalizedKey,
    pub canonical: CanonicalName,
    pub rule: AliasRule,
}

/// Many-to-one mapping from alias key to canonical name
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
    by_key: HashMap<NormalizedKey, usize>,
    conflicts: usize,
}

impl AliasTable {
    /// Generate the alias family of every name, in catalog order
    pub fn build(catalog: &Catalog, vocabulary: &Vocabulary) -> Self {
        let mut table = Self::default();
        for name in catalog {
            for (key, rule) in surface_variants(name.as_str(), vocabulary) {
                table.insert(key, name, rule);
            }
        }
        table
    }

    /// Insert unless the key is already taken. Returns true when inserted.
    pub fn insert(&mut self, key: String, canonical: &CanonicalName, rule: AliasRule) -> bool {
        if key.is_empty() {
            return false;
        }
        if let Some(&idx) = self.by_key.get(key.as_str()) {
            let existing = &self.entries[idx];
            if existing.canonical != *canonical {
                self.conflicts += 1;
                tracing::trace!(
                    key = %key,
                    kept = %existing.canonical,
                    dropped = %canonical,
                    "alias key already taken"
                );
            }
            return false;
        }

        let key = NormalizedKey(key);
        self.by_key.insert(key.clone(), self.entries.len());
        self.entries.push(AliasEntry {
            key,
            canonical: canonical.clone(),
            rule,
        });
        true
    }

    pub fn get(&self, key: &str) -> Option<&CanonicalName> {
        self.entry(key).map(|e| &e.canonical)
    }

    pub fn entry(&self, key: &str) -> Option<&AliasEntry> {
        self.by_key.get(key).map(|&idx| &self.entries[idx])
    }

    /// Rows in insertion order
    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    /// All keys, sorted
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.iter().map(|e| e.key.as_str()).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys that a later name also generated but lost to an earlier one
    pub fn conflicts(&self) -> usize {
        self.conflicts
    }
}

/// Surface variants of one canonical name, with the rule for each
pub(crate) fn surface_variants(name: &str, vocabulary: &Vocabulary) -> Vec<(String, AliasRule)> {
    let normalizer = vocabulary.normalizer();
    let folded = normalizer.fold(name);
    let compact = strip_compact(&folded);

    let mut variants = vec![
        (name.to_string(), AliasRule::Verbatim),
        (folded.clone(), AliasRule::Folded),
        (compact.clone(), AliasRule::Compact),
        (sanitize(&normalizer.compose(name)), AliasRule::Sanitized),
    ];

    let mut stems: Vec<&str> = vec![name];
    for stem in [folded.as_str(), compact.as_str()] {
        if !stems.contains(&stem) {
            stems.push(stem);
        }
    }
    for stem in stems {
        for suffix in vocabulary.suffixes() {
            variants.push((format!("{stem} {suffix}"), AliasRule::SuffixSpaced));
            variants.push((strip_compact(&format!("{stem}{suffix}")), AliasRule::SuffixCompact));
        }
    }

    if let Some(base) = vocabulary.strip_suffix(&folded) {
        for suffix in vocabulary.suffixes() {
            variants.push((format!("{base} {suffix}"), AliasRule::BaseSuffixSpaced));
            variants.push((
                strip_compact(&format!("{base}{suffix}")),
                AliasRule::BaseSuffixCompact,
            ));
        }
    }

    variants
}
