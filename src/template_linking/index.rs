//! Catalog index
//!
//! Everything the resolver needs, computed once from a catalog snapshot:
//! per-name comparison forms, the alias table and the forced-override map.
//! The index is read-only after [`CatalogIndex::build`]; share it behind an
//! `Arc` across threads and rebuild when the catalog changes.

use super::alias::AliasTable;
use super::catalog::{CanonicalName, Catalog};
use super::normalize::unify_separators;
use crate::config::Vocabulary;
use std::sync::Arc;

/// Comparison forms of one canonical name
#[derive(Debug, Clone)]
pub struct IndexedName {
    pub name: CanonicalName,
    /// Separator-unified, case preserved
    pub unified: String,
    /// Separator-unified, casefolded
    pub folded: String,
    /// Casefolded, whitespace removed
    pub compact: String,
}

/// Marker key → first catalog position whose compact form carries the marker.
/// Kept in configured marker order.
#[derive(Debug, Clone, Default)]
pub struct ForcedOverrides {
    entries: Vec<(String, usize)>,
}

impl ForcedOverrides {
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, p)| (k.as_str(), *p))
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, position)| *position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Prebuilt lookup structures over one catalog snapshot
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    catalog: Catalog,
    names: Vec<IndexedName>,
    aliases: AliasTable,
    overrides: ForcedOverrides,
    vocabulary: Arc<Vocabulary>,
}

impl CatalogIndex {
    /// Build the index. Pure: the same ordered catalog and vocabulary always
    /// produce the same alias table and override map.
    pub fn build(catalog: Catalog, vocabulary: Arc<Vocabulary>) -> Self {
        let normalizer = vocabulary.normalizer();

        let names: Vec<IndexedName> = catalog
            .iter()
            .map(|name| {
                let unified = unify_separators(&normalizer.compose(name.as_str()));
                let folded = normalizer.fold(name.as_str());
                let compact = normalizer.compact(name.as_str());
                IndexedName {
                    name: name.clone(),
                    unified,
                    folded,
                    compact,
                }
            })
            .collect();

        let aliases = AliasTable::build(&catalog, &vocabulary);

        let mut overrides = ForcedOverrides::default();
        for marker in vocabulary.markers() {
            if let Some(position) = names.iter().position(|n| marker.matches(&n.compact)) {
                overrides.entries.push((marker.key.clone(), position));
            }
        }

        for group in catalog.compact_collisions(&vocabulary) {
            tracing::warn!(
                names = ?group.iter().map(|n| n.as_str()).collect::<Vec<_>>(),
                kept = %group[0],
                "catalog names collapse to the same compact form"
            );
        }

        tracing::debug!(
            names = names.len(),
            aliases = aliases.len(),
            alias_conflicts = aliases.conflicts(),
            overrides = overrides.len(),
            "catalog index built"
        );

        Self {
            catalog,
            names,
            aliases,
            overrides,
            vocabulary,
        }
    }

    /// Build from an ordered list of names
    pub fn from_names<I, S>(names: I, vocabulary: Arc<Vocabulary>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(Catalog::new(names), vocabulary)
    }

    /// Build with the default vocabulary
    pub fn with_defaults<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_names(names, Arc::new(Vocabulary::default()))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn names(&self) -> &[IndexedName] {
        &self.names
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn overrides(&self) -> &ForcedOverrides {
        &self.overrides
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Canonical name for a forced-override marker key
    pub fn override_target(&self, key: &str) -> Option<&CanonicalName> {
        self.overrides.get(key).map(|p| &self.names[p].name)
    }

    /// Sorted alias keys, for listing what the resolver accepts
    pub fn alias_keys(&self) -> Vec<&str> {
        self.aliases.sorted_keys()
    }

    /// Statistics for debugging
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            name_count: self.names.len(),
            alias_count: self.aliases.len(),
            alias_conflicts: self.aliases.conflicts(),
            override_count: self.overrides.len(),
            compact_collisions: self.catalog.compact_collisions(&self.vocabulary).len(),
        }
    }
}

/// Index statistics
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct IndexStats {
    pub name_count: usize,
    pub alias_count: usize,
    pub alias_conflicts: usize,
    pub override_count: usize,
    pub compact_collisions: usize,
}

impl std::fmt::Display for IndexStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Catalog Index Statistics:")?;
        writeln!(f, "  Templates: {}", self.name_count)?;
        writeln!(f, "  Alias keys: {}", self.alias_count)?;
        writeln!(f, "  Alias conflicts: {}", self.alias_conflicts)?;
        writeln!(f, "  Forced overrides: {}", self.override_count)?;
        writeln!(f, "  Compact collisions: {}", self.compact_collisions)?;
        Ok(())
    }
}
