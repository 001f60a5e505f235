//! Query → canonical template name
//!
//! ## Pipeline
//!
//! ```text
//! query ─► exact ─► forced override ─► compact ─► tokens ─► prefix ─► substring ─► alias ─► approximate
//!            │             │               │          │         │           │          │          │
//!            └─────────────┴───────────────┴──────────┴─────────┴───────────┴──────────┴──────────┴─► Resolved
//!                                                                                     otherwise ─► NotFound
//! ```
//!
//! Stages run in that fixed order and the first one that yields a name wins.
//! The token, prefix and substring stages may find several names; those go
//! through the shared tie-break policy. A miss is a value, never an error.

use super::catalog::CanonicalName;
use super::index::{CatalogIndex, IndexedName};
use super::normalize::{casefold, sanitize, strip_compact, unify_separators};
use super::similarity::closest;
use super::tie_break::{break_tie, Contender, TieBreak, UsageCounts};
use serde::Serialize;
use smallvec::SmallVec;

/// Pipeline stage that produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    /// Verbatim, or equal after separator unification
    Exact,
    /// Query carries an abbreviation marker
    ForcedOverride,
    /// Equal compact casefolded forms
    Compact,
    /// Every query token occurs in the name
    Tokens,
    /// Name starts with the compact query
    Prefix,
    /// Name contains the compact query
    Substring,
    /// Alias table hit
    Alias,
    /// Edit-distance similarity above threshold
    Approximate,
}

/// A successful resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateMatch {
    pub name: CanonicalName,
    pub stage: MatchStage,
    /// Set by stages that can produce several candidates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tie_break: Option<TieBreak>,
    /// Set by the approximate stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

impl TemplateMatch {
    fn direct(name: &CanonicalName, stage: MatchStage) -> Self {
        Self {
            name: name.clone(),
            stage,
            tie_break: None,
            similarity: None,
        }
    }
}

/// Outcome of resolving one query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Resolution {
    Resolved(TemplateMatch),
    /// Carries the original query
    NotFound(String),
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn name(&self) -> Option<&CanonicalName> {
        match self {
            Resolution::Resolved(m) => Some(&m.name),
            Resolution::NotFound(_) => None,
        }
    }

    pub fn stage(&self) -> Option<MatchStage> {
        match self {
            Resolution::Resolved(m) => Some(m.stage),
            Resolution::NotFound(_) => None,
        }
    }

    /// Name for the exported document: the canonical name when resolved,
    /// otherwise the query as typed.
    pub fn output_stem(&self) -> &str {
        match self {
            Resolution::Resolved(m) => m.name.as_str(),
            Resolution::NotFound(query) => query.as_str(),
        }
    }
}

/// Query forms computed once per resolution
struct QueryForms<'q> {
    raw: &'q str,
    trimmed: &'q str,
    unified: String,
    folded: String,
    compact: String,
}

/// Runs the matching pipeline over a built index
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    index: &'a CatalogIndex,
    usage: Option<&'a UsageCounts>,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a CatalogIndex) -> Self {
        Self { index, usage: None }
    }

    /// Use historical usage counts for tie-breaking
    pub fn with_usage(mut self, usage: &'a UsageCounts) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn resolve(&self, query: &str) -> Resolution {
        let normalizer = self.index.vocabulary().normalizer();
        let trimmed = query.trim();
        let unified = unify_separators(&normalizer.compose(trimmed));
        let folded = casefold(&unified);
        let compact = strip_compact(&folded);

        if compact.is_empty() {
            tracing::debug!(query, "blank query");
            return Resolution::NotFound(query.to_string());
        }

        let forms = QueryForms {
            raw: query,
            trimmed,
            unified,
            folded,
            compact,
        };

        let empty = UsageCounts::default();
        let usage = self.usage.unwrap_or(&empty);

        let found = self
            .exact(&forms)
            .or_else(|| self.forced_override(&forms))
            .or_else(|| self.compact(&forms))
            .or_else(|| self.tokens(&forms, usage))
            .or_else(|| self.prefix(&forms, usage))
            .or_else(|| self.substring(&forms, usage))
            .or_else(|| self.alias(&forms))
            .or_else(|| self.approximate(&forms));

        match found {
            Some(m) => {
                tracing::debug!(
                    query,
                    stage = ?m.stage,
                    tie_break = ?m.tie_break,
                    name = %m.name,
                    "template resolved"
                );
                Resolution::Resolved(m)
            }
            None => {
                tracing::debug!(query, "no template matched");
                Resolution::NotFound(query.to_string())
            }
        }
    }

    fn names(&self) -> &'a [IndexedName] {
        self.index.names()
    }

    fn exact(&self, q: &QueryForms<'_>) -> Option<TemplateMatch> {
        self.names()
            .iter()
            .find(|n| {
                n.name.as_str() == q.raw || n.name.as_str() == q.trimmed || n.unified == q.unified
            })
            .map(|n| TemplateMatch::direct(&n.name, MatchStage::Exact))
    }

    fn forced_override(&self, q: &QueryForms<'_>) -> Option<TemplateMatch> {
        let index = self.index;
        index
            .vocabulary()
            .markers()
            .iter()
            .filter(|marker| marker.matches(&q.compact))
            .find_map(|marker| index.override_target(&marker.key))
            .map(|name| TemplateMatch::direct(name, MatchStage::ForcedOverride))
    }

    fn compact(&self, q: &QueryForms<'_>) -> Option<TemplateMatch> {
        self.names()
            .iter()
            .find(|n| n.compact == q.compact)
            .map(|n| TemplateMatch::direct(&n.name, MatchStage::Compact))
    }

    fn tokens(&self, q: &QueryForms<'_>, usage: &UsageCounts) -> Option<TemplateMatch> {
        let normalizer = self.index.vocabulary().normalizer();
        let stripped = normalizer.strip_trailing_request_phrase(&q.folded);
        let tokens: Vec<&str> = stripped.split_whitespace().collect();
        if tokens.is_empty() {
            return None;
        }
        self.pick(MatchStage::Tokens, usage, |n| {
            tokens.iter().all(|t| n.folded.contains(t))
        })
    }

    fn prefix(&self, q: &QueryForms<'_>, usage: &UsageCounts) -> Option<TemplateMatch> {
        self.pick(MatchStage::Prefix, usage, |n| {
            n.compact.starts_with(q.compact.as_str())
        })
    }

    fn substring(&self, q: &QueryForms<'_>, usage: &UsageCounts) -> Option<TemplateMatch> {
        self.pick(MatchStage::Substring, usage, |n| {
            n.compact.contains(q.compact.as_str())
        })
    }

    fn alias(&self, q: &QueryForms<'_>) -> Option<TemplateMatch> {
        let aliases = self.index.aliases();
        let normalizer = self.index.vocabulary().normalizer();
        let sanitized = sanitize(&normalizer.strip_trailing_request_phrase(&q.folded));

        let keys = [q.raw, q.trimmed, q.folded.as_str(), sanitized.as_str()];
        let found = keys
            .into_iter()
            .find_map(|key| aliases.get(key))
            .map(|name| TemplateMatch::direct(name, MatchStage::Alias));
        found
    }

    fn approximate(&self, q: &QueryForms<'_>) -> Option<TemplateMatch> {
        let threshold = self.index.vocabulary().similarity_threshold();
        let names = self.names();
        let (position, score) = closest(
            &q.compact,
            names.iter().map(|n| n.compact.as_str()),
            threshold,
        )?;
        Some(TemplateMatch {
            name: names[position].name.clone(),
            stage: MatchStage::Approximate,
            tie_break: None,
            similarity: Some(score),
        })
    }

    /// Collect every name passing `predicate` and settle ties
    fn pick<F>(&self, stage: MatchStage, usage: &UsageCounts, predicate: F) -> Option<TemplateMatch>
    where
        F: Fn(&IndexedName) -> bool,
    {
        let names = self.names();
        let contenders: SmallVec<[Contender<'_>; 8]> = names
            .iter()
            .enumerate()
            .filter(|(_, n)| predicate(n))
            .map(|(position, n)| Contender {
                position,
                name: &n.name,
                compact: &n.compact,
            })
            .collect();

        let preferred = self.index.vocabulary().preferred_suffix();
        let (position, tie_break) = break_tie(&contenders, preferred, usage)?;
        if contenders.len() > 1 {
            tracing::trace!(
                stage = ?stage,
                candidates = contenders.len(),
                reason = ?tie_break,
                chosen = %names[position].name,
                "tie broken"
            );
        }

        Some(TemplateMatch {
            name: names[position].name.clone(),
            stage,
            tie_break: Some(tie_break),
            similarity: None,
        })
    }
}

impl CatalogIndex {
    /// Resolver over this index
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self)
    }

    /// Resolve without usage counts
    pub fn resolve(&self, query: &str) -> Resolution {
        Resolver::new(self).resolve(query)
    }

    /// Resolve with usage counts for tie-breaking
    pub fn resolve_with_usage(&self, query: &str, usage: &UsageCounts) -> Resolution {
        Resolver::new(self).with_usage(usage).resolve(query)
    }
}
