//! Template name linking
//!
//! Turns a free-form phrase ("고소작업 계획서 주세요") into one canonical
//! template name from the catalog.
//!
//! ```text
//! names ──► Catalog ──► CatalogIndex (forms, aliases, overrides)
//!                              │
//! query ──► Normalizer ──► Resolver ──► Resolved(name) | NotFound(query)
//! ```

pub mod alias;
pub mod catalog;
pub mod index;
pub mod normalize;
pub mod resolver;
pub mod similarity;
pub mod tie_break;

pub use alias::{AliasEntry, AliasRule, AliasTable, NormalizedKey};
pub use catalog::{CanonicalName, Catalog};
pub use index::{CatalogIndex, ForcedOverrides, IndexStats, IndexedName};
pub use normalize::Normalizer;
pub use resolver::{MatchStage, Resolution, Resolver, TemplateMatch};
pub use tie_break::{TieBreak, UsageCounts};
