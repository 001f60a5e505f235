//! Template Resolver
//!
//! Resolves a noisy, user-typed phrase to the canonical name of a
//! safety-document template, so the caller can export that template's rows.
//!
//! # Usage
//!
//! ```
//! use template_resolver::{CatalogIndex, MatchStage, Resolution};
//!
//! let index = CatalogIndex::with_defaults(["고소작업대작업계획서", "밀폐공간작업계획서", "전기작업허가서"]);
//!
//! match index.resolve("고소작업 계획서 주세요") {
//!     Resolution::Resolved(m) => assert_eq!(m.name.as_str(), "고소작업대작업계획서"),
//!     Resolution::NotFound(query) => panic!("no template for {query}"),
//! }
//! assert_eq!(index.resolve("전기 작업 허가서").stage(), Some(MatchStage::Compact));
//! assert!(!index.resolve("용접작업계획서").is_resolved());
//! ```
//!
//! A miss is an ordinary [`Resolution::NotFound`] value. What happens next
//! (a generated fallback document, a "no such template" message) is up to
//! the caller.

pub mod config;
pub mod error;
pub mod template_linking;

pub use config::{OverrideMarker, ResolverConfig, Vocabulary};
pub use error::{ConfigError, Result};
pub use template_linking::{
    AliasRule, CanonicalName, Catalog, CatalogIndex, IndexStats, MatchStage, Resolution, Resolver,
    TemplateMatch, TieBreak, UsageCounts,
};
