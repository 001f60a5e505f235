//! Property tests for normalization and resolution

use proptest::prelude::*;
use template_resolver::template_linking::normalize::{
    casefold, sanitize, strip_compact, unify_separators,
};
use template_resolver::{CatalogIndex, MatchStage};

const NAMES: [&str; 5] = [
    "고소작업대작업계획서",
    "밀폐공간작업계획서",
    "전기작업허가서",
    "JSA 작업안전분석 양식",
    "크레인 점검표",
];

proptest! {
    #[test]
    fn casefold_is_idempotent(s in ".*") {
        let once = casefold(&s);
        prop_assert_eq!(casefold(&once), once);
    }

    #[test]
    fn unify_separators_is_idempotent(s in ".*") {
        let once = unify_separators(&s);
        prop_assert!(!once.contains('_') && !once.contains('-'));
        prop_assert_eq!(unify_separators(&once), once);
    }

    #[test]
    fn strip_compact_is_idempotent(s in ".*") {
        let once = strip_compact(&s);
        prop_assert!(!once.chars().any(char::is_whitespace));
        prop_assert_eq!(strip_compact(&once), once);
    }

    #[test]
    fn sanitize_keeps_only_alphanumerics(s in ".*") {
        prop_assert!(sanitize(&s).chars().all(char::is_alphanumeric));
    }

    #[test]
    fn resolve_is_total_and_deterministic(query in ".*") {
        let index = CatalogIndex::with_defaults(NAMES);
        let first = index.resolve(&query);
        prop_assert_eq!(index.resolve(&query), first.clone());
        if let Some(name) = first.name() {
            prop_assert!(index.catalog().contains(name.as_str()));
        }
    }

    #[test]
    fn catalog_names_resolve_to_themselves(name in prop::sample::select(NAMES.to_vec())) {
        let index = CatalogIndex::with_defaults(NAMES);
        let resolution = index.resolve(name);
        prop_assert_eq!(resolution.name().map(|n| n.as_str()), Some(name));
        prop_assert_eq!(resolution.stage(), Some(MatchStage::Exact));
    }

    #[test]
    fn hangul_queries_never_panic(query in "[가-힣 _\\-]{0,24}") {
        let index = CatalogIndex::with_defaults(NAMES);
        let _ = index.resolve(&query);
    }
}
