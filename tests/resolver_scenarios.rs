//! End-to-end resolution scenarios over small catalogs

use std::sync::Arc;
use std::thread;

use template_resolver::{
    CatalogIndex, MatchStage, OverrideMarker, Resolution, ResolverConfig, TieBreak, UsageCounts,
    Vocabulary,
};

fn safety_index() -> CatalogIndex {
    CatalogIndex::with_defaults(["고소작업대작업계획서", "밀폐공간작업계획서", "전기작업허가서"])
}

fn name_of(resolution: &Resolution) -> Option<&str> {
    resolution.name().map(|n| n.as_str())
}

#[test]
fn test_documented_scenarios() {
    let index = safety_index();

    let cases = [
        ("고소작업대작업계획서", Some("고소작업대작업계획서")),
        ("고소작업 계획서 주세요", Some("고소작업대작업계획서")),
        ("밀폐공간", Some("밀폐공간작업계획서")),
        ("전기 작업 허가서", Some("전기작업허가서")),
        ("용접작업계획서", None),
    ];

    for (query, expected) in cases {
        let resolution = index.resolve(query);
        assert_eq!(name_of(&resolution), expected, "query: {query}");
        if expected.is_none() {
            assert_eq!(resolution, Resolution::NotFound(query.to_string()));
        }
    }
}

#[test]
fn test_exact_match_beats_fuzzy_candidates() {
    // "밀폐공간" would win the substring stage for either longer name
    let index = CatalogIndex::with_defaults(["밀폐공간 점검표", "밀폐공간", "밀폐공간 작업계획서"]);
    let resolution = index.resolve("밀폐공간");
    assert_eq!(name_of(&resolution), Some("밀폐공간"));
    assert_eq!(resolution.stage(), Some(MatchStage::Exact));
}

#[test]
fn test_forced_override_precedence() {
    let index = CatalogIndex::with_defaults([
        "JSA 작업안전분석 양식",
        "고소작업 안전점검표",
        "LOTO 잠금표지 절차서",
    ]);

    // token and substring stages would pick the 고소작업 checklist
    let resolution = index.resolve("고소작업 안전점검 jsa");
    assert_eq!(name_of(&resolution), Some("JSA 작업안전분석 양식"));
    assert_eq!(resolution.stage(), Some(MatchStage::ForcedOverride));

    let resolution = index.resolve("Loto 주세요");
    assert_eq!(name_of(&resolution), Some("LOTO 잠금표지 절차서"));
}

#[test]
fn test_ambiguity_resolves_to_first_in_catalog_order() {
    let index = CatalogIndex::with_defaults(["비계 설치 계획서", "비계 해체 계획서"]);
    for _ in 0..10 {
        match index.resolve("비계") {
            Resolution::Resolved(m) => {
                assert_eq!(m.name.as_str(), "비계 설치 계획서");
                assert_eq!(m.tie_break, Some(TieBreak::CatalogOrder));
            }
            Resolution::NotFound(q) => panic!("expected a match for {q}"),
        }
    }
}

#[test]
fn test_tie_break_is_uniform_across_stages() {
    let index = CatalogIndex::with_defaults(["비계설치 계획서", "비계설치 점검표", "가설비계설치 일지"]);

    // tokens stage
    let tokens = index.resolve("비계설치");
    assert_eq!(tokens.stage(), Some(MatchStage::Tokens));
    assert_eq!(name_of(&tokens), Some("비계설치 점검표"));

    // spaced names: the compact query is no longer a token substring
    let index = CatalogIndex::with_defaults(["비계 설치 계획서", "비계 설치 점검표", "가설 비계 설치"]);
    let prefix = index.resolve("비계설치");
    assert_eq!(prefix.stage(), Some(MatchStage::Prefix));
    assert_eq!(name_of(&prefix), Some("비계 설치 점검표"));

    let substring = index.resolve("계설치");
    assert_eq!(substring.stage(), Some(MatchStage::Substring));
    assert_eq!(name_of(&substring), Some("비계 설치 점검표"));
}

#[test]
fn test_usage_counts_break_ties() {
    let index = CatalogIndex::with_defaults(["굴착 작업계획서", "굴착 교육일지", "굴착 허가서"]);
    let usage: UsageCounts = [("굴착 허가서", 7_u64), ("굴착 교육일지", 3_u64)]
        .into_iter()
        .collect();

    match index.resolve_with_usage("굴착", &usage) {
        Resolution::Resolved(m) => {
            assert_eq!(m.name.as_str(), "굴착 허가서");
            assert_eq!(m.tie_break, Some(TieBreak::Usage));
        }
        Resolution::NotFound(q) => panic!("expected a match for {q}"),
    }
}

#[test]
fn test_recorded_usage_steers_later_ties() {
    let index = CatalogIndex::with_defaults(["굴착 작업계획서", "굴착 교육일지"]);
    let mut usage = UsageCounts::new();
    assert_eq!(name_of(&index.resolve_with_usage("굴착", &usage)), Some("굴착 작업계획서"));

    let picked = index.resolve_with_usage("굴착 교육일지", &usage);
    usage.record(picked.name().unwrap());

    let resolution = index.resolve_with_usage("굴착", &usage);
    assert_eq!(name_of(&resolution), Some("굴착 교육일지"));
    assert_eq!(resolution.stage(), Some(MatchStage::Tokens));
}

#[test]
fn test_later_stages_run_when_earlier_find_nothing() {
    let index = safety_index();
    // no exact, override, compact, token, prefix, substring or alias hit
    let resolution = index.resolve("밀폐공간작업계확서");
    assert_eq!(name_of(&resolution), Some("밀폐공간작업계획서"));
    assert_eq!(resolution.stage(), Some(MatchStage::Approximate));
}

#[test]
fn test_alternative_vocabulary() {
    let config = ResolverConfig {
        suffixes: vec!["checklist".into(), "plan".into(), "form".into()],
        particles: vec![],
        request_phrases: vec!["please".into()],
        preferred_suffix: "checklist".into(),
        override_markers: vec![OverrideMarker::new("loto", &["loto", "lockout"])],
        similarity_threshold: 0.6,
        compose_unicode: true,
    };
    let vocabulary = Arc::new(config.compile().unwrap());
    let index = CatalogIndex::from_names(
        [
            "Crane Lift Plan",
            "Crane Lift Checklist",
            "Hot Work Permit",
            "LOTO Procedure",
        ],
        vocabulary,
    );

    let resolution = index.resolve("crane-lift plan please");
    assert_eq!(name_of(&resolution), Some("Crane Lift Checklist"));
    assert_eq!(resolution.stage(), Some(MatchStage::Tokens));

    let resolution = index.resolve("hot work permt");
    assert_eq!(name_of(&resolution), Some("Hot Work Permit"));
    assert_eq!(resolution.stage(), Some(MatchStage::Approximate));

    let resolution = index.resolve("Lockout for pump");
    assert_eq!(name_of(&resolution), Some("LOTO Procedure"));
    assert_eq!(resolution.stage(), Some(MatchStage::ForcedOverride));

    assert!(index.alias_keys().contains(&"hot work permit form"));
}

#[test]
fn test_stricter_threshold_rejects_approximate() {
    let config = ResolverConfig {
        similarity_threshold: 0.95,
        ..Default::default()
    };
    let index = CatalogIndex::from_names(
        ["전기작업허가서"],
        Arc::new(config.compile().unwrap()),
    );
    assert!(!index.resolve("전기작업허가증").is_resolved());
}

#[test]
fn test_threshold_is_inclusive() {
    let config = ResolverConfig {
        similarity_threshold: 0.6,
        ..Default::default()
    };
    let index = CatalogIndex::from_names(["abxye"], Arc::new(config.compile().unwrap()));
    let resolution = index.resolve("abcde");
    assert_eq!(name_of(&resolution), Some("abxye"));
    assert_eq!(resolution.stage(), Some(MatchStage::Approximate));
}

#[test]
fn test_concurrent_resolution_is_deterministic() {
    let index = Arc::new(safety_index());
    let queries = [
        "고소작업대작업계획서",
        "고소작업 계획서 주세요",
        "밀폐공간",
        "전기 작업 허가서",
        "용접작업계획서",
        "전기작업허가증",
    ];
    let expected: Vec<Resolution> = queries.iter().map(|q| index.resolve(q)).collect();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let index = Arc::clone(&index);
            thread::spawn(move || queries.iter().map(|q| index.resolve(q)).collect::<Vec<_>>())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_rebuilt_index_matches_original() {
    let names = ["LOTO 절차 점검표", "JSA 양식", "크레인 점검표", "크레인 작업계획서"];
    let a = CatalogIndex::with_defaults(names);
    let b = CatalogIndex::with_defaults(names);
    assert_eq!(a.alias_keys(), b.alias_keys());
    assert_eq!(a.aliases().entries(), b.aliases().entries());
    assert_eq!(a.stats(), b.stats());
}

#[test]
fn test_sample_config_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/resolver.yaml");
    let config = ResolverConfig::from_file(path).unwrap();
    assert_eq!(config, ResolverConfig::default());
    assert!(config.compile().is_ok());
    let _ = Vocabulary::default();
}
