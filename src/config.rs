//! Resolver vocabulary configuration
//!
//! Loads the suffix words, request phrases, override markers and similarity
//! threshold from YAML and compiles them into an immutable [`Vocabulary`].
//! Nothing here is a module-level constant: tests and deployments can swap
//! the whole vocabulary without recompiling.
//!
//! ```yaml
//! suffixes: ["점검표", "계획서", "서식", "표", "양식"]
//! preferred_suffix: "점검표"
//! override_markers:
//!   - key: jsa
//!     patterns: ["jsa", "작업안전분석"]
//! similarity_threshold: 0.6
//! ```

use crate::error::{ConfigError, Result};
use crate::template_linking::normalize::{casefold, strip_compact, unify_separators, Normalizer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Raw, serializable resolver configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Domain suffix words ("form/checklist/plan" class), in alias generation order
    #[serde(default = "default_suffixes")]
    pub suffixes: Vec<String>,
    /// Grammatical particles allowed between a trailing suffix and a request phrase
    #[serde(default = "default_particles")]
    pub particles: Vec<String>,
    /// Politeness / request phrases stripped from the end of a query
    #[serde(default = "default_request_phrases")]
    pub request_phrases: Vec<String>,
    /// Suffix preferred by the tie-break policy
    #[serde(default = "default_preferred_suffix")]
    pub preferred_suffix: String,
    /// Abbreviation markers that short-circuit matching, in priority order
    #[serde(default = "default_override_markers")]
    pub override_markers: Vec<OverrideMarker>,
    /// Minimum normalized similarity for the approximate stage
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// NFC-compose queries and names before comparing
    #[serde(default = "default_compose_unicode")]
    pub compose_unicode: bool,
}

/// A forced-override abbreviation marker
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OverrideMarker {
    /// Marker key (e.g., "jsa")
    pub key: String,
    /// Substrings that identify the marker in a compact name or query
    pub patterns: Vec<String>,
}

impl OverrideMarker {
    pub fn new(key: &str, patterns: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }
}

fn default_suffixes() -> Vec<String> {
    ["점검표", "계획서", "서식", "표", "양식"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_particles() -> Vec<String> {
    vec!["을".to_string(), "를".to_string()]
}

fn default_request_phrases() -> Vec<String> {
    ["해주세요", "주세요", "줘", "달라", "전달", "please", "give me"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_preferred_suffix() -> String {
    "점검표".to_string()
}

fn default_override_markers() -> Vec<OverrideMarker> {
    vec![
        OverrideMarker::new("jsa", &["jsa", "작업안전분석"]),
        OverrideMarker::new("loto", &["loto"]),
    ]
}

fn default_similarity_threshold() -> f64 {
    0.6
}

fn default_compose_unicode() -> bool {
    true
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            suffixes: default_suffixes(),
            particles: default_particles(),
            request_phrases: default_request_phrases(),
            preferred_suffix: default_preferred_suffix(),
            override_markers: default_override_markers(),
            similarity_threshold: default_similarity_threshold(),
            compose_unicode: default_compose_unicode(),
        }
    }
}

impl ResolverConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Validate and compile into an immutable vocabulary
    pub fn compile(&self) -> Result<Vocabulary> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::InvalidThreshold(self.similarity_threshold));
        }
        if self.suffixes.is_empty() {
            return Err(ConfigError::EmptyList { field: "suffixes" });
        }
        check_entries("suffixes", &self.suffixes)?;
        check_entries("particles", &self.particles)?;
        check_entries("request_phrases", &self.request_phrases)?;
        if self.preferred_suffix.trim().is_empty() {
            return Err(ConfigError::EmptyEntry {
                field: "preferred_suffix",
            });
        }

        let mut seen = HashSet::new();
        let mut markers = Vec::with_capacity(self.override_markers.len());
        for marker in &self.override_markers {
            let key = compact_word(&marker.key);
            if key.is_empty() {
                return Err(ConfigError::EmptyEntry {
                    field: "override_markers",
                });
            }
            if !seen.insert(key.clone()) {
                return Err(ConfigError::DuplicateMarker { key });
            }
            check_entries("override_markers", &marker.patterns)?;
            let patterns: Vec<String> = marker.patterns.iter().map(|p| compact_word(p)).collect();
            if patterns.is_empty() {
                return Err(ConfigError::MarkerWithoutPatterns { key });
            }
            markers.push(CompiledMarker { key, patterns });
        }

        let suffixes: Vec<String> = self.suffixes.iter().map(|s| compact_word(s)).collect();
        let mut suffixes_longest_first = suffixes.clone();
        suffixes_longest_first.sort_by_key(|s| std::cmp::Reverse(s.chars().count()));

        let normalizer = Normalizer::new(
            &suffixes,
            &self.particles,
            &self.request_phrases,
            self.compose_unicode,
        )?;

        Ok(Vocabulary {
            suffixes,
            suffixes_longest_first,
            preferred_suffix: compact_word(&self.preferred_suffix),
            markers,
            similarity_threshold: self.similarity_threshold,
            normalizer,
        })
    }
}

fn check_entries(field: &'static str, entries: &[String]) -> Result<()> {
    if entries.iter().any(|e| e.trim().is_empty()) {
        return Err(ConfigError::EmptyEntry { field });
    }
    Ok(())
}

fn compact_word(word: &str) -> String {
    strip_compact(&casefold(&unify_separators(word)))
}

/// Override marker with its patterns in compact casefolded form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledMarker {
    pub key: String,
    pub patterns: Vec<String>,
}

impl CompiledMarker {
    /// True when any pattern occurs in the compact text
    pub fn matches(&self, compact: &str) -> bool {
        self.patterns.iter().any(|p| compact.contains(p.as_str()))
    }
}

/// Compiled, validated vocabulary shared by every index built from it
#[derive(Debug, Clone)]
pub struct Vocabulary {
    suffixes: Vec<String>,
    suffixes_longest_first: Vec<String>,
    preferred_suffix: String,
    markers: Vec<CompiledMarker>,
    similarity_threshold: f64,
    normalizer: Normalizer,
}

impl Default for Vocabulary {
    fn default() -> Self {
        ResolverConfig::default()
            .compile()
            .expect("default resolver vocabulary is valid")
    }
}

impl Vocabulary {
    /// Suffix words in configured order (compact, casefolded)
    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Strip one trailing suffix word, longest first. Returns `None` when the
    /// text has no suffix or consists of the suffix alone.
    pub fn strip_suffix<'a>(&self, text: &'a str) -> Option<&'a str> {
        let suffix = self
            .suffixes_longest_first
            .iter()
            .find(|suffix| text.ends_with(suffix.as_str()))?;
        let base = text[..text.len() - suffix.len()].trim_end();
        (!base.is_empty()).then_some(base)
    }

    pub fn preferred_suffix(&self) -> &str {
        &self.preferred_suffix
    }

    pub fn markers(&self) -> &[CompiledMarker] {
        &self.markers
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }
}
