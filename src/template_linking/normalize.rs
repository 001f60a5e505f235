//! Text normalization for template matching
//!
//! Produces the comparison forms used by alias generation and resolution:
//! - Unicode NFC composition (optional, on by default)
//! - ASCII lowercase; other scripts untouched
//! - Underscore / hyphen to space, whitespace collapsing
//! - Compact form (all whitespace removed)
//! - Trailing request phrase removal ("... 계획서 주세요" → "...")
//!
//! Every function here is total: any `&str` in, a string out.

use regex::Regex;
use std::borrow::Cow;
use unicode_normalization::UnicodeNormalization;

/// Lowercase ASCII letters, leaving every other character as is.
///
/// ```
/// use template_resolver::template_linking::normalize::casefold;
///
/// assert_eq!(casefold("JSA 점검표"), "jsa 점검표");
/// ```
pub fn casefold(s: &str) -> String {
    s.to_ascii_lowercase()
}

/// Map `_` and `-` to spaces, collapse whitespace runs and trim.
///
/// ```
/// use template_resolver::template_linking::normalize::unify_separators;
///
/// assert_eq!(unify_separators("  전기_작업-허가서  "), "전기 작업 허가서");
/// ```
pub fn unify_separators(s: &str) -> String {
    let spaced: String = s
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove all whitespace.
pub fn strip_compact(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Casefold and keep only alphanumeric characters (drops brackets, dots, symbols).
pub fn sanitize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Build an alternation from literal words, longest first so that
/// "해주세요" is tried before "주세요" at the same position.
fn alternation(words: &[String]) -> String {
    let mut words: Vec<String> = words
        .iter()
        .map(|w| casefold(&unify_separators(w)))
        .collect();
    words.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));
    words
        .iter()
        .map(|w| regex::escape(w).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|")
}

/// Stateful normalizer carrying the compiled trailing-phrase pattern.
#[derive(Debug, Clone)]
pub struct Normalizer {
    trailing_phrase: Regex,
    compose_unicode: bool,
}

impl Normalizer {
    /// Compile the trailing request phrase pattern:
    /// `suffix (particle)? (request)?` anchored at end of text.
    pub fn new(
        suffixes: &[String],
        particles: &[String],
        request_phrases: &[String],
        compose_unicode: bool,
    ) -> Result<Self, regex::Error> {
        let mut pattern = format!(r"(?i)\s*(?:{})", alternation(suffixes));
        if !particles.is_empty() {
            pattern.push_str(&format!("(?:{})?", alternation(particles)));
        }
        if !request_phrases.is_empty() {
            pattern.push_str(&format!(r"\s*(?:{})?", alternation(request_phrases)));
        }
        pattern.push_str(r"\s*$");

        Ok(Self {
            trailing_phrase: Regex::new(&pattern)?,
            compose_unicode,
        })
    }

    /// NFC-compose when enabled; borrows when nothing changes.
    pub fn compose<'a>(&self, s: &'a str) -> Cow<'a, str> {
        if !self.compose_unicode || unicode_normalization::is_nfc(s) {
            Cow::Borrowed(s)
        } else {
            Cow::Owned(s.nfc().collect())
        }
    }

    /// Separator-unified, casefolded form
    pub fn fold(&self, s: &str) -> String {
        casefold(&unify_separators(&self.compose(s)))
    }

    /// Compact, casefolded form
    pub fn compact(&self, s: &str) -> String {
        strip_compact(&self.fold(s))
    }

    /// Remove a trailing suffix word with its optional particle and request
    /// phrase. Interior occurrences are left alone.
    pub fn strip_trailing_request_phrase(&self, s: &str) -> String {
        self.trailing_phrase.replace(s, "").trim().to_string()
    }

    /// Whitespace tokens of the folded query after trailing phrase removal
    pub fn query_tokens(&self, query: &str) -> Vec<String> {
        self.strip_trailing_request_phrase(&self.fold(query))
            .split_whitespace()
            .map(|t| t.to_string())
            .collect()
    }
}
