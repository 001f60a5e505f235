//! Approximate matching on compact forms
//!
//! Normalized Levenshtein similarity: `1 - distance / max(len_a, len_b)`,
//! counted in chars, so 1.0 means identical and 0.0 means nothing shared.

/// Normalized edit-distance similarity in `[0, 1]`
#[inline]
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Position and score of the most similar candidate at or above `threshold`.
/// Equal scores keep the earliest candidate.
pub fn closest<'a, I>(query: &str, candidates: I, threshold: f64) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(usize, f64)> = None;
    for (position, candidate) in candidates.into_iter().enumerate() {
        let score = similarity(query, candidate);
        if score < threshold {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((position, score)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_bounds() {
        assert!((similarity("전기작업허가서", "전기작업허가서") - 1.0).abs() < 1e-9);
        assert!(similarity("abc", "xyz").abs() < 1e-9);
    }

    #[test]
    fn test_similarity_counts_chars() {
        // one substitution over seven Hangul syllables
        let score = similarity("전기작업허가서", "전기작업허가증");
        assert!((score - 6.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_closest_respects_threshold() {
        let names = ["고소작업대작업계획서", "밀폐공간작업계획서", "전기작업허가서"];
        assert_eq!(closest("용접작업계획서", names, 0.6), None);
        let (pos, score) = closest("밀폐공간작업계획", names, 0.6).unwrap();
        assert_eq!(pos, 1);
        assert!(score > 0.8);
    }

    #[test]
    fn test_closest_accepts_score_equal_to_threshold() {
        // two substitutions over five chars
        assert_eq!(closest("abcde", ["abxye"], 0.6), Some((0, 0.6)));
        assert_eq!(closest("abcde", ["abxye"], 0.61), None);
    }

    #[test]
    fn test_closest_tie_keeps_first() {
        assert_eq!(closest("ab", ["ax", "ay"], 0.5).map(|(p, _)| p), Some(0));
    }
}
