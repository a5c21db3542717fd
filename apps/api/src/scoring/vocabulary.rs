//! Rating vocabulary — the fixed word-to-points table shared by both rating
//! streams (automated and consultant).
//!
//! Lookup is total: any token not in the table scores 0, never an error.

/// Word → points. Multi-word entries ("single instance") are matched as a
/// whole phrase. Ordered by points for readability; order is not semantic.
const WORD_POINTS: &[(&str, i64)] = &[
    ("low", 0),
    ("none", 0),
    ("no", 0),
    ("moderate", 1),
    ("notable", 1),
    ("legacy", 1),
    ("sound", 2),
    ("single instance", 2),
    ("yes", 2),
    ("strong", 3),
    ("exceptional", 5),
    ("thematic", 5),
];

/// Normalizes a raw rating token for lookup: lowercase, trimmed, internal
/// whitespace collapsed to single spaces ("Single  Instance" → "single instance").
pub fn normalize(raw: &str) -> String {
    raw.trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Converts a raw rating token to points.
///
/// Resolution order: vocabulary word, then literal non-negative integer
/// (raters occasionally report "3" instead of "strong"). Anything else — an
/// unknown word, "N/A", garbage — scores 0.
pub fn lookup(raw: &str) -> i64 {
    let token = normalize(raw);
    for (word, points) in WORD_POINTS {
        if *word == token {
            return *points;
        }
    }
    token.parse::<i64>().map(|n| n.max(0)).unwrap_or(0)
}

/// All vocabulary words, longest first, so phrase entries win over their
/// single-word prefixes during text scanning.
pub fn words_longest_first() -> Vec<&'static str> {
    let mut words: Vec<&'static str> = WORD_POINTS.iter().map(|(w, _)| *w).collect();
    words.sort_by_key(|w| std::cmp::Reverse(w.len()));
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_vocabulary_word_resolves() {
        for (word, points) in WORD_POINTS {
            assert_eq!(lookup(word), *points, "word {word:?}");
        }
    }

    #[test]
    fn test_lookup_is_case_and_whitespace_insensitive() {
        assert_eq!(lookup("  Strong "), 3);
        assert_eq!(lookup("EXCEPTIONAL"), 5);
        assert_eq!(lookup("Single  Instance"), 2);
    }

    #[test]
    fn test_unknown_token_scores_zero() {
        assert_eq!(lookup("mediocre"), 0);
        assert_eq!(lookup("N/A"), 0);
        assert_eq!(lookup(""), 0);
    }

    #[test]
    fn test_numeric_token_scores_its_value() {
        assert_eq!(lookup("3"), 3);
        assert_eq!(lookup(" 5 "), 5);
    }

    #[test]
    fn test_negative_numeric_token_clamps_to_zero() {
        assert_eq!(lookup("-2"), 0);
    }

    #[test]
    fn test_phrase_sorted_before_prefix() {
        let words = words_longest_first();
        let phrase = words.iter().position(|w| *w == "single instance").unwrap();
        let sound = words.iter().position(|w| *w == "sound").unwrap();
        assert!(phrase < sound);
    }
}
