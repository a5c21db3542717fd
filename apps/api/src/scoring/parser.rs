//! Fallback free-text reply parser.
//!
//! The automated rater is asked for a structured JSON payload (see
//! `evaluation::prompts`), but free-text drift is a fact of life with LLM
//! output. When the payload does not deserialize, this module scrapes
//! per-category ratings out of the raw reply with line-scanning heuristics.
//!
//! Policy decisions, fixed here rather than left ambiguous:
//! - First match wins per category; repeated mentions never overwrite.
//! - A line mentioning several category labels is split into segments, one
//!   per label; a line with labels but no inline rating parks the scan
//!   cursor on the *first* label of that line.
//! - A category that never appears stays unrated ("N/A") — parsing is total
//!   and never fails.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::scoring::categories::{Category, MODEL_CATEGORIES};
use crate::scoring::vocabulary;

/// Raw value recorded for categories the reply never rated.
pub const UNRATED: &str = "N/A";

/// Regex alternation over the vocabulary words plus the explicit unrated
/// marker, longest first so "single instance" wins over any prefix.
fn token_alternation() -> String {
    let mut words = vocabulary::words_longest_first();
    words.push("n/a");
    words.join("|")
}

fn delimited_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // rating after a `:` / `=` / `-` delimiter; numeric ratings only
        // count here, never bare
        Regex::new(&format!(r"[:=-]\s*[*_\s]*({}|\d+)\b", token_alternation()))
            .expect("delimited token regex")
    })
}

fn word_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"\b({})\b", token_alternation())).expect("word token regex")
    })
}

fn total_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\btotal\b[^0-9-]*(-?\d+)").expect("total regex"))
}

/// Per-category raw ratings scraped from a free-text reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    ratings: HashMap<&'static str, String>,
    /// Total the rater reported itself, if any — kept for cross-checking
    /// against the per-category re-summation, never trusted blindly.
    pub reported_total: Option<i64>,
}

impl ParsedReply {
    /// Raw rating for a canonical category name; `"N/A"` when unrated.
    pub fn rating(&self, category: &str) -> &str {
        self.ratings
            .get(category)
            .map(String::as_str)
            .unwrap_or(UNRATED)
    }

    /// Canonical-name → raw-token map covering every automated category,
    /// with `"N/A"` filled in for the unrated ones.
    pub fn to_map(&self) -> HashMap<String, String> {
        MODEL_CATEGORIES
            .iter()
            .map(|c| (c.name.to_string(), self.rating(c.name).to_string()))
            .collect()
    }

    /// Categories the reply never rated, in column order.
    pub fn missing(&self) -> Vec<&'static str> {
        MODEL_CATEGORIES
            .iter()
            .filter(|c| !self.ratings.contains_key(c.name))
            .map(|c| c.name)
            .collect()
    }
}

/// Scans a free-text rater reply for one rating per automated category.
///
/// Deterministic and idempotent: the same text always yields the same map.
pub fn parse_reply(text: &str) -> ParsedReply {
    let mut ratings: HashMap<&'static str, String> = HashMap::new();
    let mut reported_total: Option<i64> = None;
    let mut cursor: Option<&'static Category> = None;

    for line in text.lines() {
        let lower = line.to_lowercase();

        if reported_total.is_none() {
            if let Some(caps) = total_re().captures(&lower) {
                reported_total = caps[1].parse().ok();
            }
        }

        let labels = label_matches(&lower);
        if labels.is_empty() {
            // no label on this line — a parked cursor may claim a rating here
            if let Some(cat) = cursor {
                if let Some(token) = find_rating_token(&lower) {
                    ratings.entry(cat.name).or_insert(token);
                    cursor = None;
                }
            }
            continue;
        }

        cursor = None;
        let mut assigned_inline = false;
        for (i, (_, end, cat)) in labels.iter().enumerate() {
            let seg_end = labels.get(i + 1).map(|(s, _, _)| *s).unwrap_or(lower.len());
            let segment = &lower[*end..seg_end.max(*end)];
            if let Some(token) = find_rating_token(segment) {
                ratings.entry(cat.name).or_insert(token);
                assigned_inline = true;
            }
        }
        if !assigned_inline {
            cursor = Some(labels[0].2);
        }
    }

    ParsedReply {
        ratings,
        reported_total,
    }
}

/// Earliest occurrence of each category's labels on the line, sorted by
/// position. At most one entry per category; the longest label matching at
/// the earliest position wins so "Industry Experience" is consumed whole
/// rather than stopping at the "Industry" alias.
fn label_matches(lower: &str) -> Vec<(usize, usize, &'static Category)> {
    let mut found: Vec<(usize, usize, &'static Category)> = Vec::new();
    for cat in MODEL_CATEGORIES {
        let mut best: Option<(usize, usize)> = None;
        for label in cat.labels() {
            let needle = label.to_lowercase();
            if let Some(start) = find_word(lower, &needle) {
                let candidate = (start, start + needle.len());
                best = Some(match best {
                    None => candidate,
                    Some(b) if candidate.0 < b.0 || (candidate.0 == b.0 && candidate.1 > b.1) => {
                        candidate
                    }
                    Some(b) => b,
                });
            }
        }
        if let Some((start, end)) = best {
            found.push((start, end, cat));
        }
    }
    found.sort_by_key(|(start, end, _)| (*start, std::cmp::Reverse(*end)));
    found
}

/// Substring search with word boundaries on both sides, so the "Range"
/// alias does not fire inside "arrangement".
fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    let bytes = haystack.as_bytes();
    let mut from = 0;
    while let Some(rel) = haystack[from..].find(needle) {
        let start = from + rel;
        let end = start + needle.len();
        let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
        let after_ok = end >= bytes.len() || !bytes[end].is_ascii_alphanumeric();
        if before_ok && after_ok {
            return Some(start);
        }
        from = start + 1;
    }
    None
}

/// First rating token in a (lowercased) text segment: a delimited word or
/// number first, then a bare vocabulary word.
fn find_rating_token(segment: &str) -> Option<String> {
    if let Some(caps) = delimited_token_re().captures(segment) {
        return Some(caps[1].to_string());
    }
    word_token_re()
        .find(segment)
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_category_per_line() {
        let reply = "Education: Strong\nIndustry Experience: Moderate\n";
        let parsed = parse_reply(reply);
        assert_eq!(parsed.rating("Education"), "strong");
        assert_eq!(parsed.rating("Industry Experience"), "moderate");
    }

    #[test]
    fn test_missing_categories_default_to_unrated() {
        let parsed = parse_reply("Education: Strong\n");
        assert_eq!(parsed.rating("Range of Experience"), UNRATED);
        assert_eq!(parsed.missing().len(), 5);
        assert_eq!(parsed.to_map().len(), 6);
    }

    #[test]
    fn test_recap_line_with_all_six_pairs() {
        let reply = "**Ratings Recap**: Education = strong, Industry = moderate, \
                     Range = sound, Benchmark = low, Length = strong, Within = exceptional";
        let parsed = parse_reply(reply);
        assert_eq!(parsed.rating("Education"), "strong");
        assert_eq!(parsed.rating("Industry Experience"), "moderate");
        assert_eq!(parsed.rating("Range of Experience"), "sound");
        assert_eq!(parsed.rating("Benchmark of Career Exposure"), "low");
        assert_eq!(parsed.rating("Average Length of Stay at Firms"), "strong");
        assert_eq!(parsed.rating("Within Firm Alignment"), "exceptional");
        assert!(parsed.missing().is_empty());
    }

    #[test]
    fn test_cursor_carries_to_following_line() {
        let reply = "1. Education\nThe academic record here is strong overall.\n";
        let parsed = parse_reply(reply);
        assert_eq!(parsed.rating("Education"), "strong");
    }

    #[test]
    fn test_first_match_wins_per_category() {
        let reply = "Education: Strong\nEducation: Low\n";
        let parsed = parse_reply(reply);
        assert_eq!(parsed.rating("Education"), "strong");
    }

    #[test]
    fn test_two_labels_no_inline_rating_parks_cursor_on_first() {
        let reply = "Education and Industry Experience\nsound\n";
        let parsed = parse_reply(reply);
        assert_eq!(parsed.rating("Education"), "sound");
        assert_eq!(parsed.rating("Industry Experience"), UNRATED);
    }

    #[test]
    fn test_numeric_rating_needs_delimiter() {
        let parsed = parse_reply("Education: 3\n");
        assert_eq!(parsed.rating("Education"), "3");

        // a bare number in prose must not be scraped as a rating
        let parsed = parse_reply("1. Education\nOver 10 years at two universities.\n");
        assert_eq!(parsed.rating("Education"), UNRATED);
    }

    #[test]
    fn test_reported_total_extracted() {
        let parsed = parse_reply("Education: Strong\nTotal score = 14\n");
        assert_eq!(parsed.reported_total, Some(14));
    }

    #[test]
    fn test_first_reported_total_wins() {
        let parsed = parse_reply("Total: 14\nTotal: 99\n");
        assert_eq!(parsed.reported_total, Some(14));
    }

    #[test]
    fn test_no_reported_total() {
        assert_eq!(parse_reply("Education: Strong\n").reported_total, None);
    }

    #[test]
    fn test_multi_word_rating_token() {
        let parsed = parse_reply("Within Firm Alignment: Single Instance\n");
        assert_eq!(parsed.rating("Within Firm Alignment"), "single instance");
    }

    #[test]
    fn test_alias_does_not_fire_inside_words() {
        // "arrangement" contains "range"; must not rate Range of Experience
        let parsed = parse_reply("The seating arrangement was: strong\n");
        assert_eq!(parsed.rating("Range of Experience"), UNRATED);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let reply = "Education: Strong\nIndustry: moderate\nTotal: 4\n";
        assert_eq!(parse_reply(reply), parse_reply(reply));
    }

    #[test]
    fn test_unrated_reply_never_errors() {
        let parsed = parse_reply("I am sorry, I cannot rate this document.");
        assert_eq!(parsed.missing().len(), 6);
        assert_eq!(parsed.reported_total, None);
    }
}
