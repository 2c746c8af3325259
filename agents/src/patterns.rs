//! Conservative regex fallbacks shared by the Card Agent (name extraction)
//! and the Judge (grounding token extraction) (spec §4.5, §4.10).

use regex::Regex;
use std::sync::OnceLock;

fn title_case_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b[A-Z][A-Za-z']*(?:,?\s+(?:of|the|[A-Z][A-Za-z']*))+\b").unwrap()
    })
}

fn rule_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\d+\.\d+[a-z]?\b").unwrap())
}

/// Sentence-leading words that are capitalized by English grammar rather
/// than by being part of a proper noun; stripped off the front of a match
/// before it's treated as a card-name candidate.
const SENTENCE_LEADERS: &[&str] = &[
    "does", "is", "are", "can", "what", "when", "where", "who", "how", "why", "was", "will", "if",
];

/// Candidate card-like tokens: runs of title-cased words, e.g. "Lightning
/// Bolt" or "Urza, Lord High Artificer". Conservative by design — it favors
/// missing a real name over inventing one that was never there (spec §4.5).
pub fn title_cased_candidates(text: &str) -> Vec<String> {
    title_case_pattern()
        .find_iter(text)
        .filter_map(|m| strip_sentence_leaders(m.as_str().trim_end_matches(',')))
        .collect()
}

fn strip_sentence_leaders(candidate: &str) -> Option<String> {
    let mut words: Vec<&str> = candidate.split_whitespace().collect();
    while words
        .first()
        .is_some_and(|w| SENTENCE_LEADERS.contains(&w.to_ascii_lowercase().as_str()))
    {
        words.remove(0);
    }
    if words.len() < 2 {
        return None;
    }
    Some(words.join(" "))
}

/// Candidate dotted-numeric rule ids, e.g. "601.2a" (spec §4.10).
pub fn rule_id_candidates(text: &str) -> Vec<String> {
    rule_id_pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Formats recognized when inferring a cache key or deck format from free
/// text (spec §4.7: "the inferred format token, if present").
const KNOWN_FORMATS: &[&str] =
    &["standard", "modern", "pioneer", "legacy", "vintage", "pauper", "commander", "edh", "brawl"];

pub fn infer_format(text: &str) -> Option<&'static str> {
    let lower = text.to_ascii_lowercase();
    KNOWN_FORMATS.iter().copied().find(|format| lower.contains(format))
}
