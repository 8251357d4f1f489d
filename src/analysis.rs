//! Text analysis applied to every scraped result.
//!
//! Both functions are pure: they depend only on their arguments and are run
//! against the combined `title + " " + description` text of a record.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Amount patterns, tried in order. The first hit wins.
static MONEY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // $12,345.67 or $12345 or $12.50
        r"\$\d+(,\d{3})*(\.\d{2})?",
        // 12,345.67 or 12345.67
        r"\b\d+(,\d{3})*\.\d{2}\b",
        // 12 dollars
        r"(?i)\b\d+ dollars\b",
        // 12 USD
        r"(?i)\b\d+ USD\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("money pattern is a valid regex"))
    .collect()
});

/// Count case-insensitive, non-overlapping occurrences of every phrase in `text`.
///
/// Phrases are matched literally, never as regular expressions, and the
/// per-phrase counts are summed, so text matching two different phrases is
/// counted once for each. Empty phrases are ignored.
///
/// # Examples
///
/// ```ignore
/// let phrases = vec!["rocket".to_string()];
/// assert_eq!(count_phrase_occurrences("Rocket launch, rocket landing", &phrases), 2);
/// ```
pub fn count_phrase_occurrences(text: &str, phrases: &[String]) -> usize {
    if text.is_empty() {
        return 0;
    }

    phrases
        .iter()
        .filter(|phrase| !phrase.is_empty())
        .map(|phrase| {
            match RegexBuilder::new(&regex::escape(phrase))
                .case_insensitive(true)
                .build()
            {
                Ok(re) => re.find_iter(text).count(),
                Err(e) => {
                    warn!(%phrase, error = %e, "Could not build phrase matcher; counting zero");
                    0
                }
            }
        })
        .sum()
}

/// Whether `text` mentions an amount of money.
///
/// Recognized shapes are a `$`-prefixed amount with optional thousands
/// separators and cents, a bare amount with exactly two decimals, and an
/// integer followed by `dollars` or `USD` (unit words in any case).
pub fn contains_monetary_amount(text: &str) -> bool {
    MONEY_PATTERNS.iter().any(|re| re.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrases(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_phrases_counts_zero() {
        assert_eq!(count_phrase_occurrences("space rocket NASA", &[]), 0);
    }

    #[test]
    fn test_empty_text_counts_zero() {
        assert_eq!(count_phrase_occurrences("", &phrases(&["space", "rocket"])), 0);
    }

    #[test]
    fn test_count_is_case_insensitive() {
        assert_eq!(count_phrase_occurrences("Rocket", &phrases(&["rocket"])), 1);
        assert_eq!(count_phrase_occurrences("nasa and NASA", &phrases(&["Nasa"])), 2);
    }

    #[test]
    fn test_counts_sum_across_phrases() {
        let text = "Space agency NASA launches a rocket into space";
        assert_eq!(
            count_phrase_occurrences(text, &phrases(&["space", "rocket", "NASA"])),
            4
        );
    }

    #[test]
    fn test_overlapping_phrases_counted_independently() {
        let text = "spacecraft";
        assert_eq!(count_phrase_occurrences(text, &phrases(&["space", "spacecraft"])), 2);
    }

    #[test]
    fn test_matches_do_not_overlap_within_a_phrase() {
        assert_eq!(count_phrase_occurrences("aaaa", &phrases(&["aa"])), 2);
    }

    #[test]
    fn test_phrases_are_literal_not_regex() {
        assert_eq!(count_phrase_occurrences("costs $5 (approx.)", &phrases(&["(approx.)"])), 1);
        assert_eq!(count_phrase_occurrences("abc", &phrases(&["a.c"])), 0);
        assert_eq!(count_phrase_occurrences("a+b", &phrases(&["a+b"])), 1);
    }

    #[test]
    fn test_empty_phrase_is_ignored() {
        assert_eq!(count_phrase_occurrences("space", &phrases(&["", "space"])), 1);
    }

    #[test]
    fn test_money_examples() {
        assert!(contains_monetary_amount("$1,200.50"));
        assert!(contains_monetary_amount("1200.50"));
        assert!(contains_monetary_amount("12 dollars"));
        assert!(contains_monetary_amount("12 USD"));
        assert!(!contains_monetary_amount("no money here"));
    }

    #[test]
    fn test_money_in_sentence() {
        assert!(contains_monetary_amount("NASA awards $2 billion contract"));
        assert!(contains_monetary_amount("The mission cost 500 Dollars per kilo"));
        assert!(contains_monetary_amount("priced at 40 usd"));
    }

    #[test]
    fn test_plain_numbers_are_not_money() {
        assert!(!contains_monetary_amount("3 rockets launched in 2024"));
        assert!(!contains_monetary_amount("version 1.2.3"));
        assert!(!contains_monetary_amount("12dollars"));
    }

    #[test]
    fn test_money_detection_is_deterministic() {
        let text = "A $3.50 ticket to space";
        let first = contains_monetary_amount(text);
        for _ in 0..10 {
            assert_eq!(contains_monetary_amount(text), first);
        }
    }
}
