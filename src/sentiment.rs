//! Lexicon-based sentiment scoring over extracted word lists.
//!
//! The built-in lexicon is intentionally small; categories are scored as
//! the number of lexicon hits in a document, optionally normalized by
//! document length.

use indexmap::IndexMap;

use crate::error::{Result, TextmillError};

const POSITIVE_EMOTION: &[&str] = &[
    "good", "great", "happy", "joy", "love", "excellent", "wonderful", "delight", "pleased",
    "glad", "hope", "hopeful", "proud", "excited", "cheerful", "success", "successful", "win",
    "beautiful", "best", "better", "enjoy", "thankful", "grateful", "amazing",
];

const NEGATIVE_EMOTION: &[&str] = &[
    "bad", "sad", "angry", "hate", "terrible", "awful", "horrible", "fear", "afraid", "worried",
    "worry", "upset", "cry", "pain", "painful", "lose", "loss", "lost", "fail", "failure",
    "worst", "worse", "miserable", "gloomy", "regret",
];

const ANGER: &[&str] = &[
    "angry", "anger", "furious", "rage", "outrage", "mad", "hostile", "irritated", "annoyed",
    "resent", "fury", "hate", "hatred",
];

const TRUST: &[&str] = &[
    "trust", "honest", "loyal", "reliable", "faith", "faithful", "sincere", "dependable",
    "confidence", "confident", "credible", "assure",
];

const SOCIAL: &[&str] = &[
    "friend", "family", "mother", "father", "brother", "sister", "team", "community", "together",
    "neighbor", "partner", "colleague", "people", "society",
];

const WORK: &[&str] = &[
    "work", "job", "office", "business", "meeting", "project", "deadline", "manager", "employee",
    "salary", "career", "hire", "company",
];

/// Category names scored by [`analyze`], in report order.
pub const CATEGORIES: &[(&str, &[&str])] = &[
    ("positive_emotion", POSITIVE_EMOTION),
    ("negative_emotion", NEGATIVE_EMOTION),
    ("anger", ANGER),
    ("trust", TRUST),
    ("social", SOCIAL),
    ("work", WORK),
];

/// Score one document's word list against the lexicon. With `normalize`,
/// counts are divided by the word-list length. `categories` restricts
/// scoring to the named subset; unknown category names fail fast.
pub fn analyze(
    wordlist: &[String],
    categories: Option<&[&str]>,
    normalize: bool,
) -> Result<IndexMap<String, f64>> {
    let selected: Vec<(&str, &[&str])> = match categories {
        None => CATEGORIES.to_vec(),
        Some(names) => names
            .iter()
            .map(|name| {
                CATEGORIES
                    .iter()
                    .find(|(cat, _)| cat == name)
                    .copied()
                    .ok_or_else(|| TextmillError::lookup("sentiment category", *name))
            })
            .collect::<Result<_>>()?,
    };

    let total = wordlist.len() as f64;
    let mut scores = IndexMap::new();
    for (category, terms) in selected {
        let hits = wordlist.iter().filter(|w| terms.contains(&w.as_str())).count() as f64;
        let score = if normalize && total > 0.0 {
            hits / total
        } else {
            hits
        };
        scores.insert(category.to_string(), score);
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn counts_lexicon_hits() {
        let scores = analyze(&words("a great and happy day at work"), None, false).unwrap();
        assert_eq!(scores["positive_emotion"], 2.0);
        assert_eq!(scores["work"], 1.0);
        assert_eq!(scores["anger"], 0.0);
    }

    #[test]
    fn normalizes_by_document_length() {
        let scores = analyze(&words("good bad good bad"), None, true).unwrap();
        assert_eq!(scores["positive_emotion"], 0.5);
        assert_eq!(scores["negative_emotion"], 0.5);
    }

    #[test]
    fn category_subset_restricts_output() {
        let scores = analyze(
            &words("good"),
            Some(&["positive_emotion", "negative_emotion"]),
            false,
        )
        .unwrap();
        assert_eq!(scores.len(), 2);
    }

    #[test]
    fn unknown_category_is_a_lookup_error() {
        let err = analyze(&words("good"), Some(&["optimism"]), false).unwrap_err();
        assert!(matches!(err, TextmillError::Lookup { .. }));
    }
}
