//! Token-level extractors: word lists, sentence lists, prepositional
//! phrases, noun-verb relations, and noun phrases.

use crate::annotate::{Dep, Doc, Pos};
use crate::error::Result;

use super::{count_occurrences, Extractor, FeatureBag, FeatureName, RelationPair, RunContext};

/// Index of the verb governing a nominal subject, if any.
pub(crate) fn governing_verb(doc: &Doc, idx: usize) -> Option<usize> {
    let tok = &doc.tokens[idx];
    if tok.dep == Dep::Nsubj && doc.tokens[tok.head].pos == Pos::Verb {
        Some(tok.head)
    } else {
        None
    }
}

/// Lowercased alphabetic tokens in document order, duplicates retained.
/// Clitic stems such as `'s` are kept; other punctuation-bearing tokens
/// are dropped.
pub struct WordListExtractor;

fn use_token(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        None => false,
        Some('\'') => {
            let rest = chars.as_str();
            !rest.is_empty() && rest.chars().all(char::is_alphabetic)
        }
        Some(first) => first.is_alphabetic() && text.chars().all(char::is_alphabetic),
    }
}

impl Extractor for WordListExtractor {
    fn name(&self) -> FeatureName {
        FeatureName::WordList
    }

    fn process(&self, doc: &Doc, _ctx: &mut RunContext, bag: &mut FeatureBag) -> Result<()> {
        let words = doc
            .tokens
            .iter()
            .filter(|t| use_token(&t.text))
            .map(|t| t.lower.clone())
            .collect();
        bag.wordlist = Some(words);
        Ok(())
    }
}

/// Sentences as sequences of their constituent token texts.
pub struct SentListExtractor;

impl Extractor for SentListExtractor {
    fn name(&self) -> FeatureName {
        FeatureName::SentList
    }

    fn process(&self, doc: &Doc, _ctx: &mut RunContext, bag: &mut FeatureBag) -> Result<()> {
        let sents = doc
            .sentences
            .iter()
            .map(|&(start, end)| {
                doc.tokens[start..end]
                    .iter()
                    .map(|t| t.text.clone())
                    .collect()
            })
            .collect();
        bag.sentlist = Some(sents);
        Ok(())
    }
}

/// Prepositional phrases, one per adposition token, reconstructed as the
/// surface text of the adposition's syntactic subtree. Every token keeps
/// its trailing whitespace, so the original spacing survives.
pub struct PrepPhraseExtractor;

impl Extractor for PrepPhraseExtractor {
    fn name(&self) -> FeatureName {
        FeatureName::PrepPhrases
    }

    fn process(&self, doc: &Doc, _ctx: &mut RunContext, bag: &mut FeatureBag) -> Result<()> {
        let mut phrases = Vec::new();
        for idx in 0..doc.tokens.len() {
            if doc.tokens[idx].pos != Pos::Adposition {
                continue;
            }
            let phrase: String = doc
                .subtree(idx)
                .into_iter()
                .map(|j| {
                    let tok = &doc.tokens[j];
                    if tok.whitespace {
                        format!("{} ", tok.text)
                    } else {
                        tok.text.clone()
                    }
                })
                .collect();
            phrases.push(phrase);
        }
        bag.prepphrasecounts = Some(count_occurrences(&phrases));
        bag.prepphrases = Some(phrases);
        Ok(())
    }
}

/// (noun, verb) pairs for every noun or proper noun standing as the
/// nominal subject of a verb.
pub struct NounVerbExtractor;

impl Extractor for NounVerbExtractor {
    fn name(&self) -> FeatureName {
        FeatureName::NounVerbs
    }

    fn process(&self, doc: &Doc, _ctx: &mut RunContext, bag: &mut FeatureBag) -> Result<()> {
        let mut pairs = Vec::new();
        for idx in 0..doc.tokens.len() {
            if !doc.tokens[idx].pos.is_nominal() {
                continue;
            }
            if let Some(verb) = governing_verb(doc, idx) {
                pairs.push(RelationPair {
                    subject: doc.tokens[idx].text.clone(),
                    verb: doc.tokens[verb].text.clone(),
                });
            }
        }
        bag.nounverbcounts = Some(count_occurrences(&pairs));
        bag.nounverbs = Some(pairs);
        Ok(())
    }
}

/// Contiguous noun-phrase spans, as surface strings.
pub struct NounPhraseExtractor;

impl Extractor for NounPhraseExtractor {
    fn name(&self) -> FeatureName {
        FeatureName::NounPhrases
    }

    fn process(&self, doc: &Doc, _ctx: &mut RunContext, bag: &mut FeatureBag) -> Result<()> {
        let phrases = doc
            .chunks
            .iter()
            .map(|&(start, end)| doc.span_text(start, end))
            .collect();
        bag.nounphrases = Some(phrases);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wordlist_keeps_clitic_stems() {
        assert!(use_token("hello"));
        assert!(use_token("'s"));
        assert!(use_token("'re"));
        assert!(!use_token("n't"));
        assert!(!use_token("U.S."));
        assert!(!use_token("3.4"));
        assert!(!use_token("."));
        assert!(!use_token("'"));
    }
}
