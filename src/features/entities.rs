//! Entity extraction with corpus-wide canonicalization.
//!
//! Surface forms that normalize to the same base text ("US", "U.S.",
//! "u.s") collapse into one canonical entity. The canonical display name
//! is whichever variant the corpus produced first; that ordering is part
//! of the contract, so reruns over the same corpus reproduce the same
//! names. Multi-word entities additionally register their initialism as
//! an alias key, which lets "U.S." find "United States".

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::annotate::Doc;
use crate::error::{Result, TextmillError};

use super::{count_occurrences, Extractor, FeatureBag, FeatureName, RelationPair, RunContext};
use super::extractors::governing_verb;

/// Base-text key -> surface variants in first-seen order. Scoped to one
/// pipeline run.
#[derive(Debug, Default)]
pub struct EntityCanonicalizer {
    entries: IndexMap<String, Vec<String>>,
    aliases: HashMap<String, String>,
}

impl EntityCanonicalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalized canonicalization key: uppercase, punctuation stripped,
    /// whitespace removed.
    pub fn base_text(surface: &str) -> String {
        surface
            .chars()
            .filter(|c| !c.is_ascii_punctuation() && !c.is_whitespace())
            .collect::<String>()
            .to_uppercase()
    }

    /// First letters of a multi-word surface, uppercased. `None` for
    /// single-word surfaces.
    fn initialism(surface: &str) -> Option<String> {
        let words: Vec<&str> = surface.split_whitespace().collect();
        if words.len() < 2 {
            return None;
        }
        let initials: String = words
            .iter()
            .filter_map(|w| w.chars().find(|c| c.is_alphabetic()))
            .collect::<String>()
            .to_uppercase();
        (!initials.is_empty()).then_some(initials)
    }

    /// Resolve a surface form to its canonical display name, recording the
    /// variant on first sight.
    pub fn resolve(&mut self, surface: &str) -> String {
        let base = Self::base_text(surface);
        let primary = self.aliases.get(&base).cloned().unwrap_or_else(|| base.clone());

        if let Some(variants) = self.entries.get_mut(&primary) {
            if !variants.iter().any(|v| v == surface) {
                variants.push(surface.to_string());
            }
            if let Some(initials) = Self::initialism(surface) {
                self.aliases.entry(initials).or_insert_with(|| primary.clone());
            }
            return self.entries[&primary][0].clone();
        }

        if let Some(initials) = Self::initialism(surface) {
            // The initialism may already be known as its own entity; if so,
            // bridge this longer surface onto it.
            if self.entries.contains_key(&initials) {
                self.aliases.insert(base, initials.clone());
                let variants = self.entries.get_mut(&initials).expect("entry just checked");
                if !variants.iter().any(|v| v == surface) {
                    variants.push(surface.to_string());
                }
                return variants[0].clone();
            }
            self.aliases.entry(initials).or_insert_with(|| base.clone());
        }

        self.entries.insert(base, vec![surface.to_string()]);
        surface.to_string()
    }

    /// Surface variants recorded under the base key of `surface`.
    pub fn variants(&self, surface: &str) -> Option<&[String]> {
        let base = Self::base_text(surface);
        let primary = self.aliases.get(&base).map(String::as_str).unwrap_or(&base);
        self.entries.get(primary).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Entity type filtering. Allow and deny lists are mutually exclusive.
#[derive(Debug, Clone, Default)]
pub enum EntityFilter {
    #[default]
    All,
    Allow(Vec<String>),
    Deny(Vec<String>),
}

impl EntityFilter {
    /// Build a filter from optional allow/deny lists. Supplying both is a
    /// configuration error.
    pub fn from_options(
        allow: Option<Vec<String>>,
        deny: Option<Vec<String>>,
    ) -> Result<Self> {
        match (allow, deny) {
            (Some(_), Some(_)) => Err(TextmillError::ExclusiveEntityFilters),
            (Some(types), None) => Ok(Self::Allow(types)),
            (None, Some(types)) => Ok(Self::Deny(types)),
            (None, None) => Ok(Self::All),
        }
    }

    pub fn keeps(&self, label: &str) -> bool {
        match self {
            Self::All => true,
            Self::Allow(types) => types.iter().any(|t| t == label),
            Self::Deny(types) => !types.iter().any(|t| t == label),
        }
    }
}

/// Extracts entity mentions: spans merged into single logical units,
/// filtered by type, resolved through the run's canonicalization map.
pub struct EntityListExtractor {
    filter: EntityFilter,
}

impl EntityListExtractor {
    pub fn new(filter: EntityFilter) -> Self {
        Self { filter }
    }
}

impl Extractor for EntityListExtractor {
    fn name(&self) -> FeatureName {
        FeatureName::EntList
    }

    fn process(&self, doc: &Doc, ctx: &mut RunContext, bag: &mut FeatureBag) -> Result<()> {
        let mut mentions = Vec::new();
        for span in &doc.entities {
            if !self.filter.keeps(&span.label) {
                continue;
            }
            let surface = doc.span_text(span.start, span.end);
            let canonical = ctx.canon.resolve(&surface);
            mentions.push(super::EntityMention {
                canonical,
                token: span.head_token(),
            });
        }
        let names: Vec<String> = mentions.iter().map(|m| m.canonical.clone()).collect();
        bag.entcts = Some(count_occurrences(&names));
        bag.entlist = Some(mentions);
        Ok(())
    }
}

/// (entity, verb) pairs: the relation logic of `nounverbs` applied to the
/// canonical entities produced by `entlist`, which therefore must have run
/// earlier in the same pipeline invocation.
pub struct EntVerbExtractor;

impl Extractor for EntVerbExtractor {
    fn name(&self) -> FeatureName {
        FeatureName::EntVerbs
    }

    fn process(&self, doc: &Doc, _ctx: &mut RunContext, bag: &mut FeatureBag) -> Result<()> {
        let mentions = bag.entlist.as_ref().ok_or_else(|| {
            TextmillError::InvalidConfig(
                "entverbs ran without entlist output; pipeline order is broken".to_string(),
            )
        })?;
        let mut pairs = Vec::new();
        for mention in mentions {
            if let Some(verb) = governing_verb(doc, mention.token) {
                pairs.push(RelationPair {
                    subject: mention.canonical.clone(),
                    verb: doc.tokens[verb].text.clone(),
                });
            }
        }
        bag.entverbcts = Some(count_occurrences(&pairs));
        bag.entverbs = Some(pairs);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_text_collapses_punctuation_and_case() {
        assert_eq!(EntityCanonicalizer::base_text("U.S."), "US");
        assert_eq!(EntityCanonicalizer::base_text("united  states"), "UNITEDSTATES");
        assert_eq!(EntityCanonicalizer::base_text("O'Neill"), "ONEILL");
    }

    #[test]
    fn first_seen_variant_is_canonical() {
        let mut canon = EntityCanonicalizer::new();
        assert_eq!(canon.resolve("US"), "US");
        assert_eq!(canon.resolve("U.S."), "US");
        assert_eq!(canon.variants("US").unwrap(), &["US", "U.S."]);
    }

    #[test]
    fn initialism_bridges_both_directions() {
        let mut canon = EntityCanonicalizer::new();
        assert_eq!(canon.resolve("United States"), "United States");
        assert_eq!(canon.resolve("U.S."), "United States");

        let mut reversed = EntityCanonicalizer::new();
        assert_eq!(reversed.resolve("U.S."), "U.S.");
        assert_eq!(reversed.resolve("United States"), "U.S.");
    }

    #[test]
    fn filters_are_mutually_exclusive() {
        let err = EntityFilter::from_options(
            Some(vec!["GPE".to_string()]),
            Some(vec!["DATE".to_string()]),
        );
        assert!(matches!(err, Err(TextmillError::ExclusiveEntityFilters)));
    }

    #[test]
    fn deny_filter_drops_listed_types() {
        let filter = EntityFilter::from_options(None, Some(vec!["DATE".to_string()])).unwrap();
        assert!(filter.keeps("GPE"));
        assert!(!filter.keeps("DATE"));
    }
}
