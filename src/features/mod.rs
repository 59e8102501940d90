//! Per-document feature extraction.
//!
//! Each extractor reads an annotated [`Doc`](crate::annotate::Doc) and
//! writes one named feature into the document's [`FeatureBag`]. The
//! [`pipeline`] module resolves extractor dependencies into an ordered
//! execution plan and runs it over a corpus.

pub mod entities;
pub mod extractors;
pub mod pipeline;

use std::hash::Hash;

use indexmap::IndexMap;

use crate::annotate::Doc;
use crate::error::{Result, TextmillError};

/// The fixed set of requestable features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureName {
    WordList,
    SentList,
    EntList,
    PrepPhrases,
    NounVerbs,
    EntVerbs,
    NounPhrases,
}

impl FeatureName {
    pub const ALL: [FeatureName; 7] = [
        FeatureName::WordList,
        FeatureName::SentList,
        FeatureName::EntList,
        FeatureName::PrepPhrases,
        FeatureName::NounVerbs,
        FeatureName::EntVerbs,
        FeatureName::NounPhrases,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureName::WordList => "wordlist",
            FeatureName::SentList => "sentlist",
            FeatureName::EntList => "entlist",
            FeatureName::PrepPhrases => "prepphrases",
            FeatureName::NounVerbs => "nounverbs",
            FeatureName::EntVerbs => "entverbs",
            FeatureName::NounPhrases => "nounphrases",
        }
    }

    /// Parse a user-supplied feature name. Unknown names are a
    /// configuration error, raised before any processing starts.
    pub fn parse(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == name)
            .ok_or_else(|| TextmillError::UnknownFeature(name.to_string()))
    }

    /// Features that must run earlier in the same pipeline invocation.
    pub fn dependencies(self) -> &'static [FeatureName] {
        match self {
            FeatureName::EntVerbs => &[FeatureName::EntList],
            _ => &[],
        }
    }
}

impl std::fmt::Display for FeatureName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subject paired with its governing verb.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationPair {
    pub subject: String,
    pub verb: String,
}

/// An entity occurrence resolved to its canonical display name, keeping a
/// reference to the token that anchors the span in the parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMention {
    pub canonical: String,
    pub token: usize,
}

/// All features extracted from one document. Populated by whichever
/// extractors are enabled for the run; immutable once yielded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureBag {
    pub wordlist: Option<Vec<String>>,
    pub sentlist: Option<Vec<Vec<String>>>,
    pub entlist: Option<Vec<EntityMention>>,
    pub entcts: Option<IndexMap<String, usize>>,
    pub prepphrases: Option<Vec<String>>,
    pub prepphrasecounts: Option<IndexMap<String, usize>>,
    pub nounverbs: Option<Vec<RelationPair>>,
    pub nounverbcounts: Option<IndexMap<RelationPair, usize>>,
    pub entverbs: Option<Vec<RelationPair>>,
    pub entverbcts: Option<IndexMap<RelationPair, usize>>,
    pub nounphrases: Option<Vec<String>>,
}

/// Occurrence counts in first-seen order.
pub(crate) fn count_occurrences<T>(items: &[T]) -> IndexMap<T, usize>
where
    T: Eq + Hash + Clone,
{
    let mut counts = IndexMap::new();
    for item in items {
        *counts.entry(item.clone()).or_insert(0) += 1;
    }
    counts
}

/// Shared mutable state for one pipeline run. Owned by the pipeline, fresh
/// per run, injectable in tests.
#[derive(Debug, Default)]
pub struct RunContext {
    pub canon: entities::EntityCanonicalizer,
}

/// One extraction capability. Extractors are idempotent for an unchanged
/// document and may only assume their declared dependencies have run.
pub trait Extractor: Send {
    fn name(&self) -> FeatureName;
    fn process(&self, doc: &Doc, ctx: &mut RunContext, bag: &mut FeatureBag) -> Result<()>;
}
