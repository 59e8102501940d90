//! Document annotation contract consumed by the feature extractors.
//!
//! The extractors only depend on the token shape defined here: surface
//! text, lowercase form, part-of-speech category, dependency role, a head
//! index, a whitespace-after flag, and entity-span membership. The
//! built-in [`english`] annotator produces this contract with rule-based
//! heuristics; a model-backed parser can be swapped in behind the same
//! [`Annotator`] trait.

pub mod english;

use std::sync::Arc;

/// Coarse part-of-speech categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pos {
    Noun,
    ProperNoun,
    Verb,
    Adposition,
    Determiner,
    Adjective,
    Adverb,
    Pronoun,
    Conjunction,
    Particle,
    Number,
    Punct,
    Other,
}

impl Pos {
    /// Nouns and proper nouns head noun phrases.
    pub fn is_nominal(self) -> bool {
        matches!(self, Pos::Noun | Pos::ProperNoun)
    }
}

/// Dependency roles assigned by the annotator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dep {
    Root,
    /// Nominal subject of a verb.
    Nsubj,
    /// Object of an adposition.
    Pobj,
    /// Direct object.
    Dobj,
    /// Non-final token inside a noun run.
    Compound,
    Det,
    Amod,
    Advmod,
    Aux,
    Punct,
    /// Unclassified attachment.
    Dep,
}

/// A single annotated token. Head is an index into the owning document's
/// token vector; the root points at itself.
#[derive(Debug, Clone)]
pub struct Token {
    pub text: String,
    pub lower: String,
    pub pos: Pos,
    pub dep: Dep,
    pub head: usize,
    /// Whether whitespace followed this token in the source text.
    pub whitespace: bool,
    /// Index into [`Doc::entities`] when the token is inside an entity span.
    pub ent: Option<usize>,
}

/// A contiguous entity span over token indices (`start..end`).
#[derive(Debug, Clone)]
pub struct EntitySpan {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl EntitySpan {
    /// Index of the span's final token, which carries the span's
    /// attachment to the rest of the parse.
    pub fn head_token(&self) -> usize {
        self.end - 1
    }
}

/// An annotated document: tokens plus derived span structure.
#[derive(Debug, Clone, Default)]
pub struct Doc {
    pub tokens: Vec<Token>,
    /// Sentence boundaries as `start..end` token ranges.
    pub sentences: Vec<(usize, usize)>,
    pub entities: Vec<EntitySpan>,
    /// Noun-chunk boundaries as `start..end` token ranges.
    pub chunks: Vec<(usize, usize)>,
}

impl Doc {
    /// Token indices whose head chain reaches `idx`, in document order.
    /// `idx` itself is included.
    pub fn subtree(&self, idx: usize) -> Vec<usize> {
        let n = self.tokens.len();
        (0..n)
            .filter(|&j| {
                let mut cur = j;
                for _ in 0..n {
                    if cur == idx {
                        return true;
                    }
                    let head = self.tokens[cur].head;
                    if head == cur {
                        return false;
                    }
                    cur = head;
                }
                false
            })
            .collect()
    }

    /// Surface text of a token range, preserving original spacing and
    /// dropping the trailing space of the final token.
    pub fn span_text(&self, start: usize, end: usize) -> String {
        let mut out = String::new();
        for (i, tok) in self.tokens[start..end].iter().enumerate() {
            out.push_str(&tok.text);
            if tok.whitespace && start + i + 1 < end {
                out.push(' ');
            }
        }
        out
    }
}

/// A document annotator shared across pipeline runs.
///
/// `attach`/`detach` track named processing components registered on the
/// shared instance, so a pipeline can install itself for the duration of
/// one corpus pass and leave the annotator unchanged afterwards.
pub trait Annotator: Send + Sync {
    fn annotate(&self, text: &str) -> Doc;

    /// Register a named component. Returns `false` if it was already
    /// present (the caller then must not detach it).
    fn attach(&self, component: &str) -> bool;

    /// Remove a previously registered component.
    fn detach(&self, component: &str);

    fn has_component(&self, component: &str) -> bool;
}

/// Load the built-in rule-based English annotator.
pub fn load() -> Arc<dyn Annotator> {
    Arc::new(english::EnglishAnnotator::new()) as Arc<dyn Annotator>
}
