//! Pipeline composition: from a requested feature set to an ordered
//! execution plan, and from a plan to one [`FeatureBag`] per document.
//!
//! Plan resolution is a pure function over a dependency table: every
//! extractor's dependencies are inserted (recursively, without
//! duplicates) before the extractor itself, and a cycle in the table is a
//! configuration error. While a corpus pass is running, the composed
//! pipeline registers itself on the shared annotator and deregisters on
//! every exit path, leaving the annotator untouched for other callers.

use tracing::{debug, info};

use crate::annotate::Annotator;
use crate::error::{Result, TextmillError};

use super::entities::{EntVerbExtractor, EntityCanonicalizer, EntityFilter, EntityListExtractor};
use super::extractors::{
    NounPhraseExtractor, NounVerbExtractor, PrepPhraseExtractor, SentListExtractor,
    WordListExtractor,
};
use super::{Extractor, FeatureBag, FeatureName, RunContext};

/// Component name registered on the shared annotator for the duration of
/// one corpus pass.
const PIPE_COMPONENT: &str = "textmill-features";

/// Which features a run should extract, plus extractor options.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Exact feature names to enable. Takes precedence over `disable`.
    pub enable: Option<Vec<String>>,
    /// Feature names to remove from the full set.
    pub disable: Option<Vec<String>>,
    /// Entity type filtering for the `entlist` extractor.
    pub entity_filter: EntityFilter,
}

impl PipelineOptions {
    /// Feature names this configuration requests, validated. Unknown
    /// names fail here, before any document is touched.
    pub fn requested(&self) -> Result<Vec<FeatureName>> {
        if let Some(enable) = &self.enable {
            return enable.iter().map(|n| FeatureName::parse(n)).collect();
        }
        let mut requested: Vec<FeatureName> = FeatureName::ALL.to_vec();
        if let Some(disable) = &self.disable {
            let parsed: Vec<FeatureName> = disable
                .iter()
                .map(|n| FeatureName::parse(n))
                .collect::<Result<_>>()?;
            requested.retain(|f| !parsed.contains(f));
        }
        Ok(requested)
    }
}

/// Resolve an execution order against an arbitrary dependency table.
/// Exposed at this granularity so the resolution logic can be exercised
/// with tables the built-in features never produce (deep chains, cycles).
pub fn resolve_with(
    requested: &[FeatureName],
    dependencies: &dyn Fn(FeatureName) -> Vec<FeatureName>,
) -> Result<Vec<FeatureName>> {
    fn insert(
        feature: FeatureName,
        dependencies: &dyn Fn(FeatureName) -> Vec<FeatureName>,
        plan: &mut Vec<FeatureName>,
        trail: &mut Vec<FeatureName>,
    ) -> Result<()> {
        if plan.contains(&feature) {
            return Ok(());
        }
        if trail.contains(&feature) {
            return Err(TextmillError::DependencyCycle(feature.as_str().to_string()));
        }
        trail.push(feature);
        for dep in dependencies(feature) {
            insert(dep, dependencies, plan, trail)?;
        }
        trail.pop();
        plan.push(feature);
        Ok(())
    }

    let mut plan = Vec::new();
    let mut trail = Vec::new();
    for &feature in requested {
        insert(feature, dependencies, &mut plan, &mut trail)?;
    }
    Ok(plan)
}

/// Resolve an execution order for the built-in dependency table.
pub fn resolve_plan(requested: &[FeatureName]) -> Result<Vec<FeatureName>> {
    resolve_with(requested, &|f| f.dependencies().to_vec())
}

/// A composed, dependency-ordered extractor pipeline with its run-scoped
/// shared state.
pub struct Pipeline {
    extractors: Vec<Box<dyn Extractor>>,
    ctx: RunContext,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field(
                "extractors",
                &self.extractors.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .field("ctx", &self.ctx)
            .finish()
    }
}

impl Pipeline {
    pub fn new(options: &PipelineOptions) -> Result<Self> {
        Self::with_canonicalizer(options, EntityCanonicalizer::new())
    }

    /// Build a pipeline around a pre-seeded canonicalization map. Lets
    /// tests inspect and control canonicalization state deterministically.
    pub fn with_canonicalizer(
        options: &PipelineOptions,
        canon: EntityCanonicalizer,
    ) -> Result<Self> {
        let plan = resolve_plan(&options.requested()?)?;
        debug!(?plan, "resolved extraction plan");
        let extractors = plan
            .into_iter()
            .map(|f| instantiate(f, options))
            .collect();
        Ok(Self {
            extractors,
            ctx: RunContext { canon },
        })
    }

    /// The resolved execution order.
    pub fn plan(&self) -> Vec<FeatureName> {
        self.extractors.iter().map(|e| e.name()).collect()
    }

    /// The canonicalization map accumulated so far in this run.
    pub fn canonicalizer(&self) -> &EntityCanonicalizer {
        &self.ctx.canon
    }

    /// Run every extractor, in plan order, over one annotated document.
    pub fn process_document(&mut self, doc: &crate::annotate::Doc) -> Result<FeatureBag> {
        let mut bag = FeatureBag::default();
        for extractor in &self.extractors {
            extractor.process(doc, &mut self.ctx, &mut bag)?;
        }
        Ok(bag)
    }

    /// Annotate and process a corpus, yielding one feature bag per input
    /// text in input order. The pipeline registers itself on the shared
    /// annotator before the first document and deregisters afterwards,
    /// including when a document fails mid-corpus.
    pub fn run<I, S>(&mut self, annotator: &dyn Annotator, texts: I) -> Result<Vec<FeatureBag>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let _guard = PipeGuard::attach(annotator, PIPE_COMPONENT);
        let mut bags = Vec::new();
        for text in texts {
            let doc = annotator.annotate(text.as_ref());
            bags.push(self.process_document(&doc)?);
        }
        info!(documents = bags.len(), "extracted feature bags");
        Ok(bags)
    }
}

/// Scoped registration on the shared annotator. Detaches on drop, but
/// only if this guard was the one that attached.
struct PipeGuard<'a> {
    annotator: &'a dyn Annotator,
    component: &'static str,
    owned: bool,
}

impl<'a> PipeGuard<'a> {
    fn attach(annotator: &'a dyn Annotator, component: &'static str) -> Self {
        let owned = annotator.attach(component);
        Self {
            annotator,
            component,
            owned,
        }
    }
}

impl Drop for PipeGuard<'_> {
    fn drop(&mut self) {
        if self.owned {
            self.annotator.detach(self.component);
        }
    }
}

fn instantiate(feature: FeatureName, options: &PipelineOptions) -> Box<dyn Extractor> {
    match feature {
        FeatureName::WordList => Box::new(WordListExtractor),
        FeatureName::SentList => Box::new(SentListExtractor),
        FeatureName::EntList => {
            Box::new(EntityListExtractor::new(options.entity_filter.clone()))
        }
        FeatureName::PrepPhrases => Box::new(PrepPhraseExtractor),
        FeatureName::NounVerbs => Box::new(NounVerbExtractor),
        FeatureName::EntVerbs => Box::new(EntVerbExtractor),
        FeatureName::NounPhrases => Box::new(NounPhraseExtractor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entverbs_plan_places_entlist_first() {
        let plan = resolve_plan(&[FeatureName::EntVerbs]).unwrap();
        let entlist = plan.iter().position(|f| *f == FeatureName::EntList).unwrap();
        let entverbs = plan.iter().position(|f| *f == FeatureName::EntVerbs).unwrap();
        assert!(entlist < entverbs);
    }

    #[test]
    fn duplicate_requests_resolve_once() {
        let plan = resolve_plan(&[
            FeatureName::EntVerbs,
            FeatureName::EntList,
            FeatureName::EntVerbs,
        ])
        .unwrap();
        assert_eq!(plan, vec![FeatureName::EntList, FeatureName::EntVerbs]);
    }

    #[test]
    fn cycles_are_a_configuration_error() {
        // wordlist -> sentlist -> wordlist, injected via a synthetic table
        let table = |f: FeatureName| match f {
            FeatureName::WordList => vec![FeatureName::SentList],
            FeatureName::SentList => vec![FeatureName::WordList],
            _ => vec![],
        };
        let err = resolve_with(&[FeatureName::WordList], &table).unwrap_err();
        assert!(matches!(err, TextmillError::DependencyCycle(_)));
    }

    #[test]
    fn deep_chains_resolve_in_order() {
        // entverbs -> nounverbs -> prepphrases, depth 2
        let table = |f: FeatureName| match f {
            FeatureName::EntVerbs => vec![FeatureName::NounVerbs],
            FeatureName::NounVerbs => vec![FeatureName::PrepPhrases],
            _ => vec![],
        };
        let plan = resolve_with(&[FeatureName::EntVerbs], &table).unwrap();
        assert_eq!(
            plan,
            vec![
                FeatureName::PrepPhrases,
                FeatureName::NounVerbs,
                FeatureName::EntVerbs
            ]
        );
    }

    #[test]
    fn unknown_feature_name_fails_before_processing() {
        let options = PipelineOptions {
            enable: Some(vec!["wordlist".to_string(), "bogus".to_string()]),
            ..Default::default()
        };
        let err = options.requested().unwrap_err();
        assert!(matches!(err, TextmillError::UnknownFeature(name) if name == "bogus"));
    }

    #[test]
    fn disable_subtracts_from_full_set() {
        let options = PipelineOptions {
            disable: Some(vec!["entverbs".to_string(), "entlist".to_string()]),
            ..Default::default()
        };
        let requested = options.requested().unwrap();
        assert!(!requested.contains(&FeatureName::EntVerbs));
        assert!(!requested.contains(&FeatureName::EntList));
        assert!(requested.contains(&FeatureName::WordList));
    }
}
