//! CLI entry-point for grammatical relation extraction.

use anyhow::Result;
use clap::Args as ClapArgs;
use indexmap::IndexMap;
use polars::prelude::{DataFrame, NamedFrom, Series};
use tracing::instrument;

use crate::annotate;
use crate::config::Settings;
use crate::features::pipeline::{Pipeline, PipelineOptions};
use crate::features::{FeatureBag, RelationPair};
use crate::report;

use super::{count_totals, CorpusArgs};

/// Args for the `grammar` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Include prepositional phrase extraction.
    #[arg(long)]
    pub prepphrases: bool,

    /// Include noun-verb relation extraction.
    #[arg(long)]
    pub nounverbs: bool,

    /// Include entity-verb relation extraction.
    #[arg(long)]
    pub entverbs: bool,
}

#[instrument(skip(args, settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    // nothing selected means everything
    let all = !(args.prepphrases || args.nounverbs || args.entverbs);
    let mut enable = Vec::new();
    if args.prepphrases || all {
        enable.push("prepphrases".to_string());
    }
    if args.nounverbs || all {
        enable.push("nounverbs".to_string());
    }
    if args.entverbs || all {
        enable.push("entverbs".to_string());
    }

    let corpus = args.corpus.read()?;
    let annotator = annotate::load();
    let options = PipelineOptions {
        enable: Some(enable.clone()),
        ..Default::default()
    };
    let mut pipeline = Pipeline::new(&options)?;
    let bags = pipeline.run(annotator.as_ref(), corpus.texts.iter())?;

    let mut sheets = Vec::new();
    if enable.iter().any(|f| f == "prepphrases") {
        let per_doc: Vec<_> = collect(&bags, |bag| bag.prepphrasecounts.clone());
        sheets.push((
            "prepphrases".to_string(),
            phrase_frame(&corpus.names, &per_doc, "phrase")?,
        ));
    }
    if enable.iter().any(|f| f == "nounverbs") {
        let per_doc: Vec<_> = collect(&bags, |bag| bag.nounverbcounts.clone());
        sheets.push((
            "nounverbs".to_string(),
            relation_frame(&corpus.names, &per_doc, "noun")?,
        ));
    }
    if enable.iter().any(|f| f == "entverbs") {
        let per_doc: Vec<_> = collect(&bags, |bag| bag.entverbcts.clone());
        sheets.push((
            "entverbs".to_string(),
            relation_frame(&corpus.names, &per_doc, "entity")?,
        ));
    }

    let out = args.corpus.resolve_out(&settings);
    report::write_report(&out, sheets)?;
    Ok(())
}

fn collect<K: Clone + Eq + std::hash::Hash>(
    bags: &[FeatureBag],
    pick: impl Fn(&FeatureBag) -> Option<IndexMap<K, usize>>,
) -> Vec<IndexMap<K, usize>> {
    bags.iter().map(|bag| pick(bag).unwrap_or_default()).collect()
}

/// Long-format counts for string-keyed features, corpus totals leading.
fn phrase_frame(
    names: &[String],
    per_doc: &[IndexMap<String, usize>],
    value_label: &str,
) -> crate::error::Result<DataFrame> {
    let mut docs = Vec::new();
    let mut values = Vec::new();
    let mut counts = Vec::new();
    for (doc, cell_counts) in totals_first(names, per_doc) {
        for (value, count) in cell_counts {
            docs.push(doc.clone());
            values.push(value);
            counts.push(count as i64);
        }
    }
    Ok(DataFrame::new(vec![
        Series::new("document".into(), docs),
        Series::new(value_label.into(), values),
        Series::new("count".into(), counts),
    ])?)
}

/// Long-format counts for relation pairs, subject and verb in their own
/// columns, corpus totals leading.
fn relation_frame(
    names: &[String],
    per_doc: &[IndexMap<RelationPair, usize>],
    subject_label: &str,
) -> crate::error::Result<DataFrame> {
    let mut docs = Vec::new();
    let mut subjects = Vec::new();
    let mut verbs = Vec::new();
    let mut counts = Vec::new();
    for (doc, cell_counts) in totals_first(names, per_doc) {
        for (pair, count) in cell_counts {
            docs.push(doc.clone());
            subjects.push(pair.subject);
            verbs.push(pair.verb);
            counts.push(count as i64);
        }
    }
    Ok(DataFrame::new(vec![
        Series::new("document".into(), docs),
        Series::new(subject_label.into(), subjects),
        Series::new("verb".into(), verbs),
        Series::new("count".into(), counts),
    ])?)
}

/// Orders report rows: corpus totals first, then documents ascending by
/// name, counts descending within each block.
fn totals_first<K: Clone + Eq + std::hash::Hash>(
    names: &[String],
    per_doc: &[IndexMap<K, usize>],
) -> Vec<(String, Vec<(K, usize)>)> {
    let sorted = |counts: &IndexMap<K, usize>| {
        let mut cells: Vec<(K, usize)> =
            counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
        cells.sort_by(|a, b| b.1.cmp(&a.1));
        cells
    };

    let mut blocks = vec![("Totals".to_string(), sorted(&count_totals(per_doc)))];
    let mut order: Vec<usize> = (0..names.len()).collect();
    order.sort_by(|&a, &b| names[a].cmp(&names[b]));
    for i in order {
        blocks.push((names[i].clone(), sorted(&per_doc[i])));
    }
    blocks
}
