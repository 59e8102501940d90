//! CLI entry-point for GloVe embedding training.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::algorithms::glove::glove;
use crate::annotate;
use crate::config::Settings;
use crate::error::TextmillError;
use crate::features::pipeline::{Pipeline, PipelineOptions};
use crate::report;

use super::CorpusArgs;

/// Args for the `glove` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Number of embedding dimensions.
    #[arg(short = 'd', long)]
    pub dimensions: usize,

    /// Random seed for vector initialization.
    #[arg(short = 's', long, default_value_t = 0)]
    pub seed: u64,

    /// Minimum corpus-wide term frequency for the vocabulary.
    #[arg(short = 'm', long)]
    pub min_tf: Option<usize>,

    /// Skip the (possibly huge) dimension-word matrix sheet.
    #[arg(long)]
    pub no_save_basis: bool,

    /// Emit the long-format layout for the doc-dimension sheet.
    #[arg(long)]
    pub human_readable: bool,
}

#[instrument(skip(args, settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let corpus = args.corpus.read()?;
    let annotator = annotate::load();
    let options = PipelineOptions {
        enable: Some(vec!["sentlist".to_string()]),
        ..Default::default()
    };
    let mut pipeline = Pipeline::new(&options)?;
    let bags = pipeline.run(annotator.as_ref(), corpus.texts.iter())?;

    let mut docsents = Vec::new();
    let mut kept_names = Vec::new();
    for (bag, name) in bags.into_iter().zip(&corpus.names) {
        let sents = bag.sentlist.unwrap_or_default();
        if !sents.is_empty() {
            docsents.push(sents);
            kept_names.push(name.clone());
        }
    }
    if args.dimensions == 0 || args.dimensions >= docsents.len() {
        return Err(TextmillError::InvalidConfig(format!(
            "embedding dimensions must be positive and smaller than the corpus ({} documents)",
            docsents.len()
        ))
        .into());
    }

    let min_tf = args.min_tf.unwrap_or(settings.default_min_tf);
    info!(
        documents = docsents.len(),
        dimensions = args.dimensions,
        "training embeddings"
    );
    let mut model = glove(&docsents, args.dimensions, min_tf, args.seed)?;
    model.set_doc_names(kept_names)?;

    let sheets = model.report_sheets(
        "dimension",
        !args.no_save_basis,
        args.human_readable,
        Some(10),
    )?;
    let out = args.corpus.resolve_out(&settings);
    report::write_report(&out, sheets)?;
    Ok(())
}
