//! CLI entry-point for topic modeling (LDA or NMF).

use anyhow::Result;
use clap::{Args as ClapArgs, ValueEnum};
use tracing::{info, instrument};

use crate::algorithms::{lda, nmf};
use crate::annotate;
use crate::config::Settings;
use crate::error::TextmillError;
use crate::features::pipeline::{Pipeline, PipelineOptions};
use crate::report;

use super::CorpusArgs;

/// Which factorization to fit.
#[derive(Clone, Debug, ValueEnum)]
pub enum ModelKind {
    /// Latent Dirichlet Allocation on raw term counts.
    Lda,
    /// Non-negative matrix factorization on tf-idf features.
    Nmf,
}

/// Args for the `topicmodel` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Number of topics.
    #[arg(short = 'n', long)]
    pub num_topics: usize,

    /// Algorithm choice.
    #[arg(short = 't', long, value_enum, default_value = "lda")]
    pub kind: ModelKind,

    /// Random seed for model initialization.
    #[arg(short = 's', long, default_value_t = 0)]
    pub seed: u64,

    /// Minimum corpus-wide term frequency for the vocabulary.
    #[arg(short = 'm', long)]
    pub min_tf: Option<usize>,

    /// Skip the (possibly huge) topic-word matrix sheet.
    #[arg(long)]
    pub no_save_basis: bool,

    /// Emit the long-format layout for the doc-topic sheet.
    #[arg(long)]
    pub human_readable: bool,
}

#[instrument(skip(args, settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let corpus = args.corpus.read()?;
    let annotator = annotate::load();
    let options = PipelineOptions {
        enable: Some(vec!["wordlist".to_string()]),
        ..Default::default()
    };
    let mut pipeline = Pipeline::new(&options)?;
    let bags = pipeline.run(annotator.as_ref(), corpus.texts.iter())?;

    // documents with no usable words cannot enter the model
    let mut bows = Vec::new();
    let mut kept_names = Vec::new();
    for (bag, name) in bags.into_iter().zip(&corpus.names) {
        let bow = bag.wordlist.unwrap_or_default();
        if !bow.is_empty() {
            bows.push(bow);
            kept_names.push(name.clone());
        }
    }
    if args.num_topics == 0 || args.num_topics >= bows.len() {
        return Err(TextmillError::InvalidConfig(format!(
            "number of topics must be positive and smaller than the corpus ({} documents)",
            bows.len()
        ))
        .into());
    }

    let min_tf = args.min_tf.unwrap_or(settings.default_min_tf);
    info!(
        documents = bows.len(),
        topics = args.num_topics,
        kind = ?args.kind,
        "fitting topic model"
    );
    let mut model = match args.kind {
        ModelKind::Lda => lda::lda(&bows, args.num_topics, min_tf, args.seed)?,
        ModelKind::Nmf => nmf::nmf(&bows, args.num_topics, min_tf, args.seed)?,
    };
    model.set_doc_names(kept_names)?;

    let sheets = model.report_sheets(
        "topic",
        !args.no_save_basis,
        args.human_readable,
        Some(10),
    )?;
    let out = args.corpus.resolve_out(&settings);
    report::write_report(&out, sheets)?;
    Ok(())
}
