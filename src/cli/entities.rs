//! CLI entry-point for named-entity extraction and counting.

use anyhow::Result;
use clap::Args as ClapArgs;
use ndarray::Array2;
use tracing::{info, instrument};

use crate::annotate;
use crate::config::Settings;
use crate::error::TextmillError;
use crate::features::entities::EntityFilter;
use crate::features::pipeline::{Pipeline, PipelineOptions};
use crate::model::summary::{human_frame, matrix_frame};
use crate::report;

use super::{count_totals, parse_comma_list, CorpusArgs};

/// Entity types dropped when neither an allow nor a deny list is given.
const DEFAULT_IGNORE_TYPES: &str = "DATE,TIME,PERCENT,MONEY,QUANTITY,ORDINAL,CARDINAL";

/// Args for the `entities` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Minimum corpus-wide occurrences for an entity to be counted.
    #[arg(short = 'm', long, default_value_t = 1)]
    pub min_tf: usize,

    /// Entity types to keep, comma-separated. Mutually exclusive with
    /// `--ignore-types`.
    #[arg(long)]
    pub use_types: Option<String>,

    /// Entity types to drop, comma-separated.
    #[arg(long)]
    pub ignore_types: Option<String>,

    /// Emit the long-format layout meant for reading, not re-parsing.
    #[arg(long)]
    pub human_readable: bool,
}

#[instrument(skip(args, settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let allow = args.use_types.as_deref().map(parse_comma_list);
    let deny = args.ignore_types.as_deref().map(parse_comma_list);
    let entity_filter = match EntityFilter::from_options(allow, deny)? {
        EntityFilter::All => EntityFilter::Deny(parse_comma_list(DEFAULT_IGNORE_TYPES)),
        filter => filter,
    };

    let corpus = args.corpus.read()?;
    let annotator = annotate::load();
    let options = PipelineOptions {
        enable: Some(vec!["entlist".to_string()]),
        entity_filter,
        ..Default::default()
    };
    let mut pipeline = Pipeline::new(&options)?;
    let bags = pipeline.run(annotator.as_ref(), corpus.texts.iter())?;
    let per_doc: Vec<_> = bags
        .into_iter()
        .map(|bag| bag.entcts.unwrap_or_default())
        .collect();

    let totals = count_totals(&per_doc);
    let kept: Vec<String> = totals
        .into_iter()
        .filter(|(_, count)| *count >= args.min_tf.max(1))
        .map(|(name, _)| name)
        .collect();
    if kept.is_empty() {
        return Err(TextmillError::InvalidConfig(
            "no entities reached the minimum frequency threshold".to_string(),
        )
        .into());
    }
    info!(entities = kept.len(), min_tf = args.min_tf, "kept entities to count");

    let mut matrix = Array2::zeros((per_doc.len(), kept.len()));
    for (i, counts) in per_doc.iter().enumerate() {
        for (j, name) in kept.iter().enumerate() {
            matrix[[i, j]] = counts.get(name).copied().unwrap_or(0) as f64;
        }
    }

    let sheet = if args.human_readable {
        (
            "humanents".to_string(),
            human_frame("document", "entity", &corpus.names, &kept, &matrix)?,
        )
    } else {
        (
            "ents".to_string(),
            matrix_frame("document", &corpus.names, &kept, &matrix)?,
        )
    };

    let out = args.corpus.resolve_out(&settings);
    report::write_report(&out, vec![sheet])?;
    Ok(())
}
