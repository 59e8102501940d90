//! CLI entry-point for lexicon sentiment scoring.

use anyhow::Result;
use clap::Args as ClapArgs;
use ndarray::Array2;
use polars::prelude::{DataFrame, NamedFrom, Series};
use tracing::instrument;

use crate::annotate;
use crate::config::Settings;
use crate::features::pipeline::{Pipeline, PipelineOptions};
use crate::model::summary::{human_frame, matrix_frame};
use crate::report;
use crate::sentiment;

use super::CorpusArgs;

/// Args for the `sentiment` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Score only the positive and negative emotion categories.
    #[arg(short = 'o', long)]
    pub posneg_only: bool,

    /// Report raw hit counts instead of length-normalized scores.
    #[arg(long)]
    pub no_normalize: bool,

    /// Emit the long-format layout meant for reading, not re-parsing.
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

    let categories: Option<Vec<&str>> = args
        .posneg_only
        .then(|| vec!["positive_emotion", "negative_emotion"]);

    let mut rows = Vec::new();
    for bag in bags {
        let wordlist = bag.wordlist.unwrap_or_default();
        rows.push(sentiment::analyze(
            &wordlist,
            categories.as_deref(),
            !args.no_normalize,
        )?);
    }
    let category_names: Vec<String> = rows
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default();
    let mut matrix = Array2::zeros((rows.len(), category_names.len()));
    for (i, row) in rows.iter().enumerate() {
        for (j, category) in category_names.iter().enumerate() {
            matrix[[i, j]] = row[category];
        }
    }

    let report_sheet = if args.human_readable {
        (
            "report".to_string(),
            human_frame("document", "category", &corpus.names, &category_names, &matrix)?,
        )
    } else {
        (
            "report".to_string(),
            matrix_frame("document", &corpus.names, &category_names, &matrix)?,
        )
    };
    let summary = summary_frame(&category_names, &matrix)?;

    let out = args.corpus.resolve_out(&settings);
    report::write_report(&out, vec![report_sheet, ("summary".to_string(), summary)])?;
    Ok(())
}

/// Corpus-level totals and means per category.
fn summary_frame(categories: &[String], matrix: &Array2<f64>) -> crate::error::Result<DataFrame> {
    let ndocs = matrix.nrows().max(1) as f64;
    let totals: Vec<f64> = (0..matrix.ncols()).map(|j| matrix.column(j).sum()).collect();
    let means: Vec<f64> = totals.iter().map(|t| t / ndocs).collect();
    Ok(DataFrame::new(vec![
        Series::new("category".into(), categories.to_vec()),
        Series::new("total".into(), totals),
        Series::new("mean".into(), means),
    ])?)
}
