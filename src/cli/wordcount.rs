//! CLI entry-point for per-document word counts.

use anyhow::Result;
use clap::Args as ClapArgs;
use indexmap::IndexMap;
use tracing::{info, instrument};

use crate::annotate;
use crate::config::Settings;
use crate::error::TextmillError;
use crate::features::pipeline::{Pipeline, PipelineOptions};
use crate::model::summary::{human_frame, matrix_frame};
use crate::report;

use super::{count_matrix, parse_comma_list, CorpusArgs};

/// Args for the `wordcount` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Comma-separated words to count. When absent, every word reaching
    /// the minimum corpus frequency is counted.
    #[arg(short, long)]
    pub words: Option<String>,

    /// Minimum corpus-wide frequency for a word to be counted.
    #[arg(short = 'm', long)]
    pub min_tf: Option<usize>,

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
    let bows: Vec<Vec<String>> = bags
        .into_iter()
        .map(|bag| bag.wordlist.unwrap_or_default())
        .collect();

    let terms = match &args.words {
        Some(words) => {
            let terms = parse_comma_list(words);
            if terms.is_empty() {
                return Err(TextmillError::InvalidConfig(
                    "no words provided to count".to_string(),
                )
                .into());
            }
            terms
        }
        None => {
            let min_tf = args.min_tf.unwrap_or(settings.default_min_tf).max(1);
            let mut freq: IndexMap<String, usize> = IndexMap::new();
            for bow in &bows {
                for word in bow {
                    *freq.entry(word.clone()).or_insert(0) += 1;
                }
            }
            let terms: Vec<String> = freq
                .into_iter()
                .filter(|(_, count)| *count >= min_tf)
                .map(|(word, _)| word)
                .collect();
            if terms.is_empty() {
                return Err(TextmillError::InvalidConfig(
                    "no words reached the minimum frequency threshold".to_string(),
                )
                .into());
            }
            info!(vocab = terms.len(), min_tf, "selected vocabulary to count");
            terms
        }
    };

    let matrix = count_matrix(&bows, &terms);
    let sheet = if args.human_readable {
        (
            "humancounts".to_string(),
            human_frame("document", "word", &corpus.names, &terms, &matrix)?,
        )
    } else {
        (
            "counts".to_string(),
            matrix_frame("document", &corpus.names, &terms, &matrix)?,
        )
    };

    let out = args.corpus.resolve_out(&settings);
    report::write_report(&out, vec![sheet])?;
    Ok(())
}
