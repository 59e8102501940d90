//! Command-line interface wiring for textmill.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use indexmap::IndexMap;
use ndarray::Array2;

use crate::config::Settings;
use crate::data::Corpus;

pub mod entities;
pub mod glove;
pub mod grammar;
pub mod sentiment;
pub mod topicmodel;
pub mod wordcount;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Batch text analytics over document corpora", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Wordcount(args) => wordcount::run(args, settings).await,
            Commands::Sentiment(args) => sentiment::run(args, settings).await,
            Commands::Entities(args) => entities::run(args, settings).await,
            Commands::Grammar(args) => grammar::run(args, settings).await,
            Commands::Topicmodel(args) => topicmodel::run(args, settings).await,
            Commands::Glove(args) => glove::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Count selected words, or the whole frequent vocabulary, per document.
    Wordcount(wordcount::Args),
    /// Score documents against the sentiment lexicon.
    Sentiment(sentiment::Args),
    /// Extract and count canonicalized named entities.
    Entities(entities::Args),
    /// Extract grammatical relations and prepositional phrases.
    Grammar(grammar::Args),
    /// Fit an LDA or NMF topic model over the corpus.
    Topicmodel(topicmodel::Args),
    /// Train GloVe embeddings over the corpus.
    Glove(glove::Args),
}

/// Input/output arguments shared by every sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct CorpusArgs {
    /// Input files or directories (.txt documents or .csv tables).
    #[arg(required = true)]
    pub infiles: Vec<PathBuf>,

    /// Output report path (.csv or .parquet). Relative paths land in the
    /// configured outputs directory.
    #[arg(short, long)]
    pub out: PathBuf,

    /// Column holding document ids when reading CSV input.
    #[arg(long)]
    pub doc_label_col: Option<String>,

    /// Column holding document text when reading CSV input.
    #[arg(long, default_value = "text")]
    pub text_col: String,
}

impl CorpusArgs {
    pub fn read(&self) -> crate::error::Result<Corpus> {
        crate::data::read_corpus(&self.infiles, self.doc_label_col.as_deref(), &self.text_col)
    }

    pub fn resolve_out(&self, settings: &Settings) -> PathBuf {
        if self.out.is_absolute() {
            self.out.clone()
        } else {
            settings.join_output(&self.out)
        }
    }
}

/// Split a comma-separated CLI value into trimmed, non-empty items.
pub(crate) fn parse_comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Per-document occurrence counts of `terms`, as a docs-by-terms matrix.
pub(crate) fn count_matrix(docs: &[Vec<String>], terms: &[String]) -> Array2<f64> {
    let mut matrix = Array2::zeros((docs.len(), terms.len()));
    for (i, doc) in docs.iter().enumerate() {
        for (j, term) in terms.iter().enumerate() {
            matrix[[i, j]] = doc.iter().filter(|w| *w == term).count() as f64;
        }
    }
    matrix
}

/// Sum a list of per-document count maps into corpus totals, first-seen
/// key order.
pub(crate) fn count_totals<K>(per_doc: &[IndexMap<K, usize>]) -> IndexMap<K, usize>
where
    K: std::hash::Hash + Eq + Clone,
{
    let mut totals = IndexMap::new();
    for counts in per_doc {
        for (key, count) in counts {
            *totals.entry(key.clone()).or_insert(0) += count;
        }
    }
    totals
}
