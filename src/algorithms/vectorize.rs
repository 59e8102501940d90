//! Vectorizers turning pre-tokenized documents into document-term
//! matrices. Vocabulary keeps first-seen corpus order.

use std::collections::HashMap;

use indexmap::IndexMap;
use ndarray::Array2;

use crate::error::{Result, TextmillError};
use crate::model::Vectorizer;

/// Raw term counts over a fixed vocabulary. Out-of-vocabulary terms are
/// ignored at transform time.
#[derive(Debug)]
pub struct CountVectorizer {
    vocab: Vec<String>,
    index: HashMap<String, usize>,
}

impl CountVectorizer {
    /// Learn a vocabulary from the corpus, keeping terms whose corpus-wide
    /// frequency reaches `min_tf` (values below 1 behave like 1).
    pub fn fit(docs: &[Vec<String>], min_tf: usize) -> Result<Self> {
        let mut freq: IndexMap<String, usize> = IndexMap::new();
        for doc in docs {
            for term in doc {
                *freq.entry(term.clone()).or_insert(0) += 1;
            }
        }
        let threshold = min_tf.max(1);
        let vocab: Vec<String> = freq
            .into_iter()
            .filter(|(_, count)| *count >= threshold)
            .map(|(term, _)| term)
            .collect();
        if vocab.is_empty() {
            return Err(TextmillError::InvalidConfig(
                "no terms reached the minimum frequency threshold".to_string(),
            ));
        }
        Ok(Self::from_vocabulary(vocab))
    }

    pub fn from_vocabulary(vocab: Vec<String>) -> Self {
        let index = vocab
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();
        Self { vocab, index }
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    /// Number of documents each vocabulary term occurs in.
    pub fn doc_frequencies(&self, docs: &[Vec<String>]) -> Vec<usize> {
        let mut df = vec![0usize; self.vocab.len()];
        let mut seen = vec![false; self.vocab.len()];
        for doc in docs {
            seen.fill(false);
            for term in doc {
                if let Some(j) = self.term_index(term) {
                    if !seen[j] {
                        seen[j] = true;
                        df[j] += 1;
                    }
                }
            }
        }
        df
    }
}

impl Vectorizer for CountVectorizer {
    fn transform(&self, docs: &[Vec<String>]) -> Result<Array2<f64>> {
        let mut matrix = Array2::zeros((docs.len(), self.vocab.len()));
        for (i, doc) in docs.iter().enumerate() {
            for term in doc {
                if let Some(j) = self.term_index(term) {
                    matrix[[i, j]] += 1.0;
                }
            }
        }
        Ok(matrix)
    }

    fn vocabulary(&self) -> &[String] {
        &self.vocab
    }
}

/// Tf-idf weighting on top of [`CountVectorizer`], smoothed idf and
/// L2-normalized rows.
pub struct TfidfVectorizer {
    counts: CountVectorizer,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn fit(docs: &[Vec<String>], min_tf: usize) -> Result<Self> {
        let counts = CountVectorizer::fit(docs, min_tf)?;
        let n = docs.len() as f64;
        let idf = counts
            .doc_frequencies(docs)
            .into_iter()
            .map(|df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();
        Ok(Self { counts, idf })
    }
}

impl Vectorizer for TfidfVectorizer {
    fn transform(&self, docs: &[Vec<String>]) -> Result<Array2<f64>> {
        let mut matrix = self.counts.transform(docs)?;
        for mut row in matrix.rows_mut() {
            for (j, value) in row.iter_mut().enumerate() {
                *value *= self.idf[j];
            }
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                row.mapv_inplace(|v| v / norm);
            }
        }
        Ok(matrix)
    }

    fn vocabulary(&self) -> &[String] {
        self.counts.vocabulary()
    }
}
