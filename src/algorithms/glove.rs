//! GloVe word embeddings trained on window co-occurrence counts, with
//! documents represented as count-weighted means of their word vectors.

use std::collections::HashMap;

use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::info;

use crate::error::{Result, TextmillError};
use crate::model::{DocModel, Estimator, Vectorizer};

use super::feature_labels;
use super::vectorize::CountVectorizer;

const WINDOW: usize = 5;
const EPOCHS: usize = 30;
const LEARNING_RATE: f64 = 0.05;
const X_MAX: f64 = 100.0;
const WEIGHT_ALPHA: f64 = 0.75;

/// Train embeddings from per-document sentence lists and wrap them as a
/// [`DocModel`]: documents-by-dimensions plus a dimensions-by-words basis.
pub fn glove(
    docsents: &[Vec<Vec<String>>],
    n_dims: usize,
    min_tf: usize,
    seed: u64,
) -> Result<DocModel> {
    if n_dims == 0 {
        return Err(TextmillError::InvalidConfig(
            "number of embedding dimensions must be positive".to_string(),
        ));
    }
    let docbows: Vec<Vec<String>> = docsents
        .iter()
        .map(|sents| {
            sents
                .iter()
                .flatten()
                .filter(|t| t.chars().all(char::is_alphabetic))
                .map(|t| t.to_lowercase())
                .collect()
        })
        .collect();
    let vectorizer = CountVectorizer::fit(&docbows, min_tf)?;
    let n_vocab = vectorizer.vocabulary().len();

    // symmetric window co-occurrence, weighted by 1/distance
    let mut cooc: HashMap<(usize, usize), f64> = HashMap::new();
    for sents in docsents {
        for sent in sents {
            let ids: Vec<usize> = sent
                .iter()
                .filter_map(|t| vectorizer.term_index(&t.to_lowercase()))
                .collect();
            for (i, &a) in ids.iter().enumerate() {
                for (offset, &b) in ids[i + 1..].iter().take(WINDOW).enumerate() {
                    let weight = 1.0 / (offset + 1) as f64;
                    *cooc.entry((a, b)).or_insert(0.0) += weight;
                    *cooc.entry((b, a)).or_insert(0.0) += weight;
                }
            }
        }
    }
    if cooc.is_empty() {
        return Err(TextmillError::InvalidConfig(
            "corpus produced no co-occurrence pairs; documents are too short".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let init = |rng: &mut StdRng| (rng.gen::<f64>() - 0.5) / n_dims as f64;
    let mut main = Array2::from_shape_fn((n_vocab, n_dims), |_| init(&mut rng));
    let mut context = Array2::from_shape_fn((n_vocab, n_dims), |_| init(&mut rng));
    let mut bias_main = Array1::from_elem(n_vocab, 0.0);
    let mut bias_context = Array1::from_elem(n_vocab, 0.0);
    let mut grad_main = Array2::from_elem((n_vocab, n_dims), 1.0f64);
    let mut grad_context = Array2::from_elem((n_vocab, n_dims), 1.0f64);
    let mut grad_bias_main = Array1::from_elem(n_vocab, 1.0f64);
    let mut grad_bias_context = Array1::from_elem(n_vocab, 1.0f64);

    let mut pairs: Vec<((usize, usize), f64)> = cooc.into_iter().collect();
    pairs.sort_by_key(|((a, b), _)| (*a, *b));

    for _ in 0..EPOCHS {
        pairs.shuffle(&mut rng);
        for &((a, b), count) in &pairs {
            let weight = (count / X_MAX).powf(WEIGHT_ALPHA).min(1.0);
            let dot: f64 = (0..n_dims).map(|d| main[[a, d]] * context[[b, d]]).sum();
            let diff = dot + bias_main[a] + bias_context[b] - count.ln();
            let coeff = weight * diff;

            for d in 0..n_dims {
                let grad_a = coeff * context[[b, d]];
                let grad_b = coeff * main[[a, d]];
                main[[a, d]] -= LEARNING_RATE * grad_a / grad_main[[a, d]].sqrt();
                context[[b, d]] -= LEARNING_RATE * grad_b / grad_context[[b, d]].sqrt();
                grad_main[[a, d]] += grad_a * grad_a;
                grad_context[[b, d]] += grad_b * grad_b;
            }
            bias_main[a] -= LEARNING_RATE * coeff / grad_bias_main[a].sqrt();
            bias_context[b] -= LEARNING_RATE * coeff / grad_bias_context[b].sqrt();
            grad_bias_main[a] += coeff * coeff;
            grad_bias_context[b] += coeff * coeff;
        }
    }

    let vectors = &main + &context;
    let estimator = GloveEstimator {
        vectors: vectors.clone(),
    };
    let counts = vectorizer.transform(&docbows)?;
    let doc_features = estimator.transform(&counts)?;

    info!(
        docs = docsents.len(),
        dims = n_dims,
        vocab = n_vocab,
        "fitted glove model"
    );

    let vocab = vectorizer.vocabulary().to_vec();
    Ok(DocModel::new(doc_features)
        .with_feature_ids(feature_labels("dim", n_dims))?
        .with_basis(vectors.t().to_owned(), Some(vocab))?
        .with_fitted(Box::new(vectorizer), Box::new(estimator)))
}

/// Paragraph vectors: the count-weighted mean of constituent word vectors.
struct GloveEstimator {
    vectors: Array2<f64>,
}

impl Estimator for GloveEstimator {
    fn transform(&self, counts: &Array2<f64>) -> Result<Array2<f64>> {
        if counts.ncols() != self.vectors.nrows() {
            return Err(TextmillError::DimensionMismatch {
                context: "vocabulary size vs embedding rows",
                left: counts.ncols(),
                right: self.vectors.nrows(),
            });
        }
        let mut weights = counts.clone();
        for mut row in weights.rows_mut() {
            let total: f64 = row.iter().sum();
            if total > 0.0 {
                row.mapv_inplace(|v| v / total);
            }
        }
        Ok(weights.dot(&self.vectors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Vec<Vec<String>>> {
        let sent = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        vec![
            vec![
                sent(&["the", "cat", "sat", "on", "the", "mat"]),
                sent(&["the", "cat", "ate", "the", "fish"]),
            ],
            vec![
                sent(&["the", "dog", "sat", "on", "the", "rug"]),
                sent(&["the", "dog", "ate", "the", "bone"]),
            ],
        ]
    }

    #[test]
    fn model_has_requested_dimensions() {
        let model = glove(&corpus(), 4, 1, 11).unwrap();
        assert_eq!(model.doc_features().shape(), &[2, 4]);
        let basis = model.feature_basis().unwrap();
        assert_eq!(basis.nrows(), 4);
        assert_eq!(basis.ncols(), model.basis_ids().unwrap().len());
    }

    #[test]
    fn same_seed_reproduces_vectors() {
        let a = glove(&corpus(), 3, 1, 5).unwrap();
        let b = glove(&corpus(), 3, 1, 5).unwrap();
        assert_eq!(a.doc_features(), b.doc_features());
    }

    #[test]
    fn transform_matches_training_representation() {
        let model = glove(&corpus(), 3, 1, 5).unwrap();
        let docbow: Vec<Vec<String>> = vec![corpus()[0].iter().flatten().cloned().collect()];
        let mapped = model.transform(&docbow).unwrap();
        let trained = model.doc_features();
        for d in 0..3 {
            assert!((mapped[[0, d]] - trained[[0, d]]).abs() < 1e-9);
        }
    }
}
