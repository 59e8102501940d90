//! Latent Dirichlet Allocation via collapsed Gibbs sampling.

use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::info;

use crate::error::{Result, TextmillError};
use crate::model::{DocModel, Estimator, Vectorizer};

use super::feature_labels;
use super::vectorize::CountVectorizer;

const SWEEPS: usize = 200;
const ALPHA: f64 = 0.1;
const BETA: f64 = 0.01;
const FOLD_IN_ITERS: usize = 30;

/// Fit an LDA topic model over per-document bags of words and wrap it as
/// a [`DocModel`]: documents-by-topics plus a topics-by-words basis.
pub fn lda(docbows: &[Vec<String>], n_topics: usize, min_tf: usize, seed: u64) -> Result<DocModel> {
    if n_topics == 0 {
        return Err(TextmillError::InvalidConfig(
            "number of topics must be positive".to_string(),
        ));
    }
    let vectorizer = CountVectorizer::fit(docbows, min_tf)?;
    let n_vocab = vectorizer.vocabulary().len();
    let token_ids: Vec<Vec<usize>> = docbows
        .iter()
        .map(|doc| {
            doc.iter()
                .filter_map(|term| vectorizer.term_index(term))
                .collect()
        })
        .collect();

    let mut rng = StdRng::seed_from_u64(seed);
    let mut doc_topic = vec![vec![0usize; n_topics]; token_ids.len()];
    let mut topic_term = vec![vec![0usize; n_vocab]; n_topics];
    let mut topic_total = vec![0usize; n_topics];
    let mut assignments: Vec<Vec<usize>> = token_ids
        .iter()
        .enumerate()
        .map(|(d, tokens)| {
            tokens
                .iter()
                .map(|&w| {
                    let k = rng.gen_range(0..n_topics);
                    doc_topic[d][k] += 1;
                    topic_term[k][w] += 1;
                    topic_total[k] += 1;
                    k
                })
                .collect()
        })
        .collect();

    let mut weights = vec![0.0f64; n_topics];
    for _ in 0..SWEEPS {
        for (d, tokens) in token_ids.iter().enumerate() {
            for (pos, &w) in tokens.iter().enumerate() {
                let old = assignments[d][pos];
                doc_topic[d][old] -= 1;
                topic_term[old][w] -= 1;
                topic_total[old] -= 1;

                let mut total = 0.0;
                for k in 0..n_topics {
                    let p = (doc_topic[d][k] as f64 + ALPHA)
                        * (topic_term[k][w] as f64 + BETA)
                        / (topic_total[k] as f64 + n_vocab as f64 * BETA);
                    total += p;
                    weights[k] = total;
                }
                let draw = rng.gen_range(0.0..total);
                let new = weights.partition_point(|&cum| cum < draw).min(n_topics - 1);

                assignments[d][pos] = new;
                doc_topic[d][new] += 1;
                topic_term[new][w] += 1;
                topic_total[new] += 1;
            }
        }
    }

    let doc_topics = Array2::from_shape_fn((token_ids.len(), n_topics), |(d, k)| {
        (doc_topic[d][k] as f64 + ALPHA) / (token_ids[d].len() as f64 + n_topics as f64 * ALPHA)
    });
    let topic_words = Array2::from_shape_fn((n_topics, n_vocab), |(k, w)| {
        (topic_term[k][w] as f64 + BETA) / (topic_total[k] as f64 + n_vocab as f64 * BETA)
    });

    info!(
        docs = token_ids.len(),
        topics = n_topics,
        vocab = n_vocab,
        "fitted lda model"
    );

    let estimator = LdaEstimator {
        topic_words: topic_words.clone(),
    };
    let vocab = vectorizer.vocabulary().to_vec();
    Ok(DocModel::new(doc_topics)
        .with_feature_ids(feature_labels("topic", n_topics))?
        .with_basis(topic_words, Some(vocab))?
        .with_fitted(Box::new(vectorizer), Box::new(estimator)))
}

/// Folds unseen documents into a fitted topic-word distribution by
/// iterating topic responsibilities to a stationary document mixture.
struct LdaEstimator {
    topic_words: Array2<f64>,
}

impl Estimator for LdaEstimator {
    fn transform(&self, counts: &Array2<f64>) -> Result<Array2<f64>> {
        let n_topics = self.topic_words.nrows();
        if counts.ncols() != self.topic_words.ncols() {
            return Err(TextmillError::DimensionMismatch {
                context: "vocabulary size vs basis columns",
                left: counts.ncols(),
                right: self.topic_words.ncols(),
            });
        }
        let mut out = Array2::zeros((counts.nrows(), n_topics));
        for (d, doc) in counts.rows().into_iter().enumerate() {
            let mut theta = vec![1.0 / n_topics as f64; n_topics];
            for _ in 0..FOLD_IN_ITERS {
                let mut acc = vec![ALPHA; n_topics];
                for (w, &count) in doc.iter().enumerate() {
                    if count == 0.0 {
                        continue;
                    }
                    let mut resp: Vec<f64> = (0..n_topics)
                        .map(|k| theta[k] * self.topic_words[[k, w]])
                        .collect();
                    let total: f64 = resp.iter().sum();
                    if total > 0.0 {
                        for r in &mut resp {
                            *r /= total;
                        }
                    }
                    for k in 0..n_topics {
                        acc[k] += count * resp[k];
                    }
                }
                let total: f64 = acc.iter().sum();
                for k in 0..n_topics {
                    theta[k] = acc[k] / total;
                }
            }
            for k in 0..n_topics {
                out[[d, k]] = theta[k];
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Vec<String>> {
        let doc = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        vec![
            doc(&["apple", "pear", "fruit", "apple", "pear"]),
            doc(&["engine", "wheel", "car", "engine", "wheel"]),
            doc(&["fruit", "apple", "pear", "fruit"]),
            doc(&["car", "wheel", "engine", "car"]),
        ]
    }

    #[test]
    fn doc_topic_rows_are_distributions() {
        let model = lda(&corpus(), 2, 1, 7).unwrap();
        for doc in model.doc_names().to_vec() {
            let total: f64 = model
                .get_doc_features(&doc, false, None)
                .unwrap()
                .iter()
                .map(|p| p.1)
                .sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn same_seed_reproduces_the_model() {
        let a = lda(&corpus(), 2, 1, 42).unwrap();
        let b = lda(&corpus(), 2, 1, 42).unwrap();
        assert_eq!(a.doc_features(), b.doc_features());
    }

    #[test]
    fn transform_maps_unseen_docs_into_topic_space() {
        let model = lda(&corpus(), 2, 1, 7).unwrap();
        let unseen = vec![vec!["apple".to_string(), "pear".to_string()]];
        let mapped = model.transform(&unseen).unwrap();
        assert_eq!(mapped.shape(), &[1, 2]);
        let total: f64 = mapped.row(0).iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_topics_is_a_configuration_error() {
        let err = lda(&corpus(), 0, 1, 0).unwrap_err();
        assert!(matches!(err, TextmillError::InvalidConfig(_)));
    }
}
