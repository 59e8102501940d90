//! Non-negative matrix factorization over tf-idf features, using
//! multiplicative updates.

use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::info;

use crate::error::{Result, TextmillError};
use crate::model::{DocModel, Estimator, Vectorizer};

use super::feature_labels;
use super::vectorize::TfidfVectorizer;

const FIT_ITERS: usize = 200;
const TRANSFORM_ITERS: usize = 100;
const EPS: f64 = 1e-9;

/// Factorize the corpus tf-idf matrix as `X ~ W * H` and wrap the result
/// as a [`DocModel`]: `W` are the document features, `H` the basis.
pub fn nmf(docbows: &[Vec<String>], n_topics: usize, min_tf: usize, seed: u64) -> Result<DocModel> {
    if n_topics == 0 {
        return Err(TextmillError::InvalidConfig(
            "number of topics must be positive".to_string(),
        ));
    }
    let vectorizer = TfidfVectorizer::fit(docbows, min_tf)?;
    let x = vectorizer.transform(docbows)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let scale = (x.mean().unwrap_or(0.0) / n_topics as f64).sqrt().max(EPS);
    let mut w = Array2::from_shape_fn((x.nrows(), n_topics), |_| rng.gen::<f64>() * scale);
    let mut h = Array2::from_shape_fn((n_topics, x.ncols()), |_| rng.gen::<f64>() * scale);

    for _ in 0..FIT_ITERS {
        let numerator = w.t().dot(&x);
        let denominator = w.t().dot(&w).dot(&h) + EPS;
        h = &h * &(&numerator / &denominator);

        let numerator = x.dot(&h.t());
        let denominator = w.dot(&h).dot(&h.t()) + EPS;
        w = &w * &(&numerator / &denominator);
    }

    info!(
        docs = x.nrows(),
        topics = n_topics,
        vocab = x.ncols(),
        "fitted nmf model"
    );

    let estimator = NmfEstimator { basis: h.clone() };
    let vocab = vectorizer.vocabulary().to_vec();
    Ok(DocModel::new(w)
        .with_feature_ids(feature_labels("topic", n_topics))?
        .with_basis(h, Some(vocab))?
        .with_fitted(Box::new(vectorizer), Box::new(estimator)))
}

/// Solves `W` for unseen documents with the fitted basis held fixed.
struct NmfEstimator {
    basis: Array2<f64>,
}

impl Estimator for NmfEstimator {
    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.basis.ncols() {
            return Err(TextmillError::DimensionMismatch {
                context: "vocabulary size vs basis columns",
                left: x.ncols(),
                right: self.basis.ncols(),
            });
        }
        let n_topics = self.basis.nrows();
        let mut w = Array2::from_elem((x.nrows(), n_topics), 1.0 / n_topics as f64);
        for _ in 0..TRANSFORM_ITERS {
            let numerator = x.dot(&self.basis.t());
            let denominator = w.dot(&self.basis).dot(&self.basis.t()) + EPS;
            w = &w * &(&numerator / &denominator);
        }
        Ok(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Vec<String>> {
        let doc = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        vec![
            doc(&["apple", "pear", "fruit", "apple"]),
            doc(&["engine", "wheel", "car", "car"]),
            doc(&["fruit", "apple", "pear"]),
            doc(&["car", "wheel", "engine"]),
        ]
    }

    #[test]
    fn factors_are_non_negative() {
        let model = nmf(&corpus(), 2, 1, 3).unwrap();
        assert!(model.doc_features().iter().all(|&v| v >= 0.0));
        assert!(model.feature_basis().unwrap().iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn separates_the_two_word_clusters() {
        let model = nmf(&corpus(), 2, 1, 3).unwrap();
        // docs 0 and 2 share a dominant topic, as do docs 1 and 3
        let top = |doc: &str| {
            model
                .get_doc_features(doc, true, Some(1))
                .unwrap()
                .remove(0)
                .0
        };
        assert_eq!(top("0"), top("2"));
        assert_eq!(top("1"), top("3"));
        assert_ne!(top("0"), top("1"));
    }

    #[test]
    fn transform_rejects_wrong_vocabulary_width() {
        let model = nmf(&corpus(), 2, 1, 3).unwrap();
        // bypass the stored vectorizer to hit the estimator check
        let err = {
            let estimator = NmfEstimator {
                basis: model.feature_basis().unwrap().clone(),
            };
            estimator.transform(&Array2::zeros((1, 3))).unwrap_err()
        };
        assert!(matches!(err, TextmillError::DimensionMismatch { .. }));
    }
}
