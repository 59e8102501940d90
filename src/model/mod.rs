//! The corpus model: documents-by-features, optionally decomposed into a
//! features-by-basis matrix.
//!
//! A [`DocModel`] is constructed once from algorithm output and read-only
//! afterwards (documents can be renamed, nothing else moves). Topic
//! models and embeddings both fit this shape: for LDA/NMF the features
//! are topics and the basis objects are vocabulary words; for embeddings
//! the features are dimensions.

pub mod summary;

use std::cmp::Ordering;
use std::collections::HashMap;

use ndarray::{Array2, ArrayView1};

use crate::error::{Result, TextmillError};

/// Maps pre-tokenized documents into a fixed feature space.
pub trait Vectorizer: Send {
    fn transform(&self, docs: &[Vec<String>]) -> Result<Array2<f64>>;
    fn vocabulary(&self) -> &[String];
}

/// Maps vectorized documents into the model's feature space.
pub trait Estimator: Send {
    fn transform(&self, features: &Array2<f64>) -> Result<Array2<f64>>;
}

/// Ndocs x Nfeat matrix with optional Nfeat x Nbasis decomposition and an
/// optional fitted vectorizer/estimator pair for mapping unseen documents.
pub struct DocModel {
    doc_features: Array2<f64>,
    feature_basis: Option<Array2<f64>>,
    doc_names: Vec<String>,
    doc_index: HashMap<String, usize>,
    feature_ids: Vec<String>,
    feature_index: HashMap<String, usize>,
    basis_ids: Option<Vec<String>>,
    vectorizer: Option<Box<dyn Vectorizer>>,
    estimator: Option<Box<dyn Estimator>>,
}

impl std::fmt::Debug for DocModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocModel")
            .field("ndocs", &self.ndocs())
            .field("nfeat", &self.nfeat())
            .field("nbasis", &self.nbasis())
            .field("fitted", &(self.vectorizer.is_some() && self.estimator.is_some()))
            .finish()
    }
}

impl DocModel {
    /// Wrap a documents-by-features matrix. Documents get positional
    /// names and features positional ids until overridden.
    pub fn new(doc_features: Array2<f64>) -> Self {
        let doc_names: Vec<String> = (0..doc_features.nrows()).map(|i| i.to_string()).collect();
        let feature_ids: Vec<String> = (0..doc_features.ncols()).map(|i| i.to_string()).collect();
        Self {
            doc_index: index_of(&doc_names),
            feature_index: index_of(&feature_ids),
            doc_names,
            feature_ids,
            doc_features,
            feature_basis: None,
            basis_ids: None,
            vectorizer: None,
            estimator: None,
        }
    }

    /// Name the documents. Count must match the matrix rows and names
    /// must be unique.
    pub fn with_doc_names(mut self, names: Vec<String>) -> Result<Self> {
        self.set_doc_names(names)?;
        Ok(self)
    }

    /// Name the features. Count must match the matrix columns.
    pub fn with_feature_ids(mut self, ids: Vec<String>) -> Result<Self> {
        if ids.len() != self.nfeat() {
            return Err(TextmillError::DimensionMismatch {
                context: "feature ids vs doc_features columns",
                left: ids.len(),
                right: self.nfeat(),
            });
        }
        self.feature_index = index_of(&ids);
        self.feature_ids = ids;
        Ok(self)
    }

    /// Attach the feature-basis decomposition. Row count must equal the
    /// doc-features column count, and basis ids (when given) must match
    /// the basis columns.
    pub fn with_basis(mut self, basis: Array2<f64>, ids: Option<Vec<String>>) -> Result<Self> {
        if basis.nrows() != self.nfeat() {
            return Err(TextmillError::DimensionMismatch {
                context: "feature_basis rows vs doc_features columns",
                left: basis.nrows(),
                right: self.nfeat(),
            });
        }
        if let Some(ids) = &ids {
            if ids.len() != basis.ncols() {
                return Err(TextmillError::DimensionMismatch {
                    context: "basis ids vs feature_basis columns",
                    left: ids.len(),
                    right: basis.ncols(),
                });
            }
        }
        self.basis_ids =
            Some(ids.unwrap_or_else(|| (0..basis.ncols()).map(|i| i.to_string()).collect()));
        self.feature_basis = Some(basis);
        Ok(self)
    }

    /// Attach the fitted vectorizer/estimator pair enabling [`Self::transform`].
    pub fn with_fitted(
        mut self,
        vectorizer: Box<dyn Vectorizer>,
        estimator: Box<dyn Estimator>,
    ) -> Self {
        self.vectorizer = Some(vectorizer);
        self.estimator = Some(estimator);
        self
    }

    pub fn ndocs(&self) -> usize {
        self.doc_features.nrows()
    }

    pub fn nfeat(&self) -> usize {
        self.doc_features.ncols()
    }

    pub fn nbasis(&self) -> Option<usize> {
        self.feature_basis.as_ref().map(|basis| basis.ncols())
    }

    pub fn doc_names(&self) -> &[String] {
        &self.doc_names
    }

    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    pub fn basis_ids(&self) -> Option<&[String]> {
        self.basis_ids.as_deref()
    }

    pub fn doc_features(&self) -> &Array2<f64> {
        &self.doc_features
    }

    pub fn feature_basis(&self) -> Option<&Array2<f64>> {
        self.feature_basis.as_ref()
    }

    /// Rename all documents. The only mutation the model supports.
    pub fn set_doc_names(&mut self, names: Vec<String>) -> Result<()> {
        if names.len() != self.ndocs() {
            return Err(TextmillError::DimensionMismatch {
                context: "document names vs doc_features rows",
                left: names.len(),
                right: self.ndocs(),
            });
        }
        let index = index_of(&names);
        if index.len() != names.len() {
            let dup = find_duplicate(&names).expect("duplicate exists when index is shorter");
            return Err(TextmillError::DuplicateDocName(dup));
        }
        self.doc_index = index;
        self.doc_names = names;
        Ok(())
    }

    /// Feature values for one document, as `(feature id, value)` pairs.
    ///
    /// With `sort`, entries come back by value descending; ties keep
    /// their original column order (stable sort). `topn` truncates after
    /// the optional ranking; `None` returns everything.
    pub fn get_doc_features(
        &self,
        doc: &str,
        sort: bool,
        topn: Option<usize>,
    ) -> Result<Vec<(String, f64)>> {
        let row = *self
            .doc_index
            .get(doc)
            .ok_or_else(|| TextmillError::lookup("document", doc))?;
        Ok(ranked(
            &self.feature_ids,
            self.doc_features.row(row),
            sort,
            topn,
        ))
    }

    /// Documents scored against one feature, as `(document, value)`
    /// pairs. Same ordering contract as [`Self::get_doc_features`].
    pub fn get_feature_docs(
        &self,
        feature: &str,
        sort: bool,
        topn: Option<usize>,
    ) -> Result<Vec<(String, f64)>> {
        let col = *self
            .feature_index
            .get(feature)
            .ok_or_else(|| TextmillError::lookup("feature", feature))?;
        Ok(ranked(
            &self.doc_names,
            self.doc_features.column(col),
            sort,
            topn,
        ))
    }

    /// Basis weights for one feature, as `(basis id, value)` pairs.
    /// Fails when the model was constructed without a basis matrix.
    pub fn get_feature_basis(
        &self,
        feature: &str,
        sort: bool,
        topn: Option<usize>,
    ) -> Result<Vec<(String, f64)>> {
        let basis = self
            .feature_basis
            .as_ref()
            .ok_or(TextmillError::MissingBasis)?;
        let ids = self.basis_ids.as_ref().expect("basis ids set with basis");
        let row = *self
            .feature_index
            .get(feature)
            .ok_or_else(|| TextmillError::lookup("feature", feature))?;
        Ok(ranked(ids, basis.row(row), sort, topn))
    }

    /// Map a new batch of tokenized documents into this model's feature
    /// space through the stored vectorizer and estimator. Only fitted
    /// models support this; a merely observed matrix does not.
    pub fn transform(&self, docs: &[Vec<String>]) -> Result<Array2<f64>> {
        match (&self.vectorizer, &self.estimator) {
            (Some(vectorizer), Some(estimator)) => {
                let features = vectorizer.transform(docs)?;
                estimator.transform(&features)
            }
            (None, None) => Err(TextmillError::NotFitted {
                missing: "both a vectorizer and a model".to_string(),
            }),
            (None, Some(_)) => Err(TextmillError::NotFitted {
                missing: "a vectorizer".to_string(),
            }),
            (Some(_), None) => Err(TextmillError::NotFitted {
                missing: "a model".to_string(),
            }),
        }
    }
}

fn index_of(names: &[String]) -> HashMap<String, usize> {
    names
        .iter()
        .enumerate()
        .map(|(i, n)| (n.clone(), i))
        .collect()
}

fn find_duplicate(names: &[String]) -> Option<String> {
    let mut seen = std::collections::HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Some(name.clone());
        }
    }
    None
}

fn ranked(
    names: &[String],
    values: ArrayView1<'_, f64>,
    sort: bool,
    topn: Option<usize>,
) -> Vec<(String, f64)> {
    let mut pairs: Vec<(String, f64)> = names
        .iter()
        .cloned()
        .zip(values.iter().copied())
        .collect();
    if sort {
        // stable: equal values keep original column order
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    }
    if let Some(n) = topn {
        pairs.truncate(n);
    }
    pairs
}
