//! Library-level error taxonomy.
//!
//! Contract violations fail fast at the call boundary that breaks them:
//! configuration errors for bad requests, dimension mismatches for
//! incompatible matrices, lookup errors for unknown ids. Failures coming
//! from collaborators (the annotator, the estimators) pass through
//! untouched as [`TextmillError::External`].

use thiserror::Error;

/// Result alias used across the library crate.
pub type Result<T> = std::result::Result<T, TextmillError>;

#[derive(Debug, Error)]
pub enum TextmillError {
    /// A feature name outside the known set was requested.
    #[error("unrecognized feature name: {0:?}")]
    UnknownFeature(String),

    /// The extractor dependency table contains a cycle.
    #[error("dependency cycle while resolving feature {0:?}")]
    DependencyCycle(String),

    /// Entity type allow and deny lists were both supplied.
    #[error("entity type allow-list and deny-list are mutually exclusive; pass at most one")]
    ExclusiveEntityFilters,

    /// Two documents share one name; matrix rows must be addressable.
    #[error("duplicate document name: {0:?}")]
    DuplicateDocName(String),

    /// A query addressed the basis matrix of a model constructed without one.
    #[error("feature basis not provided for this model")]
    MissingBasis,

    /// `transform` was called on a model that is not fitted.
    #[error("cannot transform: model is missing {missing}")]
    NotFitted {
        /// Which of vectorizer/estimator (or both) are absent.
        missing: String,
    },

    /// Matrix shapes disagree with the construction contract.
    #[error("dimension mismatch in {context}: {left} != {right}")]
    DimensionMismatch {
        context: &'static str,
        left: usize,
        right: usize,
    },

    /// An unknown document, feature, or basis id was queried.
    #[error("unknown {kind}: {key:?}")]
    Lookup { kind: &'static str, key: String },

    /// An invalid parameter combination outside the cases above.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Collaborator failure, propagated unchanged.
    #[error(transparent)]
    External(#[from] anyhow::Error),
}

impl TextmillError {
    /// Helper for lookup failures with an owned key.
    pub fn lookup(kind: &'static str, key: impl Into<String>) -> Self {
        Self::Lookup {
            kind,
            key: key.into(),
        }
    }
}

impl From<polars::error::PolarsError> for TextmillError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::External(anyhow::Error::new(err))
    }
}
