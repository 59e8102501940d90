use ndarray::Array2;
use proptest::prelude::*;

use textmill::error::TextmillError;
use textmill::model::DocModel;

fn names(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}{i}")).collect()
}

fn sample_model(rows: usize, cols: usize) -> DocModel {
    let matrix = Array2::from_shape_fn((rows, cols), |(i, j)| (i * cols + j) as f64);
    DocModel::new(matrix)
        .with_doc_names(names("doc", rows))
        .unwrap()
        .with_feature_ids(names("f", cols))
        .unwrap()
}

#[test]
fn round_trip_reproduces_the_matrix_exactly() {
    let model = sample_model(5, 4);
    let mut rebuilt = Array2::zeros((5, 4));
    for (i, doc) in model.doc_names().to_vec().iter().enumerate() {
        for (j, (_, value)) in model
            .get_doc_features(doc, false, None)
            .unwrap()
            .into_iter()
            .enumerate()
        {
            rebuilt[[i, j]] = value;
        }
    }
    assert_eq!(&rebuilt, model.doc_features());
}

#[test]
fn topn_returns_min_of_k_and_feature_count() {
    let model = sample_model(3, 4);
    assert_eq!(model.get_doc_features("doc0", true, Some(2)).unwrap().len(), 2);
    assert_eq!(model.get_doc_features("doc0", true, Some(9)).unwrap().len(), 4);
    assert_eq!(model.get_doc_features("doc0", true, None).unwrap().len(), 4);
}

#[test]
fn mismatched_basis_fails_before_any_query() {
    let err = DocModel::new(Array2::zeros((8, 4)))
        .with_basis(Array2::zeros((6, 4)), None)
        .unwrap_err();
    assert!(matches!(
        err,
        TextmillError::DimensionMismatch { left: 6, right: 4, .. }
    ));
}

#[test]
fn basis_query_ranks_basis_objects() {
    let basis = Array2::from_shape_vec((2, 3), vec![0.1, 0.7, 0.2, 0.5, 0.2, 0.3]).unwrap();
    let model = DocModel::new(Array2::zeros((4, 2)))
        .with_feature_ids(names("f", 2))
        .unwrap()
        .with_basis(basis, Some(vec!["a".into(), "b".into(), "c".into()]))
        .unwrap();
    let top = model.get_feature_basis("f0", true, Some(2)).unwrap();
    assert_eq!(top[0].0, "b");
    assert_eq!(top[1].0, "c");
}

#[test]
fn transform_without_fitted_pair_names_both_components() {
    let model = sample_model(2, 2);
    let err = model.transform(&[vec!["word".to_string()]]).unwrap_err();
    match err {
        TextmillError::NotFitted { missing } => {
            assert!(missing.contains("vectorizer"));
            assert!(missing.contains("model"));
        }
        other => panic!("expected NotFitted, got {other:?}"),
    }
}

#[test]
fn renaming_documents_keeps_queries_working() {
    let mut model = sample_model(2, 2);
    model
        .set_doc_names(vec!["first".to_string(), "second".to_string()])
        .unwrap();
    assert!(model.get_doc_features("doc0", false, None).is_err());
    let row = model.get_doc_features("second", false, None).unwrap();
    assert_eq!(row[0].1, 2.0);
}

#[test]
fn human_summary_totals_row_sums_each_column() {
    let model = sample_model(4, 3);
    let frame = model.human_doc_features().unwrap();
    let rows = frame.column("document").unwrap().str().unwrap();
    let features = frame.column("feature").unwrap().str().unwrap();
    let values = frame.column("value").unwrap().f64().unwrap();

    for idx in 0..frame.height() {
        if rows.get(idx) != Some("Totals") {
            continue;
        }
        let feature = features.get(idx).unwrap();
        let j: usize = feature.trim_start_matches('f').parse().unwrap();
        let expected: f64 = model.doc_features().column(j).sum();
        assert_eq!(values.get(idx), Some(expected));
    }
}

proptest! {
    /// Sorted queries are descending and truncate to min(k, Nfeat).
    #[test]
    fn sorted_queries_are_descending(
        values in proptest::collection::vec(-1000.0f64..1000.0, 1..12),
        k in 1usize..15,
    ) {
        let cols = values.len();
        let matrix = Array2::from_shape_vec((1, cols), values).unwrap();
        let model = DocModel::new(matrix);
        let top = model.get_doc_features("0", true, Some(k)).unwrap();
        prop_assert_eq!(top.len(), k.min(cols));
        for pair in top.windows(2) {
            prop_assert!(pair[0].1 >= pair[1].1);
        }
    }
}
