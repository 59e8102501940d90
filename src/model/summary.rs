//! Summary and report tables derived from a [`DocModel`].
//!
//! Two table shapes exist: ranked summaries (each row replaced by the ids
//! of its top-valued columns) and the human-readable long format (one row
//! per matrix cell, documents ascending and values descending inside a
//! document, with a leading block of per-column totals).

use ndarray::{Array2, Axis};
use polars::prelude::{DataFrame, NamedFrom, Series};

use crate::error::Result;

use super::DocModel;

impl DocModel {
    /// Per-document ranking of feature ids ("top-5 topics per document").
    pub fn doc_summary(&self, topn: Option<usize>) -> Result<DataFrame> {
        let rows: Vec<Vec<(String, f64)>> = self
            .doc_names()
            .iter()
            .map(|doc| self.get_doc_features(doc, true, topn))
            .collect::<Result<_>>()?;
        ranked_frame("document", self.doc_names(), &rows)
    }

    /// Per-feature ranking of document names.
    pub fn feature_doc_summary(&self, topn: Option<usize>) -> Result<DataFrame> {
        let rows: Vec<Vec<(String, f64)>> = self
            .feature_ids()
            .iter()
            .map(|feature| self.get_feature_docs(feature, true, topn))
            .collect::<Result<_>>()?;
        ranked_frame("feature", self.feature_ids(), &rows)
    }

    /// Per-feature ranking of basis ids ("top-5 words per topic"). Fails
    /// when no basis matrix was provided.
    pub fn feature_summary(&self, topn: Option<usize>) -> Result<DataFrame> {
        let rows: Vec<Vec<(String, f64)>> = self
            .feature_ids()
            .iter()
            .map(|feature| self.get_feature_basis(feature, true, topn))
            .collect::<Result<_>>()?;
        ranked_frame("feature", self.feature_ids(), &rows)
    }

    /// The raw doc-features matrix as a wide table.
    pub fn doc_features_frame(&self) -> Result<DataFrame> {
        matrix_frame("document", self.doc_names(), self.feature_ids(), self.doc_features())
    }

    /// The basis matrix as a wide table. Fails without a basis.
    pub fn feature_basis_frame(&self) -> Result<DataFrame> {
        let basis = self
            .feature_basis()
            .ok_or(crate::error::TextmillError::MissingBasis)?;
        let ids = self.basis_ids().expect("basis ids set with basis");
        matrix_frame("feature", self.feature_ids(), ids, basis)
    }

    /// The doc-features matrix in human-readable long format.
    pub fn human_doc_features(&self) -> Result<DataFrame> {
        human_frame(
            "document",
            "feature",
            self.doc_names(),
            self.feature_ids(),
            self.doc_features(),
        )
    }

    /// Assemble the report sheet list: the raw matrix (or its
    /// human-readable layout), optionally the basis matrix, and the
    /// ranked summaries. `feature_label` names the feature axis in sheet
    /// names ("topic", "dimension").
    pub fn report_sheets(
        &self,
        feature_label: &str,
        save_basis: bool,
        human: bool,
        summary_topn: Option<usize>,
    ) -> Result<Vec<(String, DataFrame)>> {
        let mut sheets = Vec::new();
        let doc_sheet = if human {
            self.human_doc_features()?
        } else {
            self.doc_features_frame()?
        };
        sheets.push((format!("doc_{feature_label}"), doc_sheet));
        if self.feature_basis().is_some() {
            if save_basis {
                sheets.push((format!("{feature_label}_words"), self.feature_basis_frame()?));
            }
            sheets.push((
                format!("{feature_label}_summary"),
                self.feature_summary(summary_topn)?,
            ));
        }
        sheets.push(("doc_summary".to_string(), self.doc_summary(summary_topn)?));
        Ok(sheets)
    }
}

/// Wide table: one label column plus one f64 column per matrix column.
pub fn matrix_frame(
    row_label: &str,
    row_names: &[String],
    col_names: &[String],
    matrix: &Array2<f64>,
) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(col_names.len() + 1);
    columns.push(Series::new(row_label.into(), row_names.to_vec()));
    for (j, col_name) in col_names.iter().enumerate() {
        let values: Vec<f64> = matrix.column(j).to_vec();
        columns.push(Series::new(col_name.as_str().into(), values));
    }
    Ok(DataFrame::new(columns)?)
}

/// Ranked-summary table: one label column plus `top_k` id columns.
fn ranked_frame(
    row_label: &str,
    row_names: &[String],
    rows: &[Vec<(String, f64)>],
) -> Result<DataFrame> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut columns = Vec::with_capacity(width + 1);
    columns.push(Series::new(row_label.into(), row_names.to_vec()));
    for rank in 0..width {
        let ids: Vec<String> = rows
            .iter()
            .map(|row| row.get(rank).map(|(id, _)| id.clone()).unwrap_or_default())
            .collect();
        columns.push(Series::new(format!("top_{}", rank + 1).into(), ids));
    }
    Ok(DataFrame::new(columns)?)
}

/// Long-format table sorted for reading: a leading "Totals" block with
/// exact per-column sums, then per-row cells, rows ascending by name and
/// values descending within a row.
pub fn human_frame(
    row_label: &str,
    col_label: &str,
    row_names: &[String],
    col_names: &[String],
    matrix: &Array2<f64>,
) -> Result<DataFrame> {
    let mut row_ids = Vec::new();
    let mut col_ids = Vec::new();
    let mut values = Vec::new();

    let totals = matrix.sum_axis(Axis(0));
    let mut total_cells: Vec<(String, f64)> = col_names
        .iter()
        .cloned()
        .zip(totals.iter().copied())
        .collect();
    total_cells.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    for (col, value) in total_cells {
        row_ids.push("Totals".to_string());
        col_ids.push(col);
        values.push(value);
    }

    let mut order: Vec<usize> = (0..row_names.len()).collect();
    order.sort_by(|&a, &b| row_names[a].cmp(&row_names[b]));
    for i in order {
        let mut cells: Vec<(String, f64)> = col_names
            .iter()
            .cloned()
            .zip(matrix.row(i).iter().copied())
            .collect();
        cells.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        for (col, value) in cells {
            row_ids.push(row_names[i].clone());
            col_ids.push(col);
            values.push(value);
        }
    }

    Ok(DataFrame::new(vec![
        Series::new(row_label.into(), row_ids),
        Series::new(col_label.into(), col_ids),
        Series::new("value".into(), values),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocModel;
    use ndarray::array;

    fn model() -> DocModel {
        DocModel::new(array![[1.0, 4.0], [3.0, 2.0]])
            .with_doc_names(vec!["b".to_string(), "a".to_string()])
            .unwrap()
            .with_feature_ids(vec!["f0".to_string(), "f1".to_string()])
            .unwrap()
    }

    #[test]
    fn doc_summary_ranks_features_per_document() {
        let df = model().doc_summary(Some(1)).unwrap();
        assert_eq!(df.shape(), (2, 2));
        let top = df.column("top_1").unwrap().str().unwrap();
        assert_eq!(top.get(0), Some("f1"));
        assert_eq!(top.get(1), Some("f0"));
    }

    #[test]
    fn human_frame_totals_lead_and_sum_exactly() {
        let df = model().human_doc_features().unwrap();
        let rows = df.column("document").unwrap().str().unwrap();
        let values = df.column("value").unwrap().f64().unwrap();
        assert_eq!(rows.get(0), Some("Totals"));
        assert_eq!(rows.get(1), Some("Totals"));
        // f1 total = 6.0 ranks above f0 total = 4.0
        assert_eq!(values.get(0), Some(6.0));
        assert_eq!(values.get(1), Some(4.0));
        // documents follow in ascending name order
        assert_eq!(rows.get(2), Some("a"));
    }

    #[test]
    fn report_sheets_without_basis_skip_basis_sheets() {
        let sheets = model().report_sheets("topic", true, false, None).unwrap();
        let names: Vec<&str> = sheets.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["doc_topic", "doc_summary"]);
    }
}
