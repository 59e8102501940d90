//! Report output: a named list of (sheet, table) pairs written as one
//! file per sheet next to the requested output path.

use std::fs::File;
use std::path::{Path, PathBuf};

use polars::prelude::{CsvWriter, DataFrame, ParquetWriter, SerWriter};
use tracing::info;

use crate::error::{Result, TextmillError};

/// Write every sheet as CSV or Parquet, depending on the output
/// extension. A single sheet lands at `path` itself; multiple sheets
/// become `<stem>_<sheet>.<ext>` siblings. Returns the paths written.
pub fn write_report(path: &Path, sheets: Vec<(String, DataFrame)>) -> Result<Vec<PathBuf>> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();
    if !matches!(extension.as_str(), "csv" | "parquet") {
        return Err(TextmillError::InvalidConfig(format!(
            "output extension {extension:?} not recognized; use .csv or .parquet"
        )));
    }
    if sheets.is_empty() {
        return Err(TextmillError::InvalidConfig(
            "report has no sheets to write".to_string(),
        ));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| TextmillError::External(e.into()))?;
        }
    }

    let single = sheets.len() == 1;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report")
        .to_string();
    let mut written = Vec::new();
    for (sheet, mut frame) in sheets {
        let target = if single {
            path.to_path_buf()
        } else {
            path.with_file_name(format!("{stem}_{sheet}.{extension}"))
        };
        let file = File::create(&target).map_err(|e| TextmillError::External(e.into()))?;
        match extension.as_str() {
            "csv" => {
                let mut file = file;
                CsvWriter::new(&mut file).finish(&mut frame)?;
            }
            _ => {
                ParquetWriter::new(file).finish(&mut frame)?;
            }
        }
        info!(path = %target.display(), sheet = %sheet, rows = frame.height(), "wrote report sheet");
        written.push(target);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{NamedFrom, Series};

    fn frame() -> DataFrame {
        DataFrame::new(vec![Series::new("doc".into(), vec!["a", "b"])]).unwrap()
    }

    #[test]
    fn single_sheet_uses_the_requested_path() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report.csv");
        let written = write_report(&out, vec![("counts".to_string(), frame())]).unwrap();
        assert_eq!(written, vec![out.clone()]);
        assert!(out.exists());
    }

    #[test]
    fn multiple_sheets_become_sibling_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report.csv");
        let written = write_report(
            &out,
            vec![
                ("counts".to_string(), frame()),
                ("summary".to_string(), frame()),
            ],
        )
        .unwrap();
        assert_eq!(written.len(), 2);
        assert!(dir.path().join("report_counts.csv").exists());
        assert!(dir.path().join("report_summary.csv").exists());
    }

    #[test]
    fn unknown_extension_is_a_configuration_error() {
        let err = write_report(Path::new("out.xlsx"), vec![("s".to_string(), frame())])
            .unwrap_err();
        assert!(matches!(err, TextmillError::InvalidConfig(_)));
    }
}
