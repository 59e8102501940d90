//! Corpus input: plain-text files and CSV tables into (document id,
//! text) pairs.

use std::path::{Path, PathBuf};

use anyhow::Context;
use indexmap::IndexMap;
use tracing::info;
use walkdir::WalkDir;

use crate::error::{Result, TextmillError};

/// A corpus of raw documents with unique string ids, in input order.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub names: Vec<String>,
    pub texts: Vec<String>,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn push(&mut self, name: String, text: String) -> Result<()> {
        if self.names.contains(&name) {
            return Err(TextmillError::DuplicateDocName(name));
        }
        self.names.push(name);
        self.texts.push(text);
        Ok(())
    }
}

/// Read documents from the given paths. Directories are walked for
/// `.txt` files (file stem becomes the document id); `.csv` files
/// contribute one document per row, with `text_col` as the text column
/// and `label_col` (or the row number) as the id.
pub fn read_corpus(
    paths: &[PathBuf],
    label_col: Option<&str>,
    text_col: &str,
) -> Result<Corpus> {
    let mut corpus = Corpus::default();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(|e| TextmillError::External(e.into()))?;
                if entry.path().extension().and_then(|s| s.to_str()) == Some("txt") {
                    read_txt(entry.path(), &mut corpus)?;
                }
            }
            continue;
        }
        match path.extension().and_then(|s| s.to_str()) {
            Some("txt") => read_txt(path, &mut corpus)?,
            Some("csv") => read_csv(path, label_col, text_col, &mut corpus)?,
            other => {
                return Err(TextmillError::InvalidConfig(format!(
                    "unsupported input extension {:?} for {}",
                    other.unwrap_or(""),
                    path.display()
                )))
            }
        }
    }
    if corpus.is_empty() {
        return Err(TextmillError::InvalidConfig(
            "no input documents found".to_string(),
        ));
    }
    info!(documents = corpus.len(), "loaded corpus");
    Ok(corpus)
}

fn read_txt(path: &Path, corpus: &mut Corpus) -> Result<()> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))
        .map_err(TextmillError::External)?;
    corpus.push(name, text)
}

fn read_csv(
    path: &Path,
    label_col: Option<&str>,
    text_col: &str,
    corpus: &mut Corpus,
) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening {}", path.display()))
        .map_err(TextmillError::External)?;
    let headers = reader
        .headers()
        .map_err(|e| TextmillError::External(e.into()))?
        .clone();
    let columns: IndexMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| (name, i))
        .collect();
    let text_idx = *columns
        .get(text_col)
        .ok_or_else(|| TextmillError::lookup("text column", text_col))?;
    let label_idx = match label_col {
        Some(col) => Some(
            *columns
                .get(col)
                .ok_or_else(|| TextmillError::lookup("label column", col))?,
        ),
        None => None,
    };
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("rows")
        .to_string();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| TextmillError::External(e.into()))?;
        let text = record.get(text_idx).unwrap_or("").to_string();
        let name = match label_idx {
            Some(idx) => record.get(idx).unwrap_or("").to_string(),
            None => format!("{stem}:{row_idx}"),
        };
        corpus.push(name, text)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn csv_rows_become_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "title,text").unwrap();
        writeln!(file, "one,first text").unwrap();
        writeln!(file, "two,second text").unwrap();
        drop(file);

        let corpus = read_corpus(&[path], Some("title"), "text").unwrap();
        assert_eq!(corpus.names, vec!["one", "two"]);
        assert_eq!(corpus.texts[1], "second text");
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "title,text").unwrap();
        writeln!(file, "same,a").unwrap();
        writeln!(file, "same,b").unwrap();
        drop(file);

        let err = read_corpus(&[path], Some("title"), "text").unwrap_err();
        assert!(matches!(err, TextmillError::DuplicateDocName(_)));
    }

    #[test]
    fn txt_files_use_their_stem_as_id() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alpha.txt"), "alpha text").unwrap();
        std::fs::write(dir.path().join("beta.txt"), "beta text").unwrap();

        let corpus = read_corpus(&[dir.path().to_path_buf()], None, "text").unwrap();
        assert_eq!(corpus.names, vec!["alpha", "beta"]);
    }
}
