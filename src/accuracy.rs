use anyhow::{Context, Result};
use log::warn;
use std::{collections::HashMap, path::Path};

use crate::error::ScoreError;

/// Identifier to label. Later duplicates replace earlier ones.
pub type LabelMap = HashMap<String, String>;

pub fn read_labels<P: AsRef<Path>>(path: P) -> Result<LabelMap> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_path(path)
        .with_context(|| format!("{} does not exist or cannot be opened", path.display()))?;

    let mut labels = HashMap::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("failed to read {}", path.display()))?;
        let mut fields = record.iter().flat_map(str::split_whitespace);

        match (fields.next(), fields.next()) {
            (None, _) => continue,
            (Some(id), Some(label)) => {
                labels.insert(id.to_string(), label.to_string());
            }
            (Some(_), None) => {
                let line = record.position().map_or(0, |pos| pos.line());
                return Err(ScoreError::MalformedLine {
                    path: path.to_path_buf(),
                    line,
                }
                .into());
            }
        }
    }

    Ok(labels)
}

/// Percentage of gold identifiers whose predicted label matches exactly.
pub fn overlap(gold: &LabelMap, predicted: &LabelMap) -> std::result::Result<f64, ScoreError> {
    if gold.len() != predicted.len() {
        return Err(ScoreError::SizeMismatch {
            gold: gold.len(),
            predicted: predicted.len(),
        });
    }
    if gold.is_empty() {
        return Ok(0.0);
    }

    let matches = gold
        .iter()
        .filter(|(id, label)| match predicted.get(id.as_str()) {
            Some(prediction) => prediction == *label,
            None => {
                warn!("No prediction for {}", id);
                false
            }
        })
        .count();

    Ok(matches as f64 / gold.len() as f64 * 100.0)
}

/// Reads both files and scores them.
pub fn check_files<P: AsRef<Path>, Q: AsRef<Path>>(gold_path: P, predicted_path: Q) -> Result<f64> {
    let gold = read_labels(gold_path)?;
    let predicted = read_labels(predicted_path)?;
    Ok(overlap(&gold, &predicted)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn labels(pairs: &[(&str, &str)]) -> LabelMap {
        pairs
            .iter()
            .map(|(id, label)| (id.to_string(), label.to_string()))
            .collect()
    }

    #[test]
    fn half_matching_is_fifty_percent() {
        let gold = labels(&[("doc1", "pos"), ("doc2", "neg")]);
        let predicted = labels(&[("doc1", "pos"), ("doc2", "pos")]);
        assert_eq!(overlap(&gold, &predicted).unwrap(), 50.0);
    }

    #[test]
    fn labels_compare_case_sensitively() {
        let gold = labels(&[("doc1", "Pos")]);
        let predicted = labels(&[("doc1", "pos")]);
        assert_eq!(overlap(&gold, &predicted).unwrap(), 0.0);
    }

    #[test]
    fn size_mismatch_is_an_error() {
        let gold = labels(&[("doc1", "pos"), ("doc2", "neg")]);
        let predicted = labels(&[("doc1", "pos")]);
        assert!(matches!(
            overlap(&gold, &predicted),
            Err(ScoreError::SizeMismatch {
                gold: 2,
                predicted: 1
            })
        ));
    }

    #[test]
    fn missing_identifier_counts_as_miss() {
        let gold = labels(&[("doc1", "pos"), ("doc2", "neg")]);
        let predicted = labels(&[("doc1", "pos"), ("doc3", "neg")]);
        assert_eq!(overlap(&gold, &predicted).unwrap(), 50.0);
    }

    #[test]
    fn reads_tab_and_space_separated_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gold.txt");
        fs::write(&path, "doc1\tpos\ndoc2 neg\n\ndoc3  \t neg\ndoc1\tneg\n").unwrap();

        let read = read_labels(&path).unwrap();
        assert_eq!(read, labels(&[("doc1", "neg"), ("doc2", "neg"), ("doc3", "neg")]));
    }

    #[test]
    fn single_column_line_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gold.txt");
        fs::write(&path, "doc1\tpos\ndoc2\n").unwrap();

        let err = read_labels(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScoreError>(),
            Some(ScoreError::MalformedLine { line: 2, .. })
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let gold = dir.path().join("gold.txt");
        fs::write(&gold, "doc1\tpos\n").unwrap();

        assert!(check_files(&gold, dir.path().join("missing.txt")).is_err());
    }
}
