use anyhow::{Context, Result};
use log::info;
use rayon::prelude::*;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::bayes::NaiveBayesClassifier;
use crate::corpus::{list_documents, read_document};

/// One predicted test document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub document: String,
    pub label: String,
}

/// Predicts every file directly under `test_dir`, in file name order.
pub fn predict_directory<P: AsRef<Path>>(
    classifier: &NaiveBayesClassifier,
    test_dir: P,
) -> Result<Vec<Prediction>> {
    let documents = list_documents(test_dir)?;
    info!("Start making predictions for {} documents", documents.len());

    // The model is read-only here, so documents are scored independently.
    documents
        .par_iter()
        .map(|path| -> Result<Prediction> {
            let text = read_document(path).with_context(|| {
                format!("something went wrong while reading test file {}", path.display())
            })?;
            let label = classifier.predict_text(&text)?;
            let document = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            Ok(Prediction {
                document,
                label: label.to_string(),
            })
        })
        .collect()
}

pub type PredictionWriter = csv::Writer<BufWriter<File>>;

/// Creates the predictions file, truncating output from any earlier run.
pub fn create_predictions_file<P: AsRef<Path>>(out_path: P) -> Result<PredictionWriter> {
    let out_path = out_path.as_ref();
    let file = File::create(out_path)
        .with_context(|| format!("failed to create predictions file {}", out_path.display()))?;

    // Identifiers are written raw; the scorer reads them unquoted.
    Ok(csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(BufWriter::new(file)))
}

/// Writes `<document>\t<label>` lines.
pub fn write_predictions<W: Write>(
    writer: &mut csv::Writer<W>,
    predictions: &[Prediction],
) -> Result<()> {
    for prediction in predictions {
        writer.write_record([prediction.document.as_str(), prediction.label.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Truncates `out_path` then fills it with predictions for `test_dir`.
/// If prediction fails the file is left empty.
pub fn predict_to_file<P: AsRef<Path>, Q: AsRef<Path>>(
    classifier: &NaiveBayesClassifier,
    test_dir: P,
    out_path: Q,
) -> Result<usize> {
    let out_path = out_path.as_ref();
    let mut writer = create_predictions_file(out_path)?;

    let predictions = predict_directory(classifier, test_dir)?;
    write_predictions(&mut writer, &predictions)?;

    info!(
        "Wrote {} predictions to {}",
        predictions.len(),
        out_path.display()
    );
    Ok(predictions.len())
}
