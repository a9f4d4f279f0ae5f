use anyhow::{Context, Result};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::bayes::NaiveBayesClassifier;
use crate::counts::{tokenize, CountStore};

/// Reads a document as UTF-8, replacing invalid bytes.
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let bytes =
        fs::read(path).with_context(|| format!("document {} is unreadable", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Regular files directly under `dir`, sorted by name.
pub fn list_documents<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("cannot list directory {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Label subdirectories under the corpus root, sorted by name.
fn list_labels(corpus_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut labels = Vec::new();
    for entry in fs::read_dir(corpus_dir)
        .with_context(|| format!("cannot list corpus directory {}", corpus_dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            warn!("Skipping {}: not a label directory", path.display());
            continue;
        }
        labels.push((entry.file_name().to_string_lossy().into_owned(), path));
    }
    labels.sort();
    Ok(labels)
}

/// Counts every document of one label directory into a fresh store.
pub fn count_label_directory(label: &str, dir: &Path) -> Result<CountStore> {
    let mut counts = CountStore::new();
    let documents = list_documents(dir)?;

    for path in &documents {
        let text = read_document(path)
            .with_context(|| format!("it seems that the training file for label {label} is damaged"))?;
        counts.record_document_label(label);
        counts.record_tokens(tokenize(&text), label);
    }

    debug!(
        "Label {}: {} documents, {} tokens",
        label,
        documents.len(),
        counts.total_tokens(label)
    );
    Ok(counts)
}

/// Counts a directory-per-label corpus. Labels are counted in parallel and
/// merged afterwards; the result matches sequential counting.
pub fn count_corpus<P: AsRef<Path>>(corpus_dir: P) -> Result<CountStore> {
    let labels = list_labels(corpus_dir.as_ref())?;
    info!("Counting {} labels", labels.len());

    labels
        .par_iter()
        .map(|(label, dir)| {
            info!("Training on label {}", label);
            count_label_directory(label, dir)
        })
        .try_reduce(CountStore::new, |mut acc, partition| {
            acc.merge(partition);
            Ok(acc)
        })
}

/// Trains, smooths and normalizes a classifier over `corpus_dir`.
pub fn train_from_directory<P: AsRef<Path>>(
    corpus_dir: P,
    smoothing: u64,
) -> Result<NaiveBayesClassifier> {
    let corpus_dir = corpus_dir.as_ref();
    info!("Starting training on {}", corpus_dir.display());

    let counts = count_corpus(corpus_dir)?;
    let mut classifier = NaiveBayesClassifier::from_counts(counts);

    info!("Starting to smooth and normalise");
    classifier
        .finish_training(smoothing)
        .with_context(|| format!("no trainable documents in {}", corpus_dir.display()))?;

    info!("Finished training");
    Ok(classifier)
}
