use std::path::PathBuf;

use thiserror::Error;

use crate::bayes::ModelState;

#[derive(Debug, Error, PartialEq)]
pub enum BayesError {
    /// Prediction requested on a model that never saw a training document.
    #[error("model has not been trained")]
    ModelNotTrained,

    /// Operation called out of order, e.g. normalizing before smoothing.
    #[error("cannot {operation}: model is {found:?}, expected {expected}")]
    InvalidState {
        operation: &'static str,
        expected: &'static str,
        found: ModelState,
    },

    #[error("smoothing constant must be positive, got {0}")]
    InvalidSmoothing(u64),
}

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error(
        "the lists are of different size (gold: {gold}, predicted: {predicted}); \
         only equally sized lists can be compared"
    )]
    SizeMismatch { gold: usize, predicted: usize },

    #[error("{}: line {line} needs an identifier and a label", .path.display())]
    MalformedLine { path: PathBuf, line: u64 },
}

pub type Result<T> = std::result::Result<T, BayesError>;
