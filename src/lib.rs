//! Multinomial Naive Bayes text classification.
pub mod accuracy;
pub mod bayes;
pub mod config;
pub mod corpus;
pub mod counts;
pub mod error;
pub mod predictions;

pub use bayes::{ModelState, NaiveBayesClassifier};
pub use counts::{tokenize, CountStore, Label, Token};
pub use error::{BayesError, ScoreError};
