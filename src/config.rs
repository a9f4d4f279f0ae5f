use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, ValueHint};
use std::path::PathBuf;

pub const DEFAULT_PREDICTIONS_FILE: &str = "predictions.txt";
pub const DEFAULT_SMOOTHING: u64 = 1;

/// Settings for one train-predict-score run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub training_corpus_directory: PathBuf,
    pub test_set_directory: PathBuf,
    pub keys: Option<PathBuf>,
    pub predictions: PathBuf,
    pub smoothing: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            training_corpus_directory: PathBuf::new(),
            test_set_directory: PathBuf::new(),
            keys: None,
            predictions: PathBuf::from(DEFAULT_PREDICTIONS_FILE),
            smoothing: DEFAULT_SMOOTHING,
        }
    }
}

/// Command line of the `textbayes` binary.
pub fn cli() -> Command {
    Command::new("textbayes")
        .version(clap::crate_version!())
        .about("Train a Naive Bayes text classifier and label a test set")
        .arg(
            Arg::new("training_corpus_directory")
                .long("training-corpus-directory")
                .required(true)
                .help("Directory with one subdirectory of documents per label")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("test_set_directory")
                .long("test-set-directory")
                .required(true)
                .help("Directory with the unlabeled test documents")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("keys")
                .long("keys")
                .help("File holding the true labels for the test set")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("predictions")
                .short('o')
                .long("predictions")
                .help("Where to write the tab-separated predictions")
                .default_value(DEFAULT_PREDICTIONS_FILE)
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("smoothing")
                .short('k')
                .long("smoothing")
                .help("Additive smoothing constant")
                .default_value("1")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

impl RunConfig {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            training_corpus_directory: matches
                .get_one::<PathBuf>("training_corpus_directory")
                .cloned()
                .context("--training-corpus-directory is required")?,
            test_set_directory: matches
                .get_one::<PathBuf>("test_set_directory")
                .cloned()
                .context("--test-set-directory is required")?,
            keys: matches.get_one::<PathBuf>("keys").cloned(),
            predictions: matches
                .get_one::<PathBuf>("predictions")
                .cloned()
                .unwrap_or(defaults.predictions),
            smoothing: matches
                .get_one::<u64>("smoothing")
                .copied()
                .unwrap_or(defaults.smoothing),
        })
    }
}
