use anyhow::Result;
use log::LevelFilter;

use textbayes::config::{cli, RunConfig};
use textbayes::{accuracy, corpus, predictions};

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("TEXTBAYES_LOG", "error,textbayes=info"))
        .init();

    let config = RunConfig::from_matches(&cli().get_matches())?;

    let classifier =
        corpus::train_from_directory(&config.training_corpus_directory, config.smoothing)?;

    predictions::predict_to_file(
        &classifier,
        &config.test_set_directory,
        &config.predictions,
    )?;

    if let Some(keys) = &config.keys {
        let overlap = accuracy::check_files(keys, &config.predictions)?;
        println!("The overlap between the gold list and the predicted list is {overlap:?}%");
    }

    Ok(())
}
