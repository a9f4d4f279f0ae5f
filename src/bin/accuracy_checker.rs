use anyhow::{Context, Result};
use clap::{Arg, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use textbayes::accuracy;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("TEXTBAYES_LOG", "error,textbayes=info"))
        .init();

    let matches = Command::new("accuracy_checker")
        .version(clap::crate_version!())
        .about("Report how many predicted labels match the gold labels")
        .arg(
            Arg::new("gold")
                .help("Two-column file of identifiers and true labels")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("predicted")
                .help("Two-column file of identifiers and predicted labels")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .get_matches();

    let gold = matches
        .get_one::<PathBuf>("gold")
        .context("gold file is required")?;
    let predicted = matches
        .get_one::<PathBuf>("predicted")
        .context("predicted file is required")?;

    let overlap = accuracy::check_files(gold, predicted)?;
    println!("The overlap between the gold list and the predicted list is {overlap:?}%");

    Ok(())
}
