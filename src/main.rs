mod client;
mod config;
mod error;
mod glossary_cache;
mod services;
mod startup;
mod state;
mod ui;

use clap::Parser;
use std::fs::File;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::from_cli(config::Cli::parse())?;

    // The terminal belongs to the UI, so logs only go to a file.
    if let Some(path) = &config.log_file {
        env_logger::Builder::new()
            .filter_level(config.log_level())
            .parse_default_env()
            .target(env_logger::Target::Pipe(Box::new(File::create(path)?)))
            .init();
    }

    startup::run(config)?;

    Ok(())
}
