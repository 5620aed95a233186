mod cli;
mod error;
mod fmt;
mod loader;
mod models;
mod normalizer;
#[cfg(feature = "pdf")]
mod pdf;
mod reports;
mod session;
mod settings;
mod suggester;

use std::env;
use std::sync::OnceLock;

use clap::Parser;
use log::LevelFilter;

use cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sheetdash", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Columns { file } => cli::columns::run(&file),
        Commands::Companies { file, mapping } => cli::companies::run(&file, &mapping),
        Commands::Report {
            file,
            mapping,
            company,
            json,
            preview,
        } => cli::report::run(&file, &mapping, company, json, preview),
        #[cfg(feature = "pdf")]
        Commands::Export {
            file,
            mapping,
            company,
            output,
            detailed,
        } => cli::export::run(&file, &mapping, company, output, detailed).map(|_| ()),
        Commands::Demo { output, year } => cli::demo::run(output, year),
        Commands::Config { command } => cli::config::run(command),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
