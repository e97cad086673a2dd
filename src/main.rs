mod browser;
mod classifier;
mod cli;
mod error;
mod extractor;
mod fmt;
mod form;
mod gesture;
mod importer;
mod keypad;
mod models;
mod months;
mod settings;
mod store;
mod tui;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, TrashCommands};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Add {
            name,
            amount,
            date,
            category,
            location,
        } => cli::entry::add(&name, &amount, date.as_deref(), category.as_deref(), location.as_deref()),
        Commands::Edit {
            id,
            name,
            amount,
            date,
            category,
            location,
        } => cli::entry::edit(
            &id,
            name.as_deref(),
            amount.as_deref(),
            date.as_deref(),
            category.as_deref(),
            location.as_deref(),
        ),
        Commands::Recategorize { ids, category } => cli::entry::recategorize(&ids, &category),
        Commands::Delete { ids } => cli::entry::delete(&ids),
        Commands::List { month } => cli::list::list(month.as_deref()),
        Commands::Summary { month } => cli::list::summary(month.as_deref()),
        Commands::Trash { command } => match command {
            TrashCommands::List => cli::trash::list(),
            TrashCommands::Restore { ids } => cli::trash::restore(&ids),
        },
        Commands::Clear { yes } => cli::entry::clear(yes),
        Commands::Import { file } => cli::import::run(&file),
        Commands::Scan { files } => cli::scan::run(&files),
        Commands::Export { output, format } => cli::export::run(output, format),
        Commands::Config {
            data_dir,
            extractor_url,
            token_env,
            currency,
        } => cli::config::run(data_dir, extractor_url, token_env, currency),
        Commands::Browse { month } => cli::browse::run(month.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
