pub mod browse;
pub mod config;
pub mod entry;
pub mod export;
pub mod import;
pub mod list;
pub mod scan;
pub mod trash;

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use crate::error::{BillError, Result};
use crate::settings::get_data_dir;
use crate::store::{JsonDirStorage, Store};

/// Open the store in the configured data directory.
pub(crate) fn open_store() -> Result<Store> {
    let dir = get_data_dir();
    std::fs::create_dir_all(&dir)?;
    Ok(Store::open(Box::new(JsonDirStorage::new(dir)), Utc::now()))
}

/// Print a warning if the last mutation could not be written to disk.
pub(crate) fn warn_persist(store: &mut Store) {
    if let Some(e) = store.take_persist_error() {
        eprintln!("{} changes were not saved: {e}", "Warning:".yellow().bold());
    }
}

/// Expand id prefixes (as shown by `list`) to full transaction ids.
pub(crate) fn resolve_ids<'a, I>(known: I, wanted: &[String]) -> Result<Vec<String>>
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    let mut resolved = Vec::with_capacity(wanted.len());
    for prefix in wanted {
        let prefix = prefix.trim();
        let matches: Vec<&str> = known
            .clone()
            .into_iter()
            .filter(|id| !prefix.is_empty() && id.starts_with(prefix))
            .collect();
        match matches.as_slice() {
            [one] => resolved.push(one.to_string()),
            [] => return Err(BillError::UnknownTransaction(prefix.to_string())),
            _ => {
                return Err(BillError::Other(format!(
                    "id prefix '{prefix}' matches {} transactions",
                    matches.len()
                )))
            }
        }
    }
    Ok(resolved)
}

pub(crate) fn parse_category(raw: &str) -> Result<crate::models::Category> {
    crate::models::Category::parse(raw).ok_or_else(|| BillError::UnknownCategory(raw.to_string()))
}

#[derive(Parser)]
#[command(name = "billfold", about = "Receipt-driven personal bill tracker.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a transaction by hand.
    Add {
        /// Merchant or description
        #[arg(long)]
        name: String,
        /// Amount; `+`/`-` expressions are evaluated, e.g. 12+3.5-1
        #[arg(long, allow_hyphen_values = true)]
        amount: String,
        /// Date and time: YYYY-MM-DDTHH:MM (default: now)
        #[arg(long)]
        date: Option<String>,
        /// Category label or English name (default: guessed from the name, else Other)
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Change fields of an existing transaction.
    Edit {
        /// Transaction id or unique prefix
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// New location; pass an empty string to remove it
        #[arg(long)]
        location: Option<String>,
    },
    /// Set the category of one or more transactions.
    Recategorize {
        /// Transaction ids or unique prefixes
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long)]
        category: String,
    },
    /// Move transactions to the trash (kept for 3 days).
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// List transactions, newest first.
    List {
        /// Month filter: YYYY-MM
        #[arg(long)]
        month: Option<String>,
    },
    /// Spending total and per-category breakdown for a month.
    Summary {
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Inspect or restore deleted transactions.
    Trash {
        #[command(subcommand)]
        command: TrashCommands,
    },
    /// Delete every transaction permanently.
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Import a JSON array of transactions.
    Import {
        /// Path to the JSON file
        file: String,
    },
    /// Extract transactions from receipts, statements or notes.
    Scan {
        /// Image, PDF or text files
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Export all transactions.
    Export {
        /// Output path (default: <data_dir>/exports/billfold-YYYYMMDD-HHMMSS.<ext>)
        #[arg(long)]
        output: Option<String>,
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
    },
    /// Show or change settings.
    Config {
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Extraction service endpoint
        #[arg(long = "extractor-url")]
        extractor_url: Option<String>,
        /// Environment variable holding the extraction API token
        #[arg(long = "token-env")]
        token_env: Option<String>,
        #[arg(long)]
        currency: Option<String>,
    },
    /// Browse months interactively.
    Browse {
        /// Month to open: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TrashCommands {
    /// List deleted transactions.
    List,
    /// Restore deleted transactions.
    Restore {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}
