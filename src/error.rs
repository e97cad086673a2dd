use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "extract")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No valid transactions found")]
    NoValidTransactions,

    #[error("Import format error: {0}")]
    ImportFormat(String),

    #[error("Unknown transaction: {0}")]
    UnknownTransaction(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, BillError>;
