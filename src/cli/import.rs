use std::path::PathBuf;

use chrono::Utc;

use super::{open_store, warn_persist};
use crate::error::{BillError, Result};
use crate::importer::{parse_import_file, Source};
use crate::store::ImportResult;

pub(crate) fn print_result(result: &ImportResult) {
    println!(
        "{} imported, {} skipped (duplicates), {} rejected",
        result.added.len(),
        result.duplicates,
        result.rejected
    );
}

pub fn run(file: &str) -> Result<()> {
    let path = PathBuf::from(file);
    let content = std::fs::read_to_string(&path)
        .map_err(|e| BillError::ImportFormat(format!("cannot read {}: {e}", path.display())))?;
    let candidates = parse_import_file(&content)?;

    let mut store = open_store()?;
    let result = store.merge(&candidates, Source::File, Utc::now())?;
    warn_persist(&mut store);
    print_result(&result);
    Ok(())
}
