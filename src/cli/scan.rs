use crate::error::Result;

#[cfg(feature = "extract")]
pub fn run(files: &[String]) -> Result<()> {
    use std::path::PathBuf;

    use chrono::Utc;
    use colored::Colorize;

    use super::import::print_result;
    use super::{open_store, warn_persist};
    use crate::error::BillError;
    use crate::extractor::{extract_all, HttpExtractor};
    use crate::importer::Source;
    use crate::settings::load_settings;

    let settings = load_settings();
    let extractor = HttpExtractor::new(&settings.extractor_url, settings.extractor_token())?;
    let paths: Vec<PathBuf> = files.iter().map(PathBuf::from).collect();

    // Operation start time; shared by every record this scan creates.
    let started = Utc::now();
    println!("Scanning {} file(s)...", paths.len());
    let report = extract_all(&extractor, &paths);
    for (file, message) in &report.failures {
        eprintln!("{} {file}: {message}", "Failed:".red().bold());
    }
    if report.candidates.is_empty() {
        return Err(if report.failures.len() == paths.len() {
            BillError::Extraction("no file could be processed".to_string())
        } else {
            BillError::NoValidTransactions
        });
    }

    let mut store = open_store()?;
    let result = store.merge(&report.candidates, Source::Extraction, started)?;
    warn_persist(&mut store);
    print_result(&result);
    Ok(())
}

#[cfg(not(feature = "extract"))]
pub fn run(_files: &[String]) -> Result<()> {
    Err(crate::error::BillError::Extraction(
        "this build has no extraction support (enable the `extract` feature)".to_string(),
    ))
}
