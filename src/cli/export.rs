use std::path::{Path, PathBuf};

use super::{open_store, ExportFormat};
use crate::error::Result;
use crate::models::Transaction;
use crate::settings::get_data_dir;

pub fn write_json(path: &Path, transactions: &[Transaction]) -> Result<()> {
    let json = serde_json::to_string_pretty(transactions)?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn write_csv(path: &Path, transactions: &[Transaction]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["date", "name", "category", "amount", "location"])?;
    for t in transactions {
        let amount = format!("{:.2}", t.amount);
        writer.write_record([
            t.date.as_str(),
            t.name.as_str(),
            t.category.label(),
            amount.as_str(),
            t.location.as_deref().unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn run(output: Option<String>, format: ExportFormat) -> Result<()> {
    let store = open_store()?;

    let dest_path = match output {
        Some(p) => PathBuf::from(p),
        None => {
            let exports_dir = get_data_dir().join("exports");
            std::fs::create_dir_all(&exports_dir)?;
            let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
            exports_dir.join(format!("billfold-{stamp}.{}", format.extension()))
        }
    };

    match format {
        ExportFormat::Json => write_json(&dest_path, store.transactions())?,
        ExportFormat::Csv => write_csv(&dest_path, store.transactions())?,
    }
    tracing::info!(path = %dest_path.display(), count = store.transactions().len(), "exported");
    println!(
        "Exported {} transaction(s) to {}",
        store.transactions().len(),
        dest_path.display()
    );
    Ok(())
}
