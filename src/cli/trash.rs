use chrono::{Duration, Utc};
use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use super::{open_store, resolve_ids, warn_persist};
use crate::error::Result;
use crate::fmt::{money, short_date};
use crate::settings::load_settings;
use crate::store::TRASH_RETENTION_DAYS;

pub fn list() -> Result<()> {
    let store = open_store()?;
    if store.trash().is_empty() {
        println!("Trash is empty.");
        return Ok(());
    }
    let symbol = load_settings().currency_symbol;
    let now = Utc::now();

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Name", "Category", "Amount", "Expires in"]);
    for item in store.trash() {
        let t = &item.transaction;
        let left = item.deleted_at + Duration::days(TRASH_RETENTION_DAYS) - now;
        table.add_row(vec![
            Cell::new(&t.id[..8.min(t.id.len())]),
            Cell::new(short_date(&t.date)),
            Cell::new(&t.name),
            Cell::new(t.category),
            Cell::new(money(&symbol, t.amount)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{}h", left.num_hours().max(0))),
        ]);
    }
    println!("Trash\n{table}");
    Ok(())
}

pub fn restore(ids: &[String]) -> Result<()> {
    let mut store = open_store()?;
    let ids = resolve_ids(store.trash().iter().map(|d| d.transaction.id.as_str()), ids)?;
    let result = store.restore(&ids, Utc::now());
    warn_persist(&mut store);
    println!("{} transaction(s) restored", result.restored);
    if result.skipped > 0 {
        println!(
            "{} {} skipped: an identical transaction already exists",
            "Note:".yellow(),
            result.skipped
        );
    }
    Ok(())
}
