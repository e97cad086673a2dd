use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use super::open_store;
use crate::error::{BillError, Result};
use crate::fmt::{money, short_date};
use crate::models::Transaction;
use crate::months::{in_month, month_key, parse_month, summarize};
use crate::settings::load_settings;

pub(crate) fn month_arg(month: Option<&str>) -> Result<Option<String>> {
    month
        .map(|raw| parse_month(raw).ok_or_else(|| BillError::Other(format!("invalid month '{raw}', expected YYYY-MM"))))
        .transpose()
}

pub(crate) fn transaction_table(rows: &[&Transaction], symbol: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Name", "Category", "Amount", "Location"]);
    for t in rows {
        table.add_row(vec![
            Cell::new(&t.id[..8.min(t.id.len())]),
            Cell::new(short_date(&t.date)),
            Cell::new(&t.name),
            Cell::new(t.category),
            Cell::new(money(symbol, t.amount)).set_alignment(CellAlignment::Right),
            Cell::new(t.location.as_deref().unwrap_or_default()),
        ]);
    }
    table
}

pub fn list(month: Option<&str>) -> Result<()> {
    let month = month_arg(month)?;
    let store = open_store()?;
    let symbol = load_settings().currency_symbol;

    let rows: Vec<&Transaction> = match &month {
        Some(m) => in_month(store.transactions(), m),
        None => store.transactions().iter().collect(),
    };
    if rows.is_empty() {
        println!("No transactions.");
        return Ok(());
    }

    let total: f64 = rows.iter().map(|t| t.amount).sum();
    let title = month.unwrap_or_else(|| "All transactions".to_string());
    println!("{}\n{}", title.bold(), transaction_table(&rows, &symbol));
    println!("{} transaction(s), {}", rows.len(), money(&symbol, total));
    Ok(())
}

pub fn summary(month: Option<&str>) -> Result<()> {
    let month = month_arg(month)?.unwrap_or_else(|| month_key(chrono::Local::now().date_naive()));
    let store = open_store()?;
    let symbol = load_settings().currency_symbol;
    let summary = summarize(store.transactions(), &month);

    let mut table = Table::new();
    table.set_header(vec!["Category", "Amount", "Share"]);
    for (category, amount) in &summary.by_category {
        let share = if summary.total > 0.0 { amount / summary.total * 100.0 } else { 0.0 };
        table.add_row(vec![
            Cell::new(category),
            Cell::new(money(&symbol, *amount)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{share:.1}%")).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{}", format!("Spending {}", summary.month).bold());
    if summary.count > 0 {
        println!("{table}");
    }
    println!(
        "Total: {} across {} transaction(s)",
        money(&symbol, summary.total).green().bold(),
        summary.count
    );
    Ok(())
}
