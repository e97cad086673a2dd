use chrono::Utc;
use colored::Colorize;

use super::{open_store, parse_category, resolve_ids, warn_persist};
use crate::classifier::classify;
use crate::error::{BillError, Result};
use crate::fmt::money;
use crate::form::TransactionForm;
use crate::keypad::AmountKeypad;
use crate::models::Category;
use crate::settings::load_settings;

fn now_local() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M").to_string()
}

pub fn add(
    name: &str,
    amount: &str,
    date: Option<&str>,
    category: Option<&str>,
    location: Option<&str>,
) -> Result<()> {
    let mut form = TransactionForm::new(&date.map(str::to_string).unwrap_or_else(now_local));
    form.name = name.to_string();
    form.amount = AmountKeypad::new(amount);
    form.category = match category {
        Some(raw) => parse_category(raw)?,
        None => classify(name).unwrap_or(Category::Other),
    };
    form.location = location.unwrap_or_default().to_string();
    let draft = form.done().map_err(|e| BillError::Other(e.to_string()))?;

    let mut store = open_store()?;
    let t = store.add(draft, Utc::now());
    warn_persist(&mut store);

    let symbol = load_settings().currency_symbol;
    println!(
        "Added {} {} {} [{}]",
        t.id[..8.min(t.id.len())].dimmed(),
        t.name,
        money(&symbol, t.amount),
        t.category
    );
    Ok(())
}

pub fn edit(
    id: &str,
    name: Option<&str>,
    amount: Option<&str>,
    date: Option<&str>,
    category: Option<&str>,
    location: Option<&str>,
) -> Result<()> {
    let mut store = open_store()?;
    let ids = resolve_ids(store.transactions().iter().map(|t| t.id.as_str()), &[id.to_string()])?;
    let id = &ids[0];
    let existing = store
        .get(id)
        .ok_or_else(|| BillError::UnknownTransaction(id.clone()))?;

    let mut form = TransactionForm::from_transaction(existing);
    if let Some(name) = name {
        form.name = name.to_string();
    }
    if let Some(amount) = amount {
        form.amount = AmountKeypad::new(amount);
    }
    if let Some(date) = date {
        form.date = date.to_string();
    }
    if let Some(raw) = category {
        form.category = parse_category(raw)?;
    }
    if let Some(location) = location {
        form.location = location.to_string();
    }
    let draft = form.done().map_err(|e| BillError::Other(e.to_string()))?;

    let t = store.edit(id, draft, Utc::now())?;
    warn_persist(&mut store);
    let symbol = load_settings().currency_symbol;
    println!("Updated {} {} {} [{}]", t.date, t.name, money(&symbol, t.amount), t.category);
    Ok(())
}

pub fn recategorize(ids: &[String], category: &str) -> Result<()> {
    let category = parse_category(category)?;
    let mut store = open_store()?;
    let ids = resolve_ids(store.transactions().iter().map(|t| t.id.as_str()), ids)?;
    let changed = store.set_category(&ids, category, Utc::now());
    warn_persist(&mut store);
    println!("{changed} transaction(s) moved to {category}");
    Ok(())
}

pub fn delete(ids: &[String]) -> Result<()> {
    let mut store = open_store()?;
    let ids = resolve_ids(store.transactions().iter().map(|t| t.id.as_str()), ids)?;
    let deleted = store.delete(&ids, Utc::now());
    warn_persist(&mut store);
    println!("{deleted} transaction(s) moved to trash (restorable for 3 days)");
    Ok(())
}

pub fn clear(yes: bool) -> Result<()> {
    if !yes {
        return Err(BillError::Other(
            "this deletes every transaction permanently; re-run with --yes".to_string(),
        ));
    }
    let mut store = open_store()?;
    let count = store.clear_all(Utc::now());
    warn_persist(&mut store);
    println!("{} {count} transaction(s) removed", "Cleared.".red().bold());
    Ok(())
}
