use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::models::{Category, Transaction};

pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Months that have data, plus the current month, oldest first.
pub fn available_months(transactions: &[Transaction], today: NaiveDate) -> Vec<String> {
    let mut months: BTreeSet<String> = transactions
        .iter()
        .map(|t| t.month().to_string())
        .filter(|m| is_month(m))
        .collect();
    months.insert(month_key(today));
    months.into_iter().collect()
}

fn is_month(raw: &str) -> bool {
    parse_month(raw).as_deref() == Some(raw)
}

/// Normalize a `YYYY-MM` argument; `2024-6` becomes `2024-06`.
pub fn parse_month(raw: &str) -> Option<String> {
    NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
        .ok()
        .map(month_key)
}

pub fn in_month<'a>(transactions: &'a [Transaction], month: &str) -> Vec<&'a Transaction> {
    transactions.iter().filter(|t| t.month() == month).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    pub month: String,
    pub total: f64,
    pub count: usize,
    /// Category totals, largest first.
    pub by_category: Vec<(Category, f64)>,
}

pub fn summarize(transactions: &[Transaction], month: &str) -> MonthSummary {
    let rows = in_month(transactions, month);
    let mut totals: BTreeMap<Category, f64> = BTreeMap::new();
    for t in &rows {
        *totals.entry(t.category).or_default() += t.amount;
    }
    let mut by_category: Vec<(Category, f64)> = totals.into_iter().collect();
    by_category.sort_by(|a, b| b.1.total_cmp(&a.1));
    MonthSummary {
        month: month.to_string(),
        total: rows.iter().map(|t| t.amount).sum(),
        count: rows.len(),
        by_category,
    }
}
