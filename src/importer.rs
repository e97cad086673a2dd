use std::collections::HashSet;

use serde_json::Value;

use crate::classifier::reclassify;
use crate::error::{BillError, Result};
use crate::models::{Category, DedupKey, Draft, Transaction};

// ---------------------------------------------------------------------------
// Candidate parsing
// ---------------------------------------------------------------------------

/// Where a batch of candidates came from. The two paths validate slightly
/// differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Line items returned by the extraction service.
    Extraction,
    /// A user-supplied JSON import file.
    File,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    NotAnObject,
    MissingName,
    MissingDate,
    InvalidAmount,
    InvalidCategory(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Accepted(Draft),
    Rejected(Rejection),
}

/// Parse an amount from a JSON number or numeric string. The sign is dropped;
/// zero, non-finite and unparseable values are `None`.
pub fn parse_amount(value: &Value) -> Option<f64> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !matches!(c, ',' | '¥' | '￥' | '$' | '€' | '£') && !c.is_whitespace())
                .collect();
            cleaned.parse::<f64>().ok()?
        }
        _ => return None,
    };
    let amount = raw.abs();
    (amount.is_finite() && amount > 0.0).then_some(amount)
}

fn text_field<'a>(obj: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Validate a single candidate object.
pub fn parse_candidate(value: &Value, source: Source) -> Parsed {
    let Some(obj) = value.as_object() else {
        return Parsed::Rejected(Rejection::NotAnObject);
    };

    let Some(name) = text_field(obj, "name") else {
        return Parsed::Rejected(Rejection::MissingName);
    };

    let date = match text_field(obj, "date") {
        Some(d) if source == Source::File => d.chars().take(16).collect::<String>(),
        Some(d) => d.to_string(),
        None => return Parsed::Rejected(Rejection::MissingDate),
    };

    let Some(amount) = obj.get("amount").and_then(parse_amount) else {
        return Parsed::Rejected(Rejection::InvalidAmount);
    };

    let supplied = text_field(obj, "category");
    let parsed_category = supplied.and_then(Category::parse);
    let category = match reclassify(name, parsed_category) {
        Some(c) => c,
        None => match (source, supplied) {
            (Source::File, Some(raw)) => {
                return Parsed::Rejected(Rejection::InvalidCategory(raw.to_string()))
            }
            _ => Category::Other,
        },
    };

    let location = text_field(obj, "location").map(str::to_string);

    Parsed::Accepted(Draft {
        name: name.to_string(),
        category,
        amount,
        date,
        location,
    })
}

// ---------------------------------------------------------------------------
// Merge planning
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MergePlan {
    pub accepted: Vec<Draft>,
    pub rejected: usize,
    pub duplicates: usize,
}

/// Validate and de-duplicate a batch against the stored keys. Duplicates within
/// the batch are dropped as well; the first occurrence wins.
pub fn plan_merge(candidates: &[Value], source: Source, existing: &[Transaction]) -> MergePlan {
    let mut seen: HashSet<DedupKey> = existing.iter().map(Transaction::dedup_key).collect();
    let mut plan = MergePlan::default();

    for candidate in candidates {
        match parse_candidate(candidate, source) {
            Parsed::Rejected(reason) => {
                tracing::debug!(?reason, "candidate rejected");
                plan.rejected += 1;
            }
            Parsed::Accepted(draft) => {
                if seen.insert(draft.dedup_key()) {
                    plan.accepted.push(draft);
                } else {
                    plan.duplicates += 1;
                }
            }
        }
    }
    plan
}

/// Parse the contents of an import file into its candidate list.
pub fn parse_import_file(content: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| BillError::ImportFormat(format!("not valid JSON: {e}")))?;
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(BillError::ImportFormat(
            "expected a JSON array of transactions".to_string(),
        )),
    }
}

/// Pull the candidate list out of an extraction response: either a bare array
/// or an object carrying a `transactions` array.
pub fn extraction_candidates(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => match obj.remove("transactions") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(BillError::Extraction(
                "response has no transactions array".to_string(),
            )),
        },
        _ => Err(BillError::Extraction(
            "response is not a JSON array".to_string(),
        )),
    }
}
