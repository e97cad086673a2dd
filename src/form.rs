use std::fmt;

use crate::keypad::{round2, AmountKeypad};
use crate::models::{Category, Draft, Transaction};

/// Manual entry form. `done` is the submit action.
#[derive(Debug, Clone)]
pub struct TransactionForm {
    pub name: String,
    pub amount: AmountKeypad,
    pub date: String,
    pub category: Category,
    pub location: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldErrors {
    pub name: Option<&'static str>,
    pub amount: Option<&'static str>,
    pub date: Option<&'static str>,
}

impl FieldErrors {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.amount.is_none() && self.date.is_none()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [("name", self.name), ("amount", self.amount), ("date", self.date)]
            .into_iter()
            .filter_map(|(field, msg)| msg.map(|m| format!("{field}: {m}")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl TransactionForm {
    pub fn new(date: &str) -> Self {
        Self {
            name: String::new(),
            amount: AmountKeypad::default(),
            date: date.to_string(),
            category: Category::Other,
            location: String::new(),
        }
    }

    /// Prefill from an existing transaction for editing.
    pub fn from_transaction(t: &Transaction) -> Self {
        Self {
            name: t.name.clone(),
            amount: AmountKeypad::new(&format!("{}", t.amount)),
            date: t.date.clone(),
            category: t.category,
            location: t.location.clone().unwrap_or_default(),
        }
    }

    /// Evaluate the amount and validate required fields.
    pub fn done(&self) -> Result<Draft, FieldErrors> {
        let name = self.name.trim();
        let date = self.date.trim();
        let amount = round2(self.amount.value());

        let errors = FieldErrors {
            name: name.is_empty().then_some("required"),
            amount: (amount <= 0.0).then_some("must be greater than zero"),
            date: date.is_empty().then_some("required"),
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        let location = self.location.trim();
        Ok(Draft {
            name: name.to_string(),
            category: self.category,
            amount,
            date: date.to_string(),
            location: (!location.is_empty()).then(|| location.to_string()),
        })
    }
}
