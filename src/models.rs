use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BillError;

/// Closed set of spending categories. Persisted as the Chinese display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Entertainment,
    Home,
    Medical,
    Education,
    Transfer,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Entertainment,
        Category::Home,
        Category::Medical,
        Category::Education,
        Category::Transfer,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Food => "餐饮",
            Self::Transport => "交通",
            Self::Shopping => "购物",
            Self::Entertainment => "娱乐",
            Self::Home => "居家",
            Self::Medical => "医疗",
            Self::Education => "教育",
            Self::Transfer => "转账",
            Self::Other => "其他",
        }
    }

    pub fn english(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Shopping => "Shopping",
            Self::Entertainment => "Entertainment",
            Self::Home => "Home",
            Self::Medical => "Medical",
            Self::Education => "Education",
            Self::Transfer => "Transfer",
            Self::Other => "Other",
        }
    }

    /// Accepts the display label or the English name (case-insensitive).
    pub fn parse(raw: &str) -> Option<Category> {
        let raw = raw.trim();
        Self::ALL
            .iter()
            .find(|c| c.label() == raw || c.english().eq_ignore_ascii_case(raw))
            .copied()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for Category {
    type Error = BillError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Category::parse(&value).ok_or(BillError::UnknownCategory(value))
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.label().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub amount: f64,
    /// `YYYY-MM-DDTHH:mm`
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl Transaction {
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(&self.name, &self.date, self.amount)
    }

    /// `YYYY-MM` prefix of the transaction date.
    pub fn month(&self) -> &str {
        self.date.get(..7).unwrap_or(&self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedItem {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub deleted_at: DateTime<Utc>,
}

/// Identity of a transaction for merge purposes: exact `(name, date, amount)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    name: String,
    date: String,
    amount_bits: u64,
}

impl DedupKey {
    pub fn new(name: &str, date: &str, amount: f64) -> Self {
        Self {
            name: name.to_string(),
            date: date.to_string(),
            amount_bits: amount.to_bits(),
        }
    }
}

/// A validated transaction that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub name: String,
    pub category: Category,
    pub amount: f64,
    pub date: String,
    pub location: Option<String>,
}

impl Draft {
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(&self.name, &self.date, self.amount)
    }

    pub fn into_transaction(self, added_at: DateTime<Utc>) -> Transaction {
        Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name,
            category: self.category,
            amount: self.amount,
            date: self.date,
            location: self.location,
            added_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_label_and_english() {
        assert_eq!(Category::parse("其他"), Some(Category::Other));
        assert_eq!(Category::parse("food"), Some(Category::Food));
        assert_eq!(Category::parse(" Medical "), Some(Category::Medical));
        assert_eq!(Category::parse("groceries"), None);
    }

    #[test]
    fn test_transaction_json_uses_camel_case_and_labels() {
        let t = Transaction {
            id: "a".to_string(),
            name: "Coffee Shop".to_string(),
            category: Category::Food,
            amount: 10.0,
            date: "2024-01-01T08:00".to_string(),
            location: None,
            added_at: "2024-01-02T00:00:00Z".parse().unwrap(),
        };
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["category"], "餐饮");
        assert!(json.get("addedAt").is_some());
        assert!(json.get("location").is_none());
        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_deleted_item_flattens_transaction() {
        let json = r#"{"id":"x","name":"Bus","category":"交通","amount":2.5,
            "date":"2024-02-01T09:00","addedAt":"2024-02-01T09:05:00Z",
            "deletedAt":"2024-02-02T00:00:00Z"}"#;
        let item: DeletedItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.transaction.category, Category::Transport);
        assert_eq!(item.transaction.month(), "2024-02");
    }

    #[test]
    fn test_dedup_key_is_exact() {
        assert_eq!(DedupKey::new("A", "d", 10.0), DedupKey::new("A", "d", 10.0));
        assert_ne!(DedupKey::new("A", "d", 10.0), DedupKey::new("A", "d", 10.01));
        assert_ne!(DedupKey::new("A", "d", 10.0), DedupKey::new("a", "d", 10.0));
    }
}
