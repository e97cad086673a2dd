#[cfg(test)]
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{BillError, Result};
use crate::importer::{parse_amount, plan_merge, Source};
use crate::models::{Category, DedupKey, DeletedItem, Draft, Transaction};

pub const TRANSACTIONS_KEY: &str = "transactions";
pub const TRASH_KEY: &str = "trash";

/// Days a deleted transaction stays recoverable.
pub const TRASH_RETENTION_DAYS: i64 = 3;

// ---------------------------------------------------------------------------
// Storage backends
// ---------------------------------------------------------------------------

/// Key-value blob storage for the two persisted collections.
pub trait Storage {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
    /// Copy the current blob for `key` to `<key>.corrupt` so a later write cannot lose it.
    fn set_aside(&mut self, key: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside the data directory.
pub struct JsonDirStorage {
    dir: PathBuf,
}

impl JsonDirStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for JsonDirStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn set_aside(&mut self, key: &str) -> Result<()> {
        let path = self.path(key);
        if path.exists() {
            std::fs::copy(&path, path.with_extension("json.corrupt"))?;
        }
        Ok(())
    }
}

/// In-memory storage for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStorage {
    blobs: HashMap<String, String>,
    pub fail_writes: bool,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn with(blobs: &[(&str, &str)]) -> Self {
        Self {
            blobs: blobs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            fail_writes: false,
        }
    }
}

#[cfg(test)]
impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            return Err(BillError::Other(format!("storage rejected write to {key}")));
        }
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_aside(&mut self, key: &str) -> Result<()> {
        if let Some(blob) = self.blobs.get(key).cloned() {
            self.blobs.insert(format!("{key}.corrupt"), blob);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Loading with legacy tolerance
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    category: String,
    #[serde(deserialize_with = "lenient_amount")]
    amount: f64,
    #[serde(default)]
    date: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    added_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDeletedItem {
    #[serde(flatten)]
    transaction: RawTransaction,
    #[serde(default)]
    deleted_at: Option<DateTime<Utc>>,
}

impl RawTransaction {
    /// Returns the record and whether a default had to be filled in.
    fn into_transaction(self, now: DateTime<Utc>) -> (Transaction, bool) {
        let mut migrated = false;
        let category = Category::parse(&self.category).unwrap_or_else(|| {
            migrated = true;
            Category::Other
        });
        let id = self.id.filter(|id| !id.is_empty()).unwrap_or_else(|| {
            migrated = true;
            uuid::Uuid::new_v4().to_string()
        });
        let added_at = self.added_at.unwrap_or_else(|| {
            migrated = true;
            now
        });
        let transaction = Transaction {
            id,
            name: self.name,
            category,
            amount: self.amount,
            date: self.date,
            location: self.location,
            added_at,
        };
        (transaction, migrated)
    }
}

/// Amounts written as numeric strings still load; anything else rejects the record.
fn lenient_amount<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f64, D::Error> {
    let value = Value::deserialize(d)?;
    parse_amount(&value).ok_or_else(|| D::Error::custom(format!("invalid amount {value}")))
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// Load a collection record by record. Unreadable records are skipped; if
/// anything is lost the original blob is set aside first.
fn read_collection<T: DeserializeOwned>(storage: &mut dyn Storage, key: &str) -> Vec<T> {
    let content = match storage.read(key) {
        Ok(Some(content)) => content,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::error!("failed to read {key}: {e}");
            keep_copy(storage, key);
            return Vec::new();
        }
    };
    let elements = match serde_json::from_str::<Value>(&content) {
        Ok(Value::Array(elements)) => elements,
        Ok(_) => {
            tracing::error!("failed to parse {key}: expected an array");
            keep_copy(storage, key);
            return Vec::new();
        }
        Err(e) => {
            tracing::error!("failed to parse {key}: {e}");
            keep_copy(storage, key);
            return Vec::new();
        }
    };

    let total = elements.len();
    let items: Vec<T> = elements
        .into_iter()
        .enumerate()
        .filter_map(|(i, element)| match serde_json::from_value(element) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("skipping unreadable record {i} in {key}: {e}");
                None
            }
        })
        .collect();
    if items.len() < total {
        keep_copy(storage, key);
    }
    items
}

fn keep_copy(storage: &mut dyn Storage, key: &str) {
    match storage.set_aside(key) {
        Ok(()) => tracing::warn!("kept a copy of {key} as {key}.corrupt"),
        Err(e) => tracing::error!("failed to set aside {key}: {e}"),
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ImportResult {
    pub added: Vec<Transaction>,
    pub rejected: usize,
    pub duplicates: usize,
}

#[derive(Debug, Default, PartialEq)]
pub struct RestoreResult {
    pub restored: usize,
    pub skipped: usize,
}

/// Owns the transaction and trash collections. Every mutation re-sorts by date
/// (newest first), purges expired trash and persists both collections.
pub struct Store {
    storage: Box<dyn Storage>,
    transactions: Vec<Transaction>,
    trash: Vec<DeletedItem>,
    persist_error: Option<String>,
}

impl Store {
    pub fn open(mut storage: Box<dyn Storage>, now: DateTime<Utc>) -> Self {
        let raw: Vec<RawTransaction> = read_collection(storage.as_mut(), TRANSACTIONS_KEY);
        let raw_trash: Vec<RawDeletedItem> = read_collection(storage.as_mut(), TRASH_KEY);

        let mut migrated = false;
        let transactions: Vec<Transaction> = raw
            .into_iter()
            .map(|r| {
                let (t, m) = r.into_transaction(now);
                migrated |= m;
                t
            })
            .collect();
        let trash: Vec<DeletedItem> = raw_trash
            .into_iter()
            .map(|r| {
                let (transaction, m) = r.transaction.into_transaction(now);
                migrated |= m;
                DeletedItem {
                    transaction,
                    deleted_at: r.deleted_at.unwrap_or_else(|| {
                        migrated = true;
                        now
                    }),
                }
            })
            .collect();

        let mut store = Self {
            storage,
            transactions,
            trash,
            persist_error: None,
        };
        store.sort();
        let purged = store.purge_trash(now);
        if migrated || purged > 0 {
            tracing::info!(purged, migrated, "normalizing stored data");
            store.persist();
        }
        store
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn trash(&self) -> &[DeletedItem] {
        &self.trash
    }

    #[cfg(test)]
    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Error message from the last failed write, if any. Cleared on read.
    pub fn take_persist_error(&mut self) -> Option<String> {
        self.persist_error.take()
    }

    pub fn add(&mut self, draft: Draft, now: DateTime<Utc>) -> Transaction {
        let transaction = draft.into_transaction(now);
        tracing::info!(id = %transaction.id, "adding transaction");
        self.transactions.insert(0, transaction.clone());
        self.commit(now);
        transaction
    }

    /// Replace the editable fields of a transaction. `id` and `addedAt` are kept.
    pub fn edit(&mut self, id: &str, draft: Draft, now: DateTime<Utc>) -> Result<Transaction> {
        let existing = self
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| BillError::UnknownTransaction(id.to_string()))?;
        existing.name = draft.name;
        existing.category = draft.category;
        existing.amount = draft.amount;
        existing.date = draft.date;
        existing.location = draft.location;
        let updated = existing.clone();
        self.commit(now);
        Ok(updated)
    }

    /// Bulk category change. Returns how many transactions were updated.
    pub fn set_category(&mut self, ids: &[String], category: Category, now: DateTime<Utc>) -> usize {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut changed = 0;
        for t in self.transactions.iter_mut().filter(|t| wanted.contains(t.id.as_str())) {
            t.category = category;
            changed += 1;
        }
        if changed > 0 {
            self.commit(now);
        }
        changed
    }

    /// Move transactions to the trash. Returns how many were found.
    pub fn delete(&mut self, ids: &[String], now: DateTime<Utc>) -> usize {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.transactions)
            .into_iter()
            .partition(|t| wanted.contains(t.id.as_str()));
        self.transactions = kept;
        let count = removed.len();
        for transaction in removed {
            tracing::info!(id = %transaction.id, "moving transaction to trash");
            self.trash.insert(
                0,
                DeletedItem {
                    transaction,
                    deleted_at: now,
                },
            );
        }
        if count > 0 {
            self.commit(now);
        }
        count
    }

    /// Bring trash entries back. Entries whose `(name, date, amount)` already
    /// exists in the store stay in the trash.
    pub fn restore(&mut self, ids: &[String], now: DateTime<Utc>) -> RestoreResult {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut keys: HashSet<DedupKey> = self.transactions.iter().map(Transaction::dedup_key).collect();
        let mut result = RestoreResult::default();
        let mut remaining = Vec::with_capacity(self.trash.len());

        for item in std::mem::take(&mut self.trash) {
            if !wanted.contains(item.transaction.id.as_str()) {
                remaining.push(item);
                continue;
            }
            if keys.insert(item.transaction.dedup_key()) {
                self.transactions.push(item.transaction);
                result.restored += 1;
            } else {
                tracing::warn!(id = %item.transaction.id, "restore skipped, duplicate exists");
                result.skipped += 1;
                remaining.push(item);
            }
        }
        self.trash = remaining;
        if result.restored > 0 {
            self.commit(now);
        }
        result
    }

    /// Drop every transaction without keeping trash entries for them.
    pub fn clear_all(&mut self, now: DateTime<Utc>) -> usize {
        let count = self.transactions.len();
        self.transactions.clear();
        tracing::warn!(count, "cleared all transactions");
        self.commit(now);
        count
    }

    /// Validate, de-duplicate and merge a batch of candidates.
    pub fn merge(&mut self, candidates: &[Value], source: Source, now: DateTime<Utc>) -> Result<ImportResult> {
        let plan = plan_merge(candidates, source, &self.transactions);
        if plan.accepted.is_empty() && !candidates.is_empty() {
            tracing::warn!(
                rejected = plan.rejected,
                duplicates = plan.duplicates,
                "batch produced no transactions"
            );
            return Err(BillError::NoValidTransactions);
        }

        let added: Vec<Transaction> = plan
            .accepted
            .into_iter()
            .map(|draft| draft.into_transaction(now))
            .collect();
        tracing::info!(
            added = added.len(),
            rejected = plan.rejected,
            duplicates = plan.duplicates,
            ?source,
            "merged batch"
        );

        let mut merged = added.clone();
        merged.append(&mut self.transactions);
        self.transactions = merged;
        if !added.is_empty() {
            self.commit(now);
        }

        Ok(ImportResult {
            added,
            rejected: plan.rejected,
            duplicates: plan.duplicates,
        })
    }

    fn sort(&mut self) {
        self.transactions.sort_by(|a, b| b.date.cmp(&a.date));
    }

    fn purge_trash(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::days(TRASH_RETENTION_DAYS);
        let before = self.trash.len();
        self.trash.retain(|item| item.deleted_at > cutoff);
        before - self.trash.len()
    }

    fn commit(&mut self, now: DateTime<Utc>) {
        self.sort();
        self.purge_trash(now);
        self.persist();
    }

    fn persist(&mut self) {
        if let Err(e) = self.write_all() {
            tracing::error!("failed to persist store: {e}");
            self.persist_error = Some(e.to_string());
        }
    }

    fn write_all(&mut self) -> Result<()> {
        let transactions = serde_json::to_string(&self.transactions)?;
        let trash = serde_json::to_string(&self.trash)?;
        self.storage.write(TRANSACTIONS_KEY, &transactions)?;
        self.storage.write(TRASH_KEY, &trash)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        "2024-06-10T12:00:00Z".parse().unwrap()
    }

    fn empty_store() -> Store {
        Store::open(Box::new(MemoryStorage::default()), now())
    }

    fn draft(name: &str, date: &str, amount: f64) -> Draft {
        Draft {
            name: name.to_string(),
            category: Category::Other,
            amount,
            date: date.to_string(),
            location: None,
        }
    }

    fn assert_sorted(store: &Store) {
        let dates: Vec<&str> = store.transactions().iter().map(|t| t.date.as_str()).collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);
    }

    fn persisted(store: &Store, key: &str) -> Vec<Value> {
        let raw = store.storage().read(key).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_open_empty_storage() {
        let store = empty_store();
        assert!(store.transactions().is_empty());
        assert!(store.trash().is_empty());
    }

    #[test]
    fn test_open_falls_back_to_empty_on_corrupt_blob() {
        let storage = MemoryStorage::with(&[(TRANSACTIONS_KEY, "{not json")]);
        let store = Store::open(Box::new(storage), now());
        assert!(store.transactions().is_empty());
        let kept = store.storage().read("transactions.corrupt").unwrap();
        assert_eq!(kept.as_deref(), Some("{not json"));
    }

    #[test]
    fn test_open_skips_bad_records_and_keeps_the_rest() {
        let blob = json!([
            {"id":"a","name":"Tea","category":"餐饮","amount":4,"date":"2024-06-01T10:00",
             "addedAt":"2024-06-01T10:00:00Z"},
            {"id":"b","name":"Bun","category":"餐饮","amount":"2.5","date":"2024-06-02T10:00",
             "addedAt":"2024-06-02T10:00:00Z"},
            {"id":"c","name":"Junk","category":7,"amount":"lots","date":"2024-06-03T10:00"}
        ])
        .to_string();
        let mut store = Store::open(Box::new(MemoryStorage::with(&[(TRANSACTIONS_KEY, &blob)])), now());
        let ids: Vec<&str> = store.transactions().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(store.get("b").unwrap().amount, 2.5);
        let kept = store.storage().read("transactions.corrupt").unwrap();
        assert_eq!(kept.as_deref(), Some(blob.as_str()));

        store.add(draft("Soup", "2024-06-04T10:00", 6.0), now());
        assert_eq!(persisted(&store, TRANSACTIONS_KEY).len(), 3);
    }

    #[test]
    fn test_open_clean_blob_sets_nothing_aside() {
        let blob = r#"[{"id":"a","name":"Tea","category":"餐饮","amount":4,"date":"2024-06-01T10:00","addedAt":"2024-06-01T10:00:00Z"}]"#;
        let store = Store::open(Box::new(MemoryStorage::with(&[(TRANSACTIONS_KEY, blob)])), now());
        assert_eq!(store.transactions().len(), 1);
        assert!(store.storage().read("transactions.corrupt").unwrap().is_none());
    }

    #[test]
    fn test_open_fills_missing_added_at_once() {
        let blob = r#"[{"id":"a","name":"Tea","category":"餐饮","amount":4,"date":"2024-06-01T10:00"}]"#;
        let store = Store::open(Box::new(MemoryStorage::with(&[(TRANSACTIONS_KEY, blob)])), now());
        assert_eq!(store.transactions()[0].added_at, now());
        let saved = persisted(&store, TRANSACTIONS_KEY);
        assert_eq!(saved[0]["addedAt"], json!("2024-06-10T12:00:00Z"));
    }

    #[test]
    fn test_open_purges_expired_trash() {
        let blob = json!([
            {"id":"old","name":"A","category":"其他","amount":1,"date":"2024-06-01T10:00",
             "addedAt":"2024-06-01T10:00:00Z","deletedAt":"2024-06-06T12:00:00Z"},
            {"id":"new","name":"B","category":"其他","amount":1,"date":"2024-06-01T10:00",
             "addedAt":"2024-06-01T10:00:00Z","deletedAt":"2024-06-09T12:00:00Z"}
        ])
        .to_string();
        let store = Store::open(Box::new(MemoryStorage::with(&[(TRASH_KEY, &blob)])), now());
        let ids: Vec<&str> = store.trash().iter().map(|d| d.transaction.id.as_str()).collect();
        assert_eq!(ids, vec!["new"]);
        assert_eq!(persisted(&store, TRASH_KEY).len(), 1);
    }

    #[test]
    fn test_add_keeps_date_descending() {
        let mut store = empty_store();
        store.add(draft("A", "2024-06-01T10:00", 1.0), now());
        store.add(draft("B", "2024-06-05T10:00", 1.0), now());
        store.add(draft("C", "2024-05-20T10:00", 1.0), now());
        assert_sorted(&store);
        assert_eq!(store.transactions()[0].name, "B");
        assert_eq!(persisted(&store, TRANSACTIONS_KEY).len(), 3);
    }

    #[test]
    fn test_edit_preserves_identity() {
        let mut store = empty_store();
        let t = store.add(draft("A", "2024-06-01T10:00", 1.0), now());
        let later = now() + Duration::hours(1);
        let edited = store.edit(&t.id, draft("A2", "2024-04-01T10:00", 2.0), later).unwrap();
        assert_eq!(edited.id, t.id);
        assert_eq!(edited.added_at, t.added_at);
        assert_eq!(edited.name, "A2");
        assert!(matches!(
            store.edit("missing", draft("x", "y", 1.0), later),
            Err(BillError::UnknownTransaction(_))
        ));
    }

    #[test]
    fn test_set_category_updates_selected() {
        let mut store = empty_store();
        let a = store.add(draft("A", "2024-06-01T10:00", 1.0), now());
        store.add(draft("B", "2024-06-02T10:00", 1.0), now());
        let changed = store.set_category(&[a.id.clone(), "nope".to_string()], Category::Home, now());
        assert_eq!(changed, 1);
        assert_eq!(store.get(&a.id).unwrap().category, Category::Home);
    }

    #[test]
    fn test_delete_moves_to_trash_and_restore_brings_back() {
        let mut store = empty_store();
        let a = store.add(draft("A", "2024-06-01T10:00", 1.0), now());
        store.add(draft("B", "2024-06-02T10:00", 1.0), now());
        assert_eq!(store.delete(&[a.id.clone()], now()), 1);
        assert_eq!(store.transactions().len(), 1);
        assert_eq!(store.trash()[0].deleted_at, now());

        let result = store.restore(&[a.id.clone()], now());
        assert_eq!(result, RestoreResult { restored: 1, skipped: 0 });
        assert!(store.trash().is_empty());
        assert_sorted(&store);
    }

    #[test]
    fn test_restore_skips_colliding_triple() {
        let mut store = empty_store();
        let a = store.add(draft("A", "2024-06-01T10:00", 1.0), now());
        store.delete(&[a.id.clone()], now());
        store.add(draft("A", "2024-06-01T10:00", 1.0), now());
        let result = store.restore(&[a.id.clone()], now());
        assert_eq!(result, RestoreResult { restored: 0, skipped: 1 });
        assert_eq!(store.trash().len(), 1);
        assert_eq!(store.transactions().len(), 1);
    }

    #[test]
    fn test_clear_all_leaves_no_trash() {
        let mut store = empty_store();
        store.add(draft("A", "2024-06-01T10:00", 1.0), now());
        assert_eq!(store.clear_all(now()), 1);
        assert!(store.transactions().is_empty());
        assert!(store.trash().is_empty());
    }

    #[test]
    fn test_trash_aging_on_mutation() {
        let mut store = empty_store();
        let a = store.add(draft("A", "2024-06-01T10:00", 1.0), now());
        store.delete(&[a.id.clone()], now());
        let four_days_later = now() + Duration::days(4);
        store.add(draft("B", "2024-06-02T10:00", 1.0), four_days_later);
        assert!(store.trash().is_empty());
        assert!(persisted(&store, TRASH_KEY).is_empty());
    }

    #[test]
    fn test_merge_scenario_coffee_shop() {
        let mut store = empty_store();
        store
            .merge(
                &[json!({"name": "Coffee Shop", "date": "2024-01-01T08:00", "amount": 10})],
                Source::Extraction,
                now(),
            )
            .unwrap();

        let same = [json!({"name": "Coffee Shop", "date": "2024-01-01T08:00", "amount": 10, "category": "其他"})];
        assert!(matches!(
            store.merge(&same, Source::File, now()),
            Err(BillError::NoValidTransactions)
        ));
        assert_eq!(store.transactions().len(), 1);

        let different = [json!({"name": "Coffee Shop", "date": "2024-01-01T08:00", "amount": 10.01, "category": "其他"})];
        let result = store.merge(&different, Source::File, now()).unwrap();
        assert_eq!(result.added.len(), 1);
        assert_eq!(store.transactions().len(), 2);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut store = empty_store();
        let batch = vec![
            json!({"name": "Bus", "date": "2024-06-03T08:00", "amount": 2.2, "category": "交通"}),
            json!({"name": "Lunch", "date": "2024-06-04T12:30", "amount": 15, "category": "餐饮"}),
        ];
        let first = store.merge(&batch, Source::File, now()).unwrap();
        assert_eq!(first.added.len(), 2);
        let snapshot = store.transactions().to_vec();
        assert!(store.merge(&batch, Source::File, now()).is_err());
        assert_eq!(store.transactions(), snapshot.as_slice());
    }

    #[test]
    fn test_merge_assigns_ids_and_added_at() {
        let mut store = empty_store();
        let batch = vec![
            json!({"name": "A", "date": "2024-06-03T08:00", "amount": 1}),
            json!({"name": "B", "date": "2024-06-01T08:00", "amount": 1}),
        ];
        let result = store.merge(&batch, Source::Extraction, now()).unwrap();
        assert_ne!(result.added[0].id, result.added[1].id);
        assert!(result.added.iter().all(|t| t.added_at == now()));
        assert_sorted(&store);
    }

    #[test]
    fn test_merge_empty_batch_is_ok() {
        let mut store = empty_store();
        let result = store.merge(&[], Source::File, now()).unwrap();
        assert!(result.added.is_empty());
    }

    #[test]
    fn test_sort_invariant_across_mixed_operations() {
        let mut store = empty_store();
        let a = store.add(draft("A", "2024-03-01T10:00", 1.0), now());
        store
            .merge(
                &[
                    json!({"name": "B", "date": "2024-05-01T08:00", "amount": 3}),
                    json!({"name": "C", "date": "2024-01-01T08:00", "amount": 3}),
                ],
                Source::File,
                now(),
            )
            .unwrap();
        store.edit(&a.id, draft("A", "2024-06-01T10:00", 1.0), now()).unwrap();
        assert_sorted(&store);
        store.delete(&[a.id.clone()], now());
        assert_sorted(&store);
        store.restore(&[a.id.clone()], now());
        assert_sorted(&store);
        assert_eq!(store.transactions()[0].id, a.id);
    }

    #[test]
    fn test_persist_failure_keeps_in_memory_change() {
        let storage = MemoryStorage {
            fail_writes: true,
            ..Default::default()
        };
        let mut store = Store::open(Box::new(storage), now());
        store.add(draft("A", "2024-06-01T10:00", 1.0), now());
        assert_eq!(store.transactions().len(), 1);
        assert!(store.take_persist_error().is_some());
        assert!(store.take_persist_error().is_none());
    }

    #[test]
    fn test_json_dir_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = Store::open(Box::new(JsonDirStorage::new(dir.path())), now());
            store.add(draft("A", "2024-06-01T10:00", 1.0), now());
        }
        assert!(dir.path().join("transactions.json").exists());
        let store = Store::open(Box::new(JsonDirStorage::new(dir.path())), now());
        assert_eq!(store.transactions().len(), 1);
        assert_eq!(store.transactions()[0].name, "A");
    }
}
