use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel shown when a signal cannot be found in the page.
pub const UNKNOWN: &str = "Desconocido";

/// One observation of a product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub price_raw: String,
    pub price: Option<i64>,
    pub stock: String,
}

impl Snapshot {
    pub fn unknown() -> Self {
        Self {
            price_raw: UNKNOWN.to_string(),
            price: None,
            stock: UNKNOWN.to_string(),
        }
    }
}

/// What survives between cycles for one product. The raw price text is not kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredSnapshotRecord")]
pub struct StoredSnapshot {
    pub price: Option<i64>,
    pub stock: Option<String>,
}

/// On-disk form of a [`StoredSnapshot`]. Older files used `precio` for the
/// price; when both keys are present `price` wins.
#[derive(Deserialize)]
struct StoredSnapshotRecord {
    #[serde(default)]
    price: Option<i64>,
    #[serde(default)]
    precio: Option<i64>,
    #[serde(default)]
    stock: Option<String>,
}

impl From<StoredSnapshotRecord> for StoredSnapshot {
    fn from(record: StoredSnapshotRecord) -> Self {
        Self {
            price: record.price.or(record.precio),
            stock: record.stock,
        }
    }
}

impl From<&Snapshot> for StoredSnapshot {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            price: snapshot.price,
            stock: Some(snapshot.stock.clone()),
        }
    }
}

/// Last known snapshot per product URL.
///
/// Entries are only ever inserted or overwritten, never removed, so a product
/// dropped from the configuration keeps its last value on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedState {
    entries: BTreeMap<String, StoredSnapshot>,
}

impl PersistedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<&StoredSnapshot> {
        self.entries.get(url)
    }

    pub fn record(&mut self, url: &str, snapshot: &Snapshot) {
        self.entries.insert(url.to_string(), StoredSnapshot::from(snapshot));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
