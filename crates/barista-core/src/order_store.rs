//! Order persistence: one pretty-printed JSON document per completed order.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{BaristaError, Result};
use crate::order::OrderRecord;

/// A completed order as held by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOrder {
    /// Stable identifier, e.g. `order_20250101_093000_Sam`.
    pub id: String,
    /// Backing file, when the store writes to disk.
    pub path: Option<PathBuf>,
    pub order: OrderRecord,
}

/// Durable storage for completed orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a completed order.
    ///
    /// Returning `Ok` means the order is on disk (or in the store) under an
    /// id no other order holds. An existing order is never replaced.
    async fn save(&self, order: &OrderRecord, placed_at: DateTime<Local>) -> Result<StoredOrder>;

    /// All stored orders, oldest identifier first.
    async fn list(&self) -> Result<Vec<StoredOrder>>;
}

/// Replace characters that are unsafe in a file name.
///
/// Whitespace becomes `_`, as do path separators and control characters.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Identifier for an order placed at `placed_at`: `order_<YYYYMMDD>_<HHMMSS>_<name>`.
pub fn order_id(order: &OrderRecord, placed_at: DateTime<Local>) -> String {
    format!(
        "order_{}_{}",
        placed_at.format("%Y%m%d_%H%M%S"),
        sanitize_name(&order.name)
    )
}

/// `base` for the first order with that id, `base_2`, `base_3`, ... after.
fn disambiguate(base: &str, n: usize) -> String {
    if n == 1 {
        base.to_string()
    } else {
        format!("{base}_{n}")
    }
}

async fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await
}

/// File-based order store.
///
/// Layout: `<dir>/order_<YYYYMMDD>_<HHMMSS>_<name>.json`, with `_2`, `_3`, ...
/// appended when that file already exists.
pub struct JsonOrderStore {
    dir: PathBuf,
}

impl JsonOrderStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Default store location: `~/.barista/orders/`
    pub fn default_path() -> PathBuf {
        crate::config::data_dir().join("orders")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read a single order file.
    pub async fn load(path: &Path) -> Result<OrderRecord> {
        let data = tokio::fs::read_to_string(path).await?;
        let order = serde_json::from_str(&data)?;
        Ok(order)
    }
}

#[async_trait]
impl OrderStore for JsonOrderStore {
    async fn save(&self, order: &OrderRecord, placed_at: DateTime<Local>) -> Result<StoredOrder> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            BaristaError::Storage(format!(
                "cannot create orders directory {}: {e}",
                self.dir.display()
            ))
        })?;

        let base = order_id(order, placed_at);
        let data = serde_json::to_string_pretty(order)?;

        // Atomic write: fill a private temp file, then link it into place
        let tmp = self
            .dir
            .join(format!(".{base}.{}.tmp", uuid::Uuid::new_v4().simple()));
        if let Err(e) = write_synced(&tmp, data.as_bytes()).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(BaristaError::Storage(format!(
                "write {} failed: {e}",
                tmp.display()
            )));
        }

        // hard_link never replaces an existing file, so an order placed in
        // the same second under the same name gets a numbered id instead.
        let mut n = 1;
        let (id, path) = loop {
            let id = disambiguate(&base, n);
            let path = self.dir.join(format!("{id}.json"));
            match tokio::fs::hard_link(&tmp, &path).await {
                Ok(()) => break (id, path),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => n += 1,
                Err(e) => {
                    let _ = tokio::fs::remove_file(&tmp).await;
                    return Err(BaristaError::Storage(format!(
                        "link to {} failed: {e}",
                        path.display()
                    )));
                }
            }
        };
        if let Err(e) = tokio::fs::remove_file(&tmp).await {
            warn!(path = %tmp.display(), %e, "Could not remove temp order file");
        }

        debug!(path = %path.display(), bytes = data.len(), "Order written");
        Ok(StoredOrder {
            id,
            path: Some(path),
            order: order.clone(),
        })
    }

    async fn list(&self) -> Result<Vec<StoredOrder>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut orders = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(String::from) else {
                continue;
            };
            match Self::load(&path).await {
                Ok(order) => orders.push(StoredOrder {
                    id,
                    path: Some(path),
                    order,
                }),
                Err(e) => warn!(path = %path.display(), %e, "Skipping unreadable order file"),
            }
        }

        orders.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(orders)
    }
}

/// In-process order store, for tests and dry runs.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<Vec<StoredOrder>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn save(&self, order: &OrderRecord, placed_at: DateTime<Local>) -> Result<StoredOrder> {
        let base = order_id(order, placed_at);
        let mut orders = self.orders.lock().await;
        let mut n = 1;
        while orders.iter().any(|o| o.id == disambiguate(&base, n)) {
            n += 1;
        }
        let stored = StoredOrder {
            id: disambiguate(&base, n),
            path: None,
            order: order.clone(),
        };
        orders.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<StoredOrder>> {
        let mut orders = self.orders.lock().await.clone();
        orders.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(orders)
    }
}
