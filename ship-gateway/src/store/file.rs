//! Disk-backed store: one JSON file per table.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{KeyValueStore, StoreError};

/// Contents of a table file.
type Table = BTreeMap<String, Value>;

/// Key-value store persisting each table as `<root>/<table>.json`.
///
/// Writes are serialized through a single lock and land via a temporary
/// file and rename, so a reader never sees a half-written table.
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn table_path(&self, table: &str) -> Result<PathBuf, StoreError> {
        if table.is_empty() || table.contains(['/', '\\']) || table.starts_with('.') {
            return Err(StoreError::Unavailable {
                message: format!("invalid table name: {table:?}"),
            });
        }
        Ok(self.root.join(format!("{table}.json")))
    }

    async fn load(&self, path: &Path) -> Result<Table, StoreError> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Table::new()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&contents).map_err(|e| StoreError::Serialization {
            message: format!("failed to parse {}: {}", path.display(), e),
        })
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, table: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.table_path(table)?;
        let mut items = self.load(&path).await?;
        Ok(items.remove(key))
    }

    async fn put(&self, table: &str, key: &str, item: Value) -> Result<(), StoreError> {
        let path = self.table_path(table)?;
        let _guard = self.write_lock.lock().await;

        let mut items = self.load(&path).await?;
        items.insert(key.to_string(), item);

        tokio::fs::create_dir_all(&self.root).await?;

        let json = serde_json::to_string_pretty(&items).map_err(|e| StoreError::Serialization {
            message: format!("failed to serialize table {table}: {e}"),
        })?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        Ok(())
    }
}
