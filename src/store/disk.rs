use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::future::try_join_all;
use itertools::Itertools;
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::{Collection, DocumentStore, Order, Query, timestamp_of};

const SHARED_PARTITION: &str = "all";
const INDEX_DIR: &str = "index-v5";

/// Append-only document store on top of a `cacache` directory.
///
/// Documents are keyed `<collection>/<partition>/<timestamp>/<id>`. Chats are
/// partitioned by a digest of their session id so a history lookup only
/// touches that session's entries.
pub struct DiskStore {
    store_dir: PathBuf,
}

impl DiskStore {
    pub async fn new(store_dir: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&store_dir)
            .await
            .with_context(|| format!("Failed to create store directory {}", store_dir.display()))?;

        Ok(Self { store_dir })
    }

    pub fn path(&self) -> &Path {
        &self.store_dir
    }

    async fn list_keys(&self, prefix: String) -> Result<Vec<String>> {
        let store_dir = self.store_dir.clone();

        let mut keys = tokio::task::spawn_blocking(move || {
            // cacache only creates its index on the first write.
            if !store_dir.join(INDEX_DIR).is_dir() {
                return Ok(Vec::new());
            }
            cacache::list_sync(&store_dir)
                .map_ok(|metadata| metadata.key)
                .filter_ok(|key| key.starts_with(&prefix))
                .collect::<cacache::Result<Vec<_>>>()
        })
        .await
        .context("Store listing task failed")?
        .context("Failed to list store index")?;

        keys.sort_by(|a, b| key_timestamp(a).cmp(key_timestamp(b)).then_with(|| a.cmp(b)));
        Ok(keys)
    }

    async fn read(&self, key: &str) -> Result<Value> {
        let data = cacache::read(&self.store_dir, key)
            .await
            .with_context(|| format!("Failed to read document `{key}`"))?;
        serde_json::from_slice(&data).with_context(|| format!("Corrupt document `{key}`"))
    }
}

#[async_trait]
impl DocumentStore for DiskStore {
    async fn insert(&self, collection: Collection, document: Value) -> Result<()> {
        let partition = match collection.partition_field() {
            Some(field) => compute_partition_hash(
                document.get(field).and_then(Value::as_str).unwrap_or_default(),
            ),
            None => SHARED_PARTITION.to_owned(),
        };
        let key = format!(
            "{collection}/{partition}/{}/{}",
            timestamp_of(&document),
            uuid::Uuid::new_v4().simple()
        );

        let serialized = serde_json::to_vec(&document).context("Failed to serialize document")?;
        cacache::write(&self.store_dir, &key, serialized)
            .await
            .with_context(|| format!("Failed to write document to {collection}"))?;
        Ok(())
    }

    async fn find(&self, collection: Collection, query: &Query) -> Result<Vec<Value>> {
        let partition_filter = match (collection.partition_field(), &query.filter) {
            (Some(partition_field), Some((field, value))) if partition_field == field => {
                Some(compute_partition_hash(value))
            }
            _ => None,
        };
        let covered_by_key = query.filter.is_none() || partition_filter.is_some();
        let prefix = match partition_filter {
            Some(partition) => format!("{collection}/{partition}/"),
            None => format!("{collection}/"),
        };

        let mut keys = self.list_keys(prefix).await?;

        // Keys already carry the sort field, so skip reading what the limit drops.
        if let (true, Some(limit)) = (covered_by_key, query.limit) {
            match query.order {
                Order::OldestFirst => keys.truncate(limit),
                Order::NewestFirst => {
                    let excess = keys.len().saturating_sub(limit);
                    keys.drain(..excess);
                }
            }
        }

        let documents = try_join_all(keys.iter().map(|key| self.read(key))).await?;
        Ok(query.apply(documents))
    }
}

fn key_timestamp(key: &str) -> &str {
    key.splitn(4, '/').nth(2).unwrap_or_default()
}

pub fn default_store_dir() -> Result<PathBuf> {
    let data_base = dirs::data_local_dir().context("Failed to determine data directory")?;
    Ok(data_base.join(env!("CARGO_CRATE_NAME")))
}

pub fn compute_partition_hash(value: &str) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}
