use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{Collection, DocumentStore, Query};

/// Keeps documents in process memory. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: Collection, document: Value) -> Result<()> {
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(document);
        Ok(())
    }

    async fn find(&self, collection: Collection, query: &Query) -> Result<Vec<Value>> {
        let documents = self
            .collections
            .read()
            .await
            .get(&collection)
            .cloned()
            .unwrap_or_default();
        Ok(query.apply(documents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn collections_are_independent() {
        let store = MemoryStore::new();
        store
            .insert(Collection::Chats, json!({ "session_id": "s", "timestamp": "1" }))
            .await
            .unwrap();

        assert_eq!(store.find(Collection::Chats, &Query::all()).await.unwrap().len(), 1);
        assert!(store
            .find(Collection::FactChecks, &Query::all())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn unknown_filter_value_yields_empty_result() {
        let store = MemoryStore::new();
        store
            .insert(Collection::Chats, json!({ "session_id": "s", "timestamp": "1" }))
            .await
            .unwrap();

        let found = store
            .find(Collection::Chats, &Query::field_eq("session_id", "other"))
            .await
            .unwrap();
        assert!(found.is_empty());
    }
}
