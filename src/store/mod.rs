pub(crate) mod disk;
pub(crate) mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use strum::{Display, EnumString};

/// Named groups of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    Chats,
    FactChecks,
}

impl Collection {
    /// Field whose value groups documents on disk, if any.
    pub fn partition_field(self) -> Option<&'static str> {
        match self {
            Collection::Chats => Some("session_id"),
            Collection::FactChecks => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    #[default]
    OldestFirst,
    NewestFirst,
}

/// Equality filter, `timestamp` ordering and an optional limit.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filter: Option<(String, String)>,
    pub order: Order,
    pub limit: Option<usize>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn field_eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            filter: Some((field.into(), value.into())),
            ..Self::default()
        }
    }

    pub fn newest_first(mut self) -> Self {
        self.order = Order::NewestFirst;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, document: &Value) -> bool {
        match &self.filter {
            Some((field, value)) => document.get(field).and_then(Value::as_str) == Some(value),
            None => true,
        }
    }

    /// Filters, sorts and truncates `documents`. Equal timestamps keep
    /// insertion order, later insertions counting as more recent.
    pub fn apply(&self, documents: Vec<Value>) -> Vec<Value> {
        let mut documents: Vec<Value> = documents
            .into_iter()
            .filter(|document| self.matches(document))
            .collect();

        documents.sort_by(|a, b| timestamp_of(a).cmp(timestamp_of(b)));
        if self.order == Order::NewestFirst {
            documents.reverse();
        }
        if let Some(limit) = self.limit {
            documents.truncate(limit);
        }
        documents
    }
}

pub fn timestamp_of(document: &Value) -> &str {
    document
        .get("timestamp")
        .and_then(Value::as_str)
        .unwrap_or_default()
}

/// Append-only document persistence. Nothing is ever updated or deleted.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, collection: Collection, document: Value) -> Result<()>;

    async fn find(&self, collection: Collection, query: &Query) -> Result<Vec<Value>>;
}
