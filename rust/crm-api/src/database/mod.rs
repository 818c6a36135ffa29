//! Persistence layer.
//!
//! The store keeps every entity as a JSON document plus the few columns
//! needed for filtering and ordering (owner, client reference, sort key).
//! Two backends implement the same [`DocStore`] contract: SQLite for real
//! deployments and an in-memory map for tests.
//!
//! The typed CRUD surface over this lives in [`accessors`]; list reads go
//! through the coarse per-entity-type [`cache`].

pub mod accessors;
pub mod cache;
pub mod memory;
pub mod record;
pub mod schema;
pub mod sqlite;

pub use accessors::Accessors;
pub use cache::ListCache;
pub use memory::MemoryStore;
pub use record::Record;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use serde_json::Value;

/// Entity tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Clients,
    Leads,
    Deals,
    PipelineStages,
    Projects,
    Tasks,
    Interactions,
    Communications,
    FollowUps,
    AiConversations,
}

/// Sort direction for a table's default ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

impl Table {
    /// SQL table name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Leads => "leads",
            Self::Deals => "deals",
            Self::PipelineStages => "pipeline_stages",
            Self::Projects => "projects",
            Self::Tasks => "tasks",
            Self::Interactions => "interactions",
            Self::Communications => "communications",
            Self::FollowUps => "follow_ups",
            Self::AiConversations => "ai_conversations",
        }
    }

    /// Default list ordering.
    ///
    /// Pipeline stages order by position, follow-ups by schedule; everything
    /// else is newest-first by creation time.
    #[must_use]
    pub fn order(self) -> Order {
        match self {
            Self::PipelineStages | Self::FollowUps => Order::Ascending,
            _ => Order::Descending,
        }
    }

    /// All tables, for schema bootstrap.
    pub const ALL: [Table; 10] = [
        Self::Clients,
        Self::Leads,
        Self::Deals,
        Self::PipelineStages,
        Self::Projects,
        Self::Tasks,
        Self::Interactions,
        Self::Communications,
        Self::FollowUps,
        Self::AiConversations,
    ];
}

/// Sort key for a row under its table's default ordering.
///
/// Homogeneous per table: numeric for pipeline stages (order index),
/// fixed-width RFC 3339 text for everything else.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Num(f64),
    Text(String),
}

impl SortKey {
    /// Fixed-width UTC timestamp key, safe for lexicographic ordering.
    #[must_use]
    pub fn timestamp(ts: chrono::DateTime<chrono::Utc>) -> Self {
        Self::Text(ts.to_rfc3339_opts(chrono::SecondsFormat::Micros, true))
    }
}

/// Low-level record store: filtered reads and writes of JSON documents.
///
/// All failures are infrastructure errors; "row not found" is the `false` /
/// `None` side of the return type, never an `Err`.
#[async_trait]
pub trait DocStore: Send + Sync {
    /// Insert a new document.
    async fn insert(
        &self,
        table: Table,
        id: &str,
        owner: Option<&str>,
        client_id: Option<&str>,
        sort_key: SortKey,
        doc: Value,
    ) -> anyhow::Result<()>;

    /// Fetch one document owned by `owner`.
    async fn get(&self, table: Table, owner: &str, id: &str) -> anyhow::Result<Option<Value>>;

    /// All documents owned by `owner`, in the table's default order.
    async fn list(&self, table: Table, owner: &str) -> anyhow::Result<Vec<Value>>;

    /// All documents referencing `client_id`, in the table's default order.
    async fn list_by_client(&self, table: Table, client_id: &str) -> anyhow::Result<Vec<Value>>;

    /// Overwrite an existing document owned by `owner`, including its
    /// client reference. Returns `false` if no such row exists.
    async fn replace(
        &self,
        table: Table,
        owner: &str,
        id: &str,
        client_id: Option<&str>,
        sort_key: SortKey,
        doc: Value,
    ) -> anyhow::Result<bool>;

    /// Delete one document owned by `owner`. Returns `false` if absent.
    async fn delete(&self, table: Table, owner: &str, id: &str) -> anyhow::Result<bool>;

    /// Delete every document referencing `client_id`. Returns rows removed.
    async fn delete_by_client(&self, table: Table, client_id: &str) -> anyhow::Result<u64>;
}

/// Store abstraction over the available backends.
#[derive(Clone)]
pub enum Store {
    Sqlite(SqliteStore),
    InMemory(MemoryStore),
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(_) => write!(f, "Store::Sqlite"),
            Self::InMemory(_) => write!(f, "Store::InMemory"),
        }
    }
}

impl Store {
    /// Open (and bootstrap) the SQLite backend at `path`.
    pub async fn sqlite(path: impl Into<std::path::PathBuf>) -> anyhow::Result<Self> {
        let store = SqliteStore::new(path.into());
        store.init().await?;
        Ok(Self::Sqlite(store))
    }

    /// Create an in-memory store for testing.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

#[async_trait]
impl DocStore for Store {
    async fn insert(
        &self,
        table: Table,
        id: &str,
        owner: Option<&str>,
        client_id: Option<&str>,
        sort_key: SortKey,
        doc: Value,
    ) -> anyhow::Result<()> {
        match self {
            Self::Sqlite(s) => s.insert(table, id, owner, client_id, sort_key, doc).await,
            Self::InMemory(s) => s.insert(table, id, owner, client_id, sort_key, doc).await,
        }
    }

    async fn get(&self, table: Table, owner: &str, id: &str) -> anyhow::Result<Option<Value>> {
        match self {
            Self::Sqlite(s) => s.get(table, owner, id).await,
            Self::InMemory(s) => s.get(table, owner, id).await,
        }
    }

    async fn list(&self, table: Table, owner: &str) -> anyhow::Result<Vec<Value>> {
        match self {
            Self::Sqlite(s) => s.list(table, owner).await,
            Self::InMemory(s) => s.list(table, owner).await,
        }
    }

    async fn list_by_client(&self, table: Table, client_id: &str) -> anyhow::Result<Vec<Value>> {
        match self {
            Self::Sqlite(s) => s.list_by_client(table, client_id).await,
            Self::InMemory(s) => s.list_by_client(table, client_id).await,
        }
    }

    async fn replace(
        &self,
        table: Table,
        owner: &str,
        id: &str,
        client_id: Option<&str>,
        sort_key: SortKey,
        doc: Value,
    ) -> anyhow::Result<bool> {
        match self {
            Self::Sqlite(s) => s.replace(table, owner, id, client_id, sort_key, doc).await,
            Self::InMemory(s) => s.replace(table, owner, id, client_id, sort_key, doc).await,
        }
    }

    async fn delete(&self, table: Table, owner: &str, id: &str) -> anyhow::Result<bool> {
        match self {
            Self::Sqlite(s) => s.delete(table, owner, id).await,
            Self::InMemory(s) => s.delete(table, owner, id).await,
        }
    }

    async fn delete_by_client(&self, table: Table, client_id: &str) -> anyhow::Result<u64> {
        match self {
            Self::Sqlite(s) => s.delete_by_client(table, client_id).await,
            Self::InMemory(s) => s.delete_by_client(table, client_id).await,
        }
    }
}
