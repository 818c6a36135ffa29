//! SQLite backend.
//!
//! A single connection behind a coarse lock, every call routed through
//! `spawn_blocking`. WAL mode is enabled so concurrent readers don't block
//! on the writer.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::types::{ToSql, ToSqlOutput};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use super::{schema, DocStore, Order, SortKey, Table};

impl ToSql for SortKey {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Num(n) => n.to_sql(),
            Self::Text(s) => s.to_sql(),
        }
    }
}

/// SQLite document store.
#[derive(Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
    conn: Arc<Mutex<Option<Connection>>>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ready = self.conn.lock().map(|g| g.is_some()).unwrap_or(false);
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .field("ready", &ready)
            .finish()
    }
}

impl SqliteStore {
    #[must_use]
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            conn: Arc::new(Mutex::new(None)),
        }
    }

    /// Open the database file and run the schema bootstrap.
    pub async fn init(&self) -> Result<()> {
        let conn_slot = Arc::clone(&self.conn);
        let db_path = self.db_path.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut guard = conn_slot.lock().expect("sqlite lock poisoned");
            if guard.is_none() {
                if let Some(parent) = db_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let conn = Connection::open(&db_path)?;
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn.execute_batch(&schema::bootstrap_sql())?;
                *guard = Some(conn);
            }
            Ok(())
        })
        .await
        .context("Tokio spawn_blocking failed")??;

        Ok(())
    }

    /// Run `f` with the open connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn_slot = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || -> Result<T> {
            let guard = conn_slot.lock().expect("sqlite lock poisoned");
            let conn = guard
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("SQLite not initialized"))?;
            f(conn)
        })
        .await
        .context("Tokio spawn_blocking failed")?
    }
}

fn order_clause(table: Table) -> &'static str {
    match table.order() {
        Order::Ascending => "ORDER BY sort_key ASC, id ASC",
        Order::Descending => "ORDER BY sort_key DESC, id ASC",
    }
}

fn rows_to_docs(mut rows: rusqlite::Rows<'_>) -> Result<Vec<Value>> {
    let mut docs = Vec::new();
    while let Some(row) = rows.next()? {
        let raw: String = row.get(0)?;
        docs.push(serde_json::from_str(&raw)?);
    }
    Ok(docs)
}

#[async_trait]
impl DocStore for SqliteStore {
    async fn insert(
        &self,
        table: Table,
        id: &str,
        owner: Option<&str>,
        client_id: Option<&str>,
        sort_key: SortKey,
        doc: Value,
    ) -> Result<()> {
        let id = id.to_string();
        let owner = owner.map(String::from);
        let client_id = client_id.map(String::from);

        self.with_conn(move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO {} (id, owner, client_id, sort_key, data) VALUES (?1, ?2, ?3, ?4, ?5)",
                    table.name()
                ),
                params![id, owner, client_id, sort_key, doc.to_string()],
            )?;
            Ok(())
        })
        .await
    }

    async fn get(&self, table: Table, owner: &str, id: &str) -> Result<Option<Value>> {
        let id = id.to_string();
        let owner = owner.to_string();

        self.with_conn(move |conn| {
            let raw: Option<String> = conn
                .query_row(
                    &format!("SELECT data FROM {} WHERE id = ?1 AND owner = ?2", table.name()),
                    params![id, owner],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(match raw {
                Some(raw) => Some(serde_json::from_str(&raw)?),
                None => None,
            })
        })
        .await
    }

    async fn list(&self, table: Table, owner: &str) -> Result<Vec<Value>> {
        let owner = owner.to_string();

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT data FROM {} WHERE owner = ?1 {}",
                table.name(),
                order_clause(table)
            ))?;
            let rows = stmt.query(params![owner])?;
            rows_to_docs(rows)
        })
        .await
    }

    async fn list_by_client(&self, table: Table, client_id: &str) -> Result<Vec<Value>> {
        let client_id = client_id.to_string();

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT data FROM {} WHERE client_id = ?1 {}",
                table.name(),
                order_clause(table)
            ))?;
            let rows = stmt.query(params![client_id])?;
            rows_to_docs(rows)
        })
        .await
    }

    async fn replace(
        &self,
        table: Table,
        owner: &str,
        id: &str,
        client_id: Option<&str>,
        sort_key: SortKey,
        doc: Value,
    ) -> Result<bool> {
        let id = id.to_string();
        let owner = owner.to_string();
        let client_id = client_id.map(str::to_string);

        self.with_conn(move |conn| {
            let changed = conn.execute(
                &format!(
                    "UPDATE {} SET client_id = ?3, sort_key = ?4, data = ?5 \
                     WHERE id = ?1 AND owner = ?2",
                    table.name()
                ),
                params![id, owner, client_id, sort_key, doc.to_string()],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    async fn delete(&self, table: Table, owner: &str, id: &str) -> Result<bool> {
        let id = id.to_string();
        let owner = owner.to_string();

        self.with_conn(move |conn| {
            let changed = conn.execute(
                &format!("DELETE FROM {} WHERE id = ?1 AND owner = ?2", table.name()),
                params![id, owner],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    async fn delete_by_client(&self, table: Table, client_id: &str) -> Result<u64> {
        let client_id = client_id.to_string();

        self.with_conn(move |conn| {
            let changed = conn.execute(
                &format!("DELETE FROM {} WHERE client_id = ?1", table.name()),
                params![client_id],
            )?;
            Ok(changed as u64)
        })
        .await
    }
}
