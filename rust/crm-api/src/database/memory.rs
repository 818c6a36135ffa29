//! In-memory backend for testing.

use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::{DocStore, Order, SortKey, Table};

#[derive(Debug, Clone)]
struct Row {
    id: String,
    owner: Option<String>,
    client_id: Option<String>,
    sort_key: SortKey,
    doc: Value,
}

fn compare_keys(a: &SortKey, b: &SortKey) -> CmpOrdering {
    match (a, b) {
        (SortKey::Num(x), SortKey::Num(y)) => x.total_cmp(y),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        // Keys are homogeneous per table; mixed comparison is arbitrary.
        (SortKey::Num(_), SortKey::Text(_)) => CmpOrdering::Less,
        (SortKey::Text(_), SortKey::Num(_)) => CmpOrdering::Greater,
    }
}

/// In-memory document store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<Table, Vec<Row>>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(table: Table, mut rows: Vec<Row>) -> Vec<Value> {
        rows.sort_by(|a, b| {
            let key = compare_keys(&a.sort_key, &b.sort_key);
            let key = match table.order() {
                Order::Ascending => key,
                Order::Descending => key.reverse(),
            };
            key.then_with(|| a.id.cmp(&b.id))
        });
        rows.into_iter().map(|r| r.doc).collect()
    }
}

#[async_trait]
impl DocStore for MemoryStore {
    async fn insert(
        &self,
        table: Table,
        id: &str,
        owner: Option<&str>,
        client_id: Option<&str>,
        sort_key: SortKey,
        doc: Value,
    ) -> Result<()> {
        let mut tables = self.tables.write();
        tables.entry(table).or_default().push(Row {
            id: id.to_string(),
            owner: owner.map(String::from),
            client_id: client_id.map(String::from),
            sort_key,
            doc,
        });
        Ok(())
    }

    async fn get(&self, table: Table, owner: &str, id: &str) -> Result<Option<Value>> {
        let tables = self.tables.read();
        Ok(tables.get(&table).and_then(|rows| {
            rows.iter()
                .find(|r| r.id == id && r.owner.as_deref() == Some(owner))
                .map(|r| r.doc.clone())
        }))
    }

    async fn list(&self, table: Table, owner: &str) -> Result<Vec<Value>> {
        let tables = self.tables.read();
        let rows = tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.owner.as_deref() == Some(owner))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self::sorted(table, rows))
    }

    async fn list_by_client(&self, table: Table, client_id: &str) -> Result<Vec<Value>> {
        let tables = self.tables.read();
        let rows = tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.client_id.as_deref() == Some(client_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self::sorted(table, rows))
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
        let mut tables = self.tables.write();
        let Some(rows) = tables.get_mut(&table) else {
            return Ok(false);
        };
        match rows
            .iter_mut()
            .find(|r| r.id == id && r.owner.as_deref() == Some(owner))
        {
            Some(row) => {
                row.client_id = client_id.map(str::to_string);
                row.sort_key = sort_key;
                row.doc = doc;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, table: Table, owner: &str, id: &str) -> Result<bool> {
        let mut tables = self.tables.write();
        let Some(rows) = tables.get_mut(&table) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|r| !(r.id == id && r.owner.as_deref() == Some(owner)));
        Ok(rows.len() < before)
    }

    async fn delete_by_client(&self, table: Table, client_id: &str) -> Result<u64> {
        let mut tables = self.tables.write();
        let Some(rows) = tables.get_mut(&table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| r.client_id.as_deref() != Some(client_id));
        Ok((before - rows.len()) as u64)
    }
}
