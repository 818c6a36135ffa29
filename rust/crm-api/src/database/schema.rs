//! SQLite schema bootstrap.
//!
//! Every entity table has the same shape: the JSON document plus the
//! columns queries actually filter or order on. `owner` is NULL only for
//! interactions, which are scoped through their owning client.

use super::Table;

/// Build the idempotent bootstrap batch for all entity tables.
#[must_use]
pub fn bootstrap_sql() -> String {
    let mut sql = String::new();
    for table in Table::ALL {
        let name = table.name();
        sql.push_str(&format!(
            "CREATE TABLE IF NOT EXISTS {name} (
                id TEXT PRIMARY KEY,
                owner TEXT,
                client_id TEXT,
                sort_key NUMERIC,
                data TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_{name}_owner_sort ON {name}(owner, sort_key);
            CREATE INDEX IF NOT EXISTS idx_{name}_client ON {name}(client_id) WHERE client_id IS NOT NULL;
            "
        ));
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_covers_every_table() {
        let sql = bootstrap_sql();
        for table in Table::ALL {
            assert!(
                sql.contains(&format!("CREATE TABLE IF NOT EXISTS {}", table.name())),
                "missing DDL for {}",
                table.name()
            );
        }
    }
}
