use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Transaction, TransactionBehavior, params};

use super::Fact;
use super::schema::SCHEMA;
use super::sequence;
use crate::error::{Error, Result};
use crate::types::Kind;

/// A persistent fact store backed by one SQLite file.
///
/// Reads and writes go through a single connection guarded by a mutex.
/// Every write runs in an immediate transaction, so a logical update is
/// either fully visible or not at all.
pub struct FactStore {
    conn: Mutex<Connection>,
}

impl FactStore {
    /// Opens (or creates) the store at `db_path`. Failure here is fatal for
    /// callers: no retry is attempted.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let conn = Connection::open(path)
            .map_err(|e| Error::StoreUnavailable(format!("{}: {e}", path.display())))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| Error::StoreUnavailable(format!("{}: {e}", path.display())))?;
        tracing::debug!("Opened fact store at {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::StoreUnavailable(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Runs `f` against the current committed state.
    pub fn read<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.conn();
        f(&conn)
    }

    /// Runs `f` inside one immediate transaction and commits if it succeeds.
    /// An error from `f` rolls back every statement it issued.
    pub fn write<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&tx)?;
        tx.commit()
            .map_err(|e| Error::StoreUnavailable(format!("commit failed: {e}")))?;
        Ok(out)
    }

    /// Current high-water mark of the `kind` counter.
    pub fn get_next(&self, kind: Kind) -> Result<i64> {
        self.read(|conn| sequence::get_next(conn, kind))
    }

    /// Allocates the next id for `kind` in its own transaction.
    pub fn increment(&self, kind: Kind) -> Result<i64> {
        self.write(|tx| sequence::increment(tx, kind))
    }

    pub fn count_facts(&self) -> Result<i64> {
        let conn = self.conn();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM facts", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Every fact whose subject is `subject`.
pub fn facts_about(conn: &Connection, subject: &str) -> Result<Vec<Fact>> {
    let mut stmt = conn.prepare_cached(
        "SELECT subject, predicate, object FROM facts WHERE subject = ?1 ORDER BY predicate, object",
    )?;

    let rows = stmt.query_map(params![subject], |row| {
        Ok(Fact {
            subject: row.get(0)?,
            predicate: row.get(1)?,
            object: row.get(2)?,
        })
    })?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

pub fn has_fact(conn: &Connection, fact: &Fact) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM facts WHERE subject = ?1 AND predicate = ?2 AND object = ?3",
        params![fact.subject, fact.predicate, fact.object],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Batch;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_tables() {
        let temp = TempDir::new().unwrap();
        let store = FactStore::open(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();

        let conn = store.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"facts".to_string()));
    }

    #[test]
    fn test_open_missing_directory_is_unavailable() {
        let temp = TempDir::new().unwrap();
        let result = FactStore::open(temp.path().join("missing").join("test.db"));
        assert!(matches!(result, Err(Error::StoreUnavailable(_))));
    }

    #[test]
    fn test_open_non_database_file_is_unavailable() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("garbage.db");
        std::fs::write(&path, vec![0x5a_u8; 4096]).unwrap();

        let result = FactStore::open(&path);
        assert!(matches!(result, Err(Error::StoreUnavailable(_))));
    }

    #[test]
    fn test_write_rolls_back_on_error() {
        let store = FactStore::open_in_memory().unwrap();
        store.initialize().unwrap();

        let result: Result<()> = store.write(|tx| {
            let mut batch = Batch::default();
            batch.add(Fact::new("user:1", "name", "Ada"));
            batch.apply(tx)?;
            Err(Error::Conflict("abort".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(store.count_facts().unwrap(), 0);
    }

    #[test]
    fn test_facts_about() {
        let store = FactStore::open_in_memory().unwrap();
        store.initialize().unwrap();

        store
            .write(|tx| {
                let mut batch = Batch::default();
                batch.add(Fact::new("user:1", "name", "Ada"));
                batch.add(Fact::new("user:1", "email", "ada@example.com"));
                batch.add(Fact::new("user:2", "name", "Grace"));
                batch.apply(tx)
            })
            .unwrap();

        let facts = store.read(|conn| facts_about(conn, "user:1")).unwrap();
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].predicate, "email");

        let present = store
            .read(|conn| has_fact(conn, &Fact::new("user:2", "name", "Grace")))
            .unwrap();
        assert!(present);
    }
}
