//! SQLite-backed reference store.

use std::path::{Path, PathBuf};

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, OpenFlags, ToSql, params_from_iter};
use tabnorm_model::{CellValue, ReferenceRecord};
use tracing::debug;

use crate::error::{ReferenceError, Result};
use crate::store::{QueryParam, ReferenceStore};

/// Reference store reading from a SQLite database file.
///
/// No connection is held between calls: each [`fetch`](ReferenceStore::fetch)
/// opens a read-only connection, runs the query and drops the connection
/// before returning, on success and on failure alike.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| ReferenceError::Connection {
            path: self.path.clone(),
            source,
        })
    }
}

impl ReferenceStore for SqliteStore {
    fn fetch(&self, query: &str, params: &[QueryParam]) -> Result<Vec<ReferenceRecord>> {
        let conn = self.connect()?;
        debug!(
            path = %self.path.display(),
            query,
            params = params.len(),
            "running reference query"
        );
        run_query(&conn, query, params)
    }
}

fn run_query(
    conn: &Connection,
    query: &str,
    params: &[QueryParam],
) -> Result<Vec<ReferenceRecord>> {
    let mut stmt = conn
        .prepare(query)
        .map_err(|e| ReferenceError::query(query, e))?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut rows = stmt
        .query(params_from_iter(params.iter()))
        .map_err(|e| ReferenceError::query(query, e))?;

    let mut records = Vec::new();
    while let Some(row) = rows.next().map_err(|e| ReferenceError::query(query, e))? {
        let mut record = ReferenceRecord::new();
        for (idx, name) in columns.iter().enumerate() {
            let value = row
                .get_ref(idx)
                .map_err(|e| ReferenceError::query(query, e))?;
            record.insert(name.clone(), cell_from_sql(value));
        }
        records.push(record);
    }
    Ok(records)
}

fn cell_from_sql(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(v) => CellValue::Integer(v),
        ValueRef::Real(v) => CellValue::Decimal(v),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            CellValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

impl ToSql for QueryParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            QueryParam::Null => ToSqlOutput::from(rusqlite::types::Null),
            QueryParam::Integer(value) => ToSqlOutput::from(*value),
            QueryParam::Text(value) => ToSqlOutput::from(value.as_str()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed_db(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("reference.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE estados (id INTEGER, estado TEXT, area REAL);
             INSERT INTO estados VALUES (1, 'SP', 248.2), (2, 'RJ', 43.7), (3, NULL, NULL);",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_fetch_maps_sqlite_types() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::new(seed_db(&dir));

        let rows = store
            .fetch("SELECT id, estado, area FROM estados ORDER BY id", &[])
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["id"], CellValue::Integer(1));
        assert_eq!(rows[0]["estado"], CellValue::text("SP"));
        assert_eq!(rows[1]["area"], CellValue::Decimal(43.7));
        assert_eq!(rows[2]["estado"], CellValue::Null);
    }

    #[test]
    fn test_fetch_binds_params() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::new(seed_db(&dir));

        let rows = store
            .fetch(
                "SELECT id FROM estados WHERE estado = ?1",
                &[QueryParam::from("RJ")],
            )
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], CellValue::Integer(2));
    }

    #[test]
    fn test_missing_database_is_connection_error() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::new(dir.path().join("absent.db"));

        let result = store.fetch("SELECT 1", &[]);
        assert!(matches!(result, Err(ReferenceError::Connection { .. })));
    }

    #[test]
    fn test_bad_sql_is_query_error() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::new(seed_db(&dir));

        let result = store.fetch("SELECT * FROM municipios", &[]);
        assert!(matches!(result, Err(ReferenceError::Query { .. })));
    }

    #[test]
    fn test_store_is_read_only() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::new(seed_db(&dir));

        let result = store.fetch("DELETE FROM estados", &[]);
        assert!(result.is_err());
        let rows = store.fetch("SELECT id FROM estados", &[]).unwrap();
        assert_eq!(rows.len(), 3);
    }
}
