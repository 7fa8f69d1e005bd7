//! Database sessions
//!
//! A [`Session`] owns exactly one SQLite connection with foreign keys
//! enforced. Every query, insert, update and delete goes through it; there is
//! no global connection state.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use rusqlite::types::Value;
use rusqlite::{Connection, Row, params_from_iter};
use crate::query::mutation;
use crate::query::{Column, FromRow, IntoExpr, Query, Table, TableHandle};
use crate::{Error, Result};
use super::schema;

/// Where a session connects to, parsed from a connection string.
///
/// Accepted forms: `sqlite::memory:` or `:memory:` for an in-memory
/// database, `sqlite://<path>`, `sqlite:<path>` or a bare path for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    Memory,
    File(PathBuf),
}

impl FromStr for ConnectionTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if matches!(s, ":memory:" | "sqlite::memory:" | "sqlite://:memory:") {
            return Ok(ConnectionTarget::Memory);
        }

        let path = if let Some(rest) = s.strip_prefix("sqlite://") {
            rest
        } else if let Some(rest) = s.strip_prefix("sqlite:") {
            rest
        } else if s.contains("://") {
            return Err(Error::InvalidTarget(format!("unsupported scheme: {}", s)));
        } else {
            s
        };

        if path.is_empty() {
            return Err(Error::InvalidTarget(format!("missing database path: {:?}", s)));
        }
        Ok(ConnectionTarget::File(PathBuf::from(path)))
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionTarget::Memory => write!(f, "sqlite::memory:"),
            ConnectionTarget::File(path) => write!(f, "sqlite://{}", path.display()),
        }
    }
}

/// A single-connection database session
pub struct Session {
    conn: Connection,
    target: ConnectionTarget,
}

/// Open a session on `target`, run `f`, and close the session whatever `f`
/// returns. A close failure is reported only when `f` itself succeeded.
pub fn with_session<R>(
    target: &ConnectionTarget,
    f: impl FnOnce(&Session) -> Result<R>,
) -> Result<R> {
    let session = Session::connect(target)?;
    let result = f(&session);
    match session.close() {
        Ok(()) => result,
        Err(err) if result.is_ok() => Err(err),
        Err(err) => {
            tracing::warn!(error = %err, "closing session after failure");
            result
        }
    }
}

impl Session {
    pub fn connect(target: &ConnectionTarget) -> Result<Self> {
        let conn = match target {
            ConnectionTarget::Memory => Connection::open_in_memory()?,
            ConnectionTarget::File(path) => Connection::open(path)?,
        };
        let session = Self {
            conn,
            target: target.clone(),
        };
        session.configure()?;
        tracing::debug!(db = %session.target, "session opened");
        Ok(session)
    }

    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        Self::connect(&ConnectionTarget::File(path.to_path_buf()))
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::connect(&ConnectionTarget::Memory)
    }

    fn configure(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON")?;
        Ok(())
    }

    pub fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Close the connection, surfacing any error the close reports.
    /// Dropping a session also closes it, silently.
    pub fn close(self) -> Result<()> {
        tracing::debug!(db = %self.target, "session closing");
        self.conn.close().map_err(|(_, err)| Error::from(err))
    }

    // ========== Schema Operations ==========

    /// Create both tables; a no-op for tables that already exist
    pub fn create_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        tracing::info!("schema created");
        Ok(())
    }

    pub fn drop_schema(&self) -> Result<()> {
        for stmt in schema::DROP_TABLES {
            self.conn.execute(stmt, [])?;
        }
        tracing::info!("schema dropped");
        Ok(())
    }

    pub fn reset_schema(&self) -> Result<()> {
        self.drop_schema()?;
        self.create_schema()
    }

    /// Names of user tables, sorted
    pub fn table_names(&self) -> Result<Vec<String>> {
        self.raw_query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            &[],
            |row| row.get(0),
        )
    }

    // ========== Write Operations ==========

    pub fn insert<T: Table>(&self, record: &T) -> Result<()> {
        self.execute_raw(&mutation::insert_sql::<T>(), &record.to_values())?;
        Ok(())
    }

    /// Insert all records in one transaction; nothing is kept if any fails
    pub fn insert_all<T: Table>(&self, records: &[T]) -> Result<usize> {
        let sql = mutation::insert_sql::<T>();
        tracing::debug!(%sql, rows = records.len(), "insert_all");

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for record in records {
                stmt.execute(params_from_iter(record.to_values()))?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// Replace every row matched by `query` with `record`
    pub fn update<T: Table>(&self, query: &Query<T>, record: &T) -> Result<usize> {
        let (sql, params) = mutation::update_sql(query, record)?;
        self.execute_raw(&sql, &params)
    }

    /// Delete every row matched by `query`
    pub fn delete<T: Table>(&self, query: &Query<T>) -> Result<usize> {
        let (sql, params) = mutation::delete_sql(query)?;
        self.execute_raw(&sql, &params)
    }

    /// Run one raw statement, returning the number of rows changed
    pub fn execute_raw(&self, sql: &str, params: &[Value]) -> Result<usize> {
        tracing::debug!(%sql, params = params.len(), "execute");
        Ok(self.conn.execute(sql, params_from_iter(params.iter()))?)
    }

    // ========== Read Operations ==========

    /// Run `query` and decode every row
    pub fn fetch<T: FromRow>(&self, query: &Query<T>) -> Result<Vec<T>> {
        let (sql, params) = query.to_sql();
        tracing::debug!(%sql, params = params.len(), "fetch");

        let mut stmt = self.conn.prepare(&sql)?;
        if stmt.column_count() != T::WIDTH {
            return Err(Error::Decode(format!(
                "query yields {} columns but {} decodes {}",
                stmt.column_count(),
                std::any::type_name::<T>(),
                T::WIDTH
            )));
        }

        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| T::from_row_at(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// First row of `query`, if any
    pub fn first<T: FromRow>(&self, query: &Query<T>) -> Result<Option<T>> {
        Ok(self.fetch(&query.clone().take(1))?.into_iter().next())
    }

    /// The single value of a one-row query such as an aggregate
    pub fn scalar<T: FromRow>(&self, query: &Query<T>) -> Result<T> {
        self.first(query)?
            .ok_or_else(|| Error::Query("scalar query returned no rows".to_string()))
    }

    /// Look a record up by primary key
    pub fn find<T: Table>(&self, key: impl IntoExpr) -> Result<Option<T>> {
        let primary_key = Column::new(T::NAME, T::PRIMARY_KEY);
        let query = TableHandle::<T>::new().query().filter(primary_key.equals(key));
        self.first(&query)
    }

    /// Pair the rows of two queries by position, stopping at the shorter one
    pub fn zip<A: FromRow, B: FromRow>(&self, left: &Query<A>, right: &Query<B>) -> Result<Vec<(A, B)>> {
        let left = self.fetch(left)?;
        let right = self.fetch(right)?;
        Ok(left.into_iter().zip(right).collect())
    }

    /// Run raw SQL text, decoding each row with `decode`
    pub fn raw_query<T, F>(&self, sql: &str, params: &[Value], mut decode: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        tracing::debug!(%sql, params = params.len(), "raw query");
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| decode(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Run raw SQL text, returning column names and untyped values
    pub fn raw_rows(&self, sql: &str, params: &[Value]) -> Result<(Vec<String>, Vec<Vec<Value>>)> {
        tracing::debug!(%sql, params = params.len(), "raw rows");
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                (0..width)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Vec<Value>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((columns, rows))
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            suppliers: self.scalar(&schema::SUPPLIERS.query().count())? as usize,
            coffees: self.scalar(&schema::COFFEES.query().count())? as usize,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbStats {
    pub suppliers: usize,
    pub coffees: usize,
}

impl fmt::Display for DbStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Suppliers: {}", self.suppliers)?;
        write!(f, "  Coffees: {}", self.coffees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_memory_targets() {
        for s in [":memory:", "sqlite::memory:", " sqlite://:memory: "] {
            assert_eq!(s.parse::<ConnectionTarget>().unwrap(), ConnectionTarget::Memory);
        }
    }

    #[test]
    fn test_parse_file_targets() {
        let expected = ConnectionTarget::File(PathBuf::from("data/coffee.db"));
        assert_eq!("sqlite://data/coffee.db".parse::<ConnectionTarget>().unwrap(), expected);
        assert_eq!("sqlite:data/coffee.db".parse::<ConnectionTarget>().unwrap(), expected);
        assert_eq!("data/coffee.db".parse::<ConnectionTarget>().unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        let err = "postgres://localhost/coffee".parse::<ConnectionTarget>().unwrap_err();
        assert!(matches!(err, Error::InvalidTarget(_)));
        assert!("sqlite://".parse::<ConnectionTarget>().is_err());
        assert!("".parse::<ConnectionTarget>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for target in [ConnectionTarget::Memory, ConnectionTarget::File(PathBuf::from("a/b.db"))] {
            let parsed: ConnectionTarget = target.to_string().parse().unwrap();
            assert_eq!(parsed, target);
        }
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let session = Session::open_in_memory().unwrap();
        let enabled: i64 = session
            .connection()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_schema_create_is_idempotent() {
        let session = Session::open_in_memory().unwrap();
        session.create_schema().unwrap();
        session.create_schema().unwrap();
        assert_eq!(session.table_names().unwrap(), vec!["COFFEES", "SUPPLIERS"]);

        session.drop_schema().unwrap();
        assert!(session.table_names().unwrap().is_empty());
    }

    #[test]
    fn test_with_session_closes_on_error() {
        let result: Result<()> = with_session(&ConnectionTarget::Memory, |session| {
            session.create_schema()?;
            Err(Error::Query("boom".into()))
        });
        assert!(matches!(result, Err(Error::Query(_))));
    }

    #[test]
    fn test_unreachable_database_is_connection_error() {
        let err = Session::open(Path::new("/nonexistent-dir/deeper/coffee.db")).err().unwrap();
        assert!(matches!(err, Error::Connection(_)), "got {:?}", err);
    }
}
