use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use super::CandidateStore;
use crate::error::{IntakeError, Result};
use crate::types::{CandidateField, CandidateFilter, CandidateRecord, StoredCandidate};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS candidates (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name   TEXT,
        last_name    TEXT,
        email        TEXT,
        phone        TEXT,
        job_title    TEXT,
        company_name TEXT,
        country      TEXT
    );
"#;

const INSERT_SQL: &str = "INSERT INTO candidates (first_name, last_name, email, phone, job_title, company_name, country)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

const SELECT_COLUMNS: &str =
    "SELECT id, first_name, last_name, email, phone, job_title, company_name, country FROM candidates";

/// SQLite-backed candidate store.
///
/// `AUTOINCREMENT` keeps identifiers monotonic even after rows disappear,
/// so an identifier is never handed out twice.
pub struct SqliteCandidateStore {
    conn: Mutex<Connection>,
}

impl SqliteCandidateStore {
    /// Open (or create) the database file and ensure the candidates table exists
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        info!("Opened candidate store at {}", path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| IntakeError::StoreUnavailable("sqlite connection lock poisoned".to_string()))
    }

    fn insert_with(conn: &Connection, record: &CandidateRecord) -> Result<i64> {
        let mut stmt = conn.prepare_cached(INSERT_SQL)?;
        stmt.execute(params![
            record.first_name,
            record.last_name,
            record.email,
            record.phone,
            record.job_title,
            record.company_name,
            record.country,
        ])?;
        Ok(conn.last_insert_rowid())
    }

    fn text(row: &Row<'_>, index: usize) -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(index)?.unwrap_or_default())
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<StoredCandidate> {
        Ok(StoredCandidate {
            id: row.get(0)?,
            record: CandidateRecord {
                first_name: Self::text(row, 1)?,
                last_name: Self::text(row, 2)?,
                email: Self::text(row, 3)?,
                phone: Self::text(row, 4)?,
                job_title: Self::text(row, 5)?,
                company_name: Self::text(row, 6)?,
                country: Self::text(row, 7)?,
            },
        })
    }

    /// Build the filtered SELECT. Column names come from `CandidateField`, never from input.
    fn select_sql(active: &[(CandidateField, &str)]) -> String {
        let mut sql = SELECT_COLUMNS.to_string();
        if !active.is_empty() {
            let clauses: Vec<String> = active
                .iter()
                .enumerate()
                .map(|(i, (field, _))| format!("instr(COALESCE({}, ''), ?{}) > 0", field.column(), i + 1))
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id");
        sql
    }
}

#[async_trait]
impl CandidateStore for SqliteCandidateStore {
    async fn insert(&self, record: &CandidateRecord) -> Result<i64> {
        let conn = self.lock()?;
        let id = Self::insert_with(&conn, record)?;
        debug!("Created candidate with id {}", id);
        Ok(id)
    }

    async fn insert_batch_with(
        &self,
        records: &[CandidateRecord],
        before_commit: &mut (dyn for<'ids> FnMut(&'ids [i64]) -> Result<()> + Send),
    ) -> Result<Vec<i64>> {
        let mut conn = self.lock()?;
        // Dropping the transaction without commit rolls the whole batch back
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            ids.push(Self::insert_with(&tx, record)?);
        }
        before_commit(&ids)?;
        tx.commit()?;

        debug!("Committed batch of {} candidates", ids.len());
        Ok(ids)
    }

    async fn query(&self, filter: &CandidateFilter) -> Result<Vec<StoredCandidate>> {
        let active = filter.active();
        let sql = Self::select_sql(&active);
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(active.iter().map(|(_, v)| *v)), Self::map_row)?;
        let candidates = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(candidates)
    }

    async fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM candidates", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
