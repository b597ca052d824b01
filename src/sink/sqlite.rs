//! SQLite sink implementation
//!
//! One row per harvested project; enrichment columns are NULL or zero when
//! the record carries no repository statistics.

use crate::record::Record;
use crate::sink::traits::{RecordSink, SinkResult};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite-backed record sink
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> SinkResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Number of records persisted so far
    pub fn count_records(&self) -> SinkResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            maintainer TEXT NOT NULL,
            maintainer_email TEXT,
            repo_url TEXT,
            repo_name TEXT,
            repo_description TEXT,
            repo_html_url TEXT,
            repo_stargazers_count INTEGER NOT NULL DEFAULT 0,
            repo_forks_count INTEGER NOT NULL DEFAULT 0,
            repo_open_issues_count INTEGER NOT NULL DEFAULT 0,
            repo_language TEXT,
            repo_created_at TEXT,
            repo_updated_at TEXT,
            repo_watchers_count INTEGER NOT NULL DEFAULT 0,
            inserted_at TEXT NOT NULL
        );
    ",
    )
}

impl RecordSink for SqliteSink {
    fn insert(&mut self, record: &Record) -> SinkResult<()> {
        let repo = record.repo.clone().unwrap_or_default();
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO projects (
                title, description, maintainer, maintainer_email, repo_url,
                repo_name, repo_description, repo_html_url,
                repo_stargazers_count, repo_forks_count, repo_open_issues_count,
                repo_language, repo_created_at, repo_updated_at,
                repo_watchers_count, inserted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                record.title,
                record.description,
                record.maintainer,
                record.maintainer_email,
                record.repo_url,
                repo.name,
                repo.description,
                repo.html_url,
                repo.stargazers_count as i64,
                repo.forks_count as i64,
                repo.open_issues_count as i64,
                repo.language,
                repo.created_at.map(|t| t.to_rfc3339()),
                repo.updated_at.map(|t| t.to_rfc3339()),
                repo.watchers_count as i64,
                now,
            ],
        )?;

        Ok(())
    }
}
