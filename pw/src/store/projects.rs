//! Saved plan queries.

use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};
use tracing::debug;

use super::error::{DatabaseResultExt, Result, StoreError};
use super::{HistoryEntry, StoredProject, format_timestamp, parse_timestamp};

const INSERT_PROJECT_SQL: &str = "INSERT INTO projects (title, data, created_at, user_id) VALUES (?1, ?2, ?3, ?4)";
const SELECT_PROJECT_SQL: &str = "SELECT id, title, data, created_at, user_id FROM projects WHERE id = ?1";
const LIST_PROJECTS_SQL: &str = "SELECT id, title, data, created_at, user_id FROM projects \
     WHERE user_id = ?1 ORDER BY created_at DESC, id DESC";

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<StoredProject> {
    Ok(StoredProject {
        id: row.get(0)?,
        title: row.get(1)?,
        data: row.get(2)?,
        created_at: parse_timestamp(3, &row.get::<_, String>(3)?)?,
        owner_id: row.get(4)?,
    })
}

impl super::Store {
    /// Saves a serialized plan for `owner_id`
    pub fn create_project(&self, owner_id: i64, title: &str, data: &str) -> Result<StoredProject> {
        debug!(%owner_id, %title, data_len = data.len(), "create_project: called");
        let conn = self.conn()?;
        let now = Utc::now();

        conn.execute(INSERT_PROJECT_SQL, params![title, data, format_timestamp(now), owner_id])
            .map_err(|e| StoreError::from_owner_insert(owner_id, "Failed to insert project", e))?;

        Ok(StoredProject {
            id: conn.last_insert_rowid(),
            title: title.to_string(),
            data: data.to_string(),
            created_at: now,
            owner_id,
        })
    }

    /// Fetches a project by id regardless of owner
    pub fn get_project(&self, id: i64) -> Result<Option<StoredProject>> {
        debug!(%id, "get_project: called");
        self.conn()?
            .query_row(SELECT_PROJECT_SQL, params![id], project_from_row)
            .optional()
            .db_context("Failed to query project")
    }

    /// All projects of `owner_id`, most recent first
    pub fn list_projects(&self, owner_id: i64) -> Result<Vec<StoredProject>> {
        debug!(%owner_id, "list_projects: called");
        let conn = self.conn()?;
        let mut stmt = conn.prepare(LIST_PROJECTS_SQL).db_context("Failed to prepare query")?;
        let rows = stmt
            .query_map(params![owner_id], project_from_row)
            .db_context("Failed to query projects")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read project row")
    }

    /// History listing for `owner_id`
    pub fn history(&self, owner_id: i64) -> Result<Vec<HistoryEntry>> {
        Ok(self.list_projects(owner_id)?.iter().map(HistoryEntry::from).collect())
    }
}
