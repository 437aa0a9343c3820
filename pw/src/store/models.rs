//! Stored records

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Characters of the executive summary shown in history listings
pub const SUMMARY_SNIPPET_CHARS: usize = 100;

/// A registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// PHC-format argon2 hash; `None` for accounts created by an external identity provider
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub profile_pic: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A server-side login session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A generated plan saved for its owner
///
/// `data` holds the plan exactly as serialized at generation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredProject {
    pub id: i64,
    pub title: String,
    pub data: String,
    pub created_at: DateTime<Utc>,
    pub owner_id: i64,
}

impl StoredProject {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == user_id
    }
}

/// One row of a user's history listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub title: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub summary: String,
}

impl From<&StoredProject> for HistoryEntry {
    fn from(project: &StoredProject) -> Self {
        // Stored data is ours, but tolerate rows that don't parse
        let summary: String = serde_json::from_str::<serde_json::Value>(&project.data)
            .ok()
            .and_then(|v| v.get("executive_summary").and_then(|s| s.as_str()).map(str::to_string))
            .unwrap_or_default()
            .chars()
            .take(SUMMARY_SNIPPET_CHARS)
            .collect();

        Self {
            id: project.id,
            title: project.title.clone(),
            date: project.created_at.format("%Y-%m-%d").to_string(),
            summary: format!("{summary}..."),
        }
    }
}
