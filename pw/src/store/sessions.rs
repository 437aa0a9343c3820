//! Login session queries.

use chrono::{Duration, Utc};
use rusqlite::{OptionalExtension, params};
use tracing::debug;
use uuid::Uuid;

use super::error::{DatabaseResultExt, Result, StoreError};
use super::{Session, User, format_timestamp, parse_timestamp};

const INSERT_SESSION_SQL: &str = "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)";
const SELECT_SESSION_SQL: &str = "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ?1";
const DELETE_SESSION_SQL: &str = "DELETE FROM sessions WHERE token = ?1";
const DELETE_EXPIRED_SESSIONS_SQL: &str = "DELETE FROM sessions WHERE expires_at <= ?1";

impl super::Store {
    /// Starts a session for `user_id` lasting `ttl`
    pub fn create_session(&self, user_id: i64, ttl: Duration) -> Result<Session> {
        debug!(%user_id, ttl_secs = ttl.num_seconds(), "create_session: called");
        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            user_id,
            created_at: now,
            expires_at: now + ttl,
        };

        self.conn()?
            .execute(
                INSERT_SESSION_SQL,
                params![
                    session.token,
                    session.user_id,
                    format_timestamp(session.created_at),
                    format_timestamp(session.expires_at)
                ],
            )
            .map_err(|e| StoreError::from_owner_insert(user_id, "Failed to insert session", e))?;

        Ok(session)
    }

    /// Fetches a session record, expired or not
    pub fn get_session(&self, token: &str) -> Result<Option<Session>> {
        self.conn()?
            .query_row(SELECT_SESSION_SQL, params![token], |row| {
                Ok(Session {
                    token: row.get(0)?,
                    user_id: row.get(1)?,
                    created_at: parse_timestamp(2, &row.get::<_, String>(2)?)?,
                    expires_at: parse_timestamp(3, &row.get::<_, String>(3)?)?,
                })
            })
            .optional()
            .db_context("Failed to query session")
    }

    /// Resolves a session token to its user
    ///
    /// Unknown and expired tokens both yield `None`; finding an expired
    /// session purges every expired row.
    pub fn session_user(&self, token: &str) -> Result<Option<User>> {
        debug!("session_user: called");
        let Some(session) = self.get_session(token)? else {
            return Ok(None);
        };

        let now = Utc::now();
        if session.is_expired(now) {
            debug!(user_id = session.user_id, "session_user: session expired");
            self.conn()?
                .execute(DELETE_EXPIRED_SESSIONS_SQL, params![format_timestamp(now)])
                .db_context("Failed to purge expired sessions")?;
            return Ok(None);
        }

        self.get_user(session.user_id)
    }

    /// Ends a session; deleting an unknown token is not an error
    pub fn delete_session(&self, token: &str) -> Result<bool> {
        debug!("delete_session: called");
        let deleted = self
            .conn()?
            .execute(DELETE_SESSION_SQL, params![token])
            .db_context("Failed to delete session")?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::Store;
    use super::*;

    #[test]
    fn test_session_resolves_user() {
        let store = Store::open_in_memory().unwrap();
        let user = store.create_user("ada", None).unwrap();
        let session = store.create_session(user.id, Duration::hours(1)).unwrap();

        assert_eq!(session.token.len(), 32);
        let resolved = store.session_user(&session.token).unwrap().unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[test]
    fn test_tokens_are_unique() {
        let store = Store::open_in_memory().unwrap();
        let user = store.create_user("ada", None).unwrap();
        let a = store.create_session(user.id, Duration::hours(1)).unwrap();
        let b = store.create_session(user.id, Duration::hours(1)).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_expired_session_is_anonymous_and_purged() {
        let store = Store::open_in_memory().unwrap();
        let user = store.create_user("ada", None).unwrap();
        let session = store.create_session(user.id, Duration::seconds(-1)).unwrap();

        assert!(store.session_user(&session.token).unwrap().is_none());
        assert!(store.get_session(&session.token).unwrap().is_none());
    }

    #[test]
    fn test_expired_purge_keeps_live_sessions() {
        let store = Store::open_in_memory().unwrap();
        let user = store.create_user("ada", None).unwrap();
        let live = store.create_session(user.id, Duration::hours(1)).unwrap();
        let stale = store.create_session(user.id, Duration::seconds(-1)).unwrap();

        assert!(store.session_user(&stale.token).unwrap().is_none());
        assert!(store.get_session(&stale.token).unwrap().is_none());
        assert_eq!(store.session_user(&live.token).unwrap().unwrap().id, user.id);
    }

    #[test]
    fn test_delete_session() {
        let store = Store::open_in_memory().unwrap();
        let user = store.create_user("ada", None).unwrap();
        let session = store.create_session(user.id, Duration::hours(1)).unwrap();

        assert!(store.delete_session(&session.token).unwrap());
        assert!(!store.delete_session(&session.token).unwrap());
        assert!(store.session_user(&session.token).unwrap().is_none());
    }

    #[test]
    fn test_session_for_missing_user() {
        let store = Store::open_in_memory().unwrap();
        let err = store.create_session(99, Duration::hours(1)).unwrap_err();
        assert!(matches!(err, StoreError::UserNotFound { id: 99 }));
    }
}
