//! User account queries.

use chrono::Utc;
use rusqlite::{ErrorCode, OptionalExtension, Row, params};
use tracing::debug;

use super::error::{DatabaseResultExt, Result, StoreError};
use super::{User, format_timestamp, parse_timestamp};

const INSERT_USER_SQL: &str = "INSERT INTO users (username, password_hash, profile_pic, created_at) VALUES (?1, ?2, ?3, ?4)";
const SELECT_USER_BY_NAME_SQL: &str =
    "SELECT id, username, password_hash, profile_pic, created_at FROM users WHERE username = ?1";
const SELECT_USER_BY_ID_SQL: &str =
    "SELECT id, username, password_hash, profile_pic, created_at FROM users WHERE id = ?1";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        profile_pic: row.get(3)?,
        created_at: parse_timestamp(4, &row.get::<_, String>(4)?)?,
    })
}

impl super::Store {
    /// Registers a new account
    ///
    /// Fails with `UserExists` when the username is taken.
    pub fn create_user(&self, username: &str, password_hash: Option<&str>) -> Result<User> {
        debug!(%username, "create_user: called");
        let conn = self.conn()?;
        let now = Utc::now();

        match conn.execute(
            INSERT_USER_SQL,
            params![username, password_hash, Option::<String>::None, format_timestamp(now)],
        ) {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                debug!(%username, "create_user: username taken");
                return Err(StoreError::UserExists {
                    username: username.to_string(),
                });
            }
            Err(e) => return Err(StoreError::database("Failed to insert user", e)),
        }

        Ok(User {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.map(str::to_string),
            profile_pic: None,
            created_at: now,
        })
    }

    /// Looks up an account by username
    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        debug!(%username, "find_user_by_username: called");
        self.conn()?
            .query_row(SELECT_USER_BY_NAME_SQL, params![username], user_from_row)
            .optional()
            .db_context("Failed to query user")
    }

    /// Looks up an account by id
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        debug!(%id, "get_user: called");
        self.conn()?
            .query_row(SELECT_USER_BY_ID_SQL, params![id], user_from_row)
            .optional()
            .db_context("Failed to query user")
    }
}

#[cfg(test)]
mod tests {
    use super::super::Store;
    use super::*;

    #[test]
    fn test_create_and_find_user() {
        let store = Store::open_in_memory().unwrap();
        let user = store.create_user("ada", Some("$argon2id$hash")).unwrap();

        assert!(user.id > 0);
        let found = store.find_user_by_username("ada").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.password_hash.as_deref(), Some("$argon2id$hash"));
        assert_eq!(store.get_user(user.id).unwrap().unwrap().username, "ada");
    }

    #[test]
    fn test_duplicate_username() {
        let store = Store::open_in_memory().unwrap();
        store.create_user("ada", None).unwrap();
        let err = store.create_user("ada", None).unwrap_err();
        assert!(matches!(err, StoreError::UserExists { ref username } if username == "ada"));
    }

    #[test]
    fn test_missing_user() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.find_user_by_username("ghost").unwrap().is_none());
        assert!(store.get_user(42).unwrap().is_none());
    }
}
