use rusqlite::ErrorCode;
use rusqlite::ffi;
use thiserror::Error;
use warbler_crypto::CredentialError;

#[derive(Debug, Error)]
pub enum DbError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// A uniqueness constraint rejected the write. Carries the offending field(s).
    #[error("{0} already taken")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("database error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("database lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Constraint failures are translated here so callers never see raw SQLite
/// errors for bad input.
impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        let rusqlite::Error::SqliteFailure(code, Some(msg)) = &err else {
            return DbError::Sqlite(err);
        };
        if code.code != ErrorCode::ConstraintViolation {
            return DbError::Sqlite(err);
        }

        // SQLite error: "UNIQUE constraint failed: users.username"
        if let Some(columns) = msg.strip_prefix("UNIQUE constraint failed: ") {
            return DbError::Conflict(column_names(columns));
        }

        match code.extended_code {
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => DbError::NotFound("Referenced record".into()),
            ffi::SQLITE_CONSTRAINT_NOTNULL | ffi::SQLITE_CONSTRAINT_CHECK => {
                DbError::Validation(msg.clone())
            }
            _ => DbError::Sqlite(err),
        }
    }
}

/// "users.username, users.email" -> "username, email"
fn column_names(columns: &str) -> String {
    columns
        .split(", ")
        .map(|c| c.rsplit('.').next().unwrap_or(c))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn scratch() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        conn.execute_batch(
            "CREATE TABLE parent (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);
             CREATE TABLE child (id INTEGER PRIMARY KEY,
                                 parent_id INTEGER NOT NULL REFERENCES parent(id),
                                 body TEXT CHECK (length(body) < 4));
             INSERT INTO parent (id, name) VALUES (1, 'a');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn unique_violation_names_the_column() {
        let conn = scratch();
        let err: DbError = conn
            .execute("INSERT INTO parent (id, name) VALUES (2, 'a')", [])
            .unwrap_err()
            .into();
        match err {
            DbError::Conflict(field) => assert_eq!(field, "name"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn foreign_key_violation_is_not_found() {
        let conn = scratch();
        let err: DbError = conn
            .execute("INSERT INTO child (parent_id, body) VALUES (99, 'x')", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[test]
    fn not_null_and_check_are_validation() {
        let conn = scratch();
        let err: DbError = conn
            .execute("INSERT INTO parent (id, name) VALUES (3, NULL)", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, DbError::Validation(_)));

        let err: DbError = conn
            .execute("INSERT INTO child (parent_id, body) VALUES (1, 'toolong')", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[test]
    fn other_errors_pass_through() {
        let conn = scratch();
        let err: DbError = conn.execute("SELECT * FROM nowhere", []).unwrap_err().into();
        assert!(matches!(err, DbError::Sqlite(_)));
    }

    #[test]
    fn composite_columns() {
        assert_eq!(
            column_names("follows.user_being_followed_id, follows.user_following_id"),
            "user_being_followed_id, user_following_id"
        );
    }
}
