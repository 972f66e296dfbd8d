use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};
use warbler_crypto::{hash_password, verify_password};

use crate::models::{DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL, NewUser, ProfileUpdate, UserRow, UserStats};
use crate::{Database, DbError, Result};

impl Database {
    // -- Signup / authentication --

    /// Create a user with a hashed password.
    /// Duplicate username or email surfaces as `DbError::Conflict`.
    pub fn signup(&self, new: &NewUser<'_>) -> Result<UserRow> {
        let username = required("Username", new.username)?;
        let email = required("Email", new.email)?;
        let password = match new.password {
            Some(p) if !p.is_empty() => p,
            _ => return Err(DbError::Validation("Password must not be empty".into())),
        };

        // Hash before taking the connection lock; argon2 is slow on purpose.
        let password_hash = hash_password(password)?;

        let user = self.with_tx(|conn| {
            insert_user(conn, username, email, &password_hash, new.image_url)
        })?;

        info!(user_id = user.id, "User signed up: {}", user.username);
        Ok(user)
    }

    /// Returns the user when the password verifies. Unknown username and
    /// wrong password both yield `None`. The username is trimmed the same
    /// way signup trims it.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<UserRow>> {
        let user = self.get_user_by_username(username.trim())?;
        Ok(user.filter(|u| verify_password(password, &u.password)))
    }

    // -- Lookup --

    pub fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {} FROM users u WHERE u.username = ?1", UserRow::COLUMNS),
                    [username],
                    UserRow::from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// All users ordered by username, optionally narrowed to usernames
    /// containing `q` (ASCII case-insensitive).
    pub fn search_users(&self, q: Option<&str>) -> Result<Vec<UserRow>> {
        let pattern = match q.map(str::trim) {
            Some(q) if !q.is_empty() => format!("%{}%", escape_like(q)),
            _ => "%".to_string(),
        };

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM users u WHERE u.username LIKE ?1 ESCAPE '\\' ORDER BY u.username",
                UserRow::COLUMNS
            ))?;
            let rows = stmt
                .query_map([pattern], UserRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn user_stats(&self, id: i64) -> Result<UserStats> {
        self.with_conn(|conn| {
            let stats = conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM messages WHERE user_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE user_following_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE user_being_followed_id = ?1),
                    (SELECT COUNT(*) FROM likes WHERE user_id = ?1)",
                [id],
                |row| {
                    Ok(UserStats {
                        messages: row.get(0)?,
                        following: row.get(1)?,
                        followers: row.get(2)?,
                        likes: row.get(3)?,
                    })
                },
            )?;
            Ok(stats)
        })
    }

    // -- Mutation --

    /// Apply profile edits after re-checking the user's password.
    pub fn update_profile(&self, id: i64, password: &str, update: &ProfileUpdate) -> Result<UserRow> {
        let current = self
            .get_user(id)?
            .ok_or_else(|| DbError::NotFound("User".into()))?;
        if !verify_password(password, &current.password) {
            return Err(DbError::InvalidCredentials);
        }

        let user = self.with_tx(|conn| apply_profile_update(conn, id, update))?;
        info!(user_id = id, "Profile updated");
        Ok(user)
    }

    /// Delete a user and everything hanging off them in one transaction.
    /// Returns false when the user did not exist.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        let removed = self.with_tx(|conn| delete_user_cascade(conn, id))?;
        if removed {
            info!(user_id = id, "User deleted");
        }
        Ok(removed)
    }
}

pub fn insert_user(
    conn: &Connection,
    username: &str,
    email: &str,
    password_hash: &str,
    image_url: Option<&str>,
) -> Result<UserRow> {
    let image_url = non_empty(image_url).unwrap_or(DEFAULT_IMAGE_URL);

    conn.execute(
        "INSERT INTO users (username, email, password, image_url, header_image_url)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![username, email, password_hash, image_url, DEFAULT_HEADER_IMAGE_URL],
    )?;

    let id = conn.last_insert_rowid();
    query_user_by_id(conn, id)?.ok_or_else(|| DbError::NotFound("User".into()))
}

pub fn apply_profile_update(conn: &Connection, id: i64, update: &ProfileUpdate) -> Result<UserRow> {
    let current = query_user_by_id(conn, id)?.ok_or_else(|| DbError::NotFound("User".into()))?;

    let username = match update.username.as_deref() {
        Some(u) => required("Username", u)?,
        None => current.username.as_str(),
    };
    let email = match update.email.as_deref() {
        Some(e) => required("Email", e)?,
        None => current.email.as_str(),
    };
    let image_url = match update.image_url.as_deref() {
        Some(url) => non_empty(Some(url)).unwrap_or(DEFAULT_IMAGE_URL),
        None => current.image_url.as_str(),
    };
    let header_image_url = match update.header_image_url.as_deref() {
        Some(url) => non_empty(Some(url)).unwrap_or(DEFAULT_HEADER_IMAGE_URL),
        None => current.header_image_url.as_str(),
    };
    let bio = match update.bio.as_deref() {
        Some(bio) => non_empty(Some(bio)),
        None => current.bio.as_deref(),
    };
    let location = match update.location.as_deref() {
        Some(loc) => non_empty(Some(loc)),
        None => current.location.as_deref(),
    };

    conn.execute(
        "UPDATE users
         SET username = ?1, email = ?2, image_url = ?3, header_image_url = ?4, bio = ?5, location = ?6
         WHERE id = ?7",
        params![username, email, image_url, header_image_url, bio, location, id],
    )?;

    query_user_by_id(conn, id)?.ok_or_else(|| DbError::NotFound("User".into()))
}

/// Explicit cascade: likes (the user's, and others' on the user's messages),
/// follow edges in both directions, messages, then the user row.
pub fn delete_user_cascade(conn: &Connection, id: i64) -> Result<bool> {
    let likes = conn.execute(
        "DELETE FROM likes
         WHERE user_id = ?1
            OR message_id IN (SELECT id FROM messages WHERE user_id = ?1)",
        [id],
    )?;
    let follows = conn.execute(
        "DELETE FROM follows WHERE user_following_id = ?1 OR user_being_followed_id = ?1",
        [id],
    )?;
    let messages = conn.execute("DELETE FROM messages WHERE user_id = ?1", [id])?;
    let users = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;

    debug!(user_id = id, likes, follows, messages, users, "Cascade delete");
    Ok(users > 0)
}

pub(crate) fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM users u WHERE u.id = ?1", UserRow::COLUMNS),
            [id],
            UserRow::from_row,
        )
        .optional()?;
    Ok(row)
}

pub(crate) fn user_exists(conn: &Connection, id: i64) -> Result<bool> {
    let exists = conn.query_row("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)", [id], |r| r.get(0))?;
    Ok(exists)
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DbError::Validation(format!("{} must not be empty", field)));
    }
    Ok(value)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn escape_like(q: &str) -> String {
    q.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
