use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::info;

use crate::models::{MAX_MESSAGE_LEN, MessageRow, format_timestamp};
use crate::queries::users::user_exists;
use crate::{Database, DbError, Result};

impl Database {
    pub fn create_message(&self, user_id: i64, text: &str) -> Result<MessageRow> {
        self.create_message_at(user_id, text, Utc::now())
    }

    /// Same as `create_message` with an explicit timestamp.
    pub fn create_message_at(
        &self,
        user_id: i64,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<MessageRow> {
        let text = validate_text(text)?;
        let message = self.with_tx(|conn| insert_message(conn, user_id, text, &timestamp))?;
        info!(message_id = message.id, user_id, "Message created");
        Ok(message)
    }

    pub fn get_message(&self, id: i64) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| query_message(conn, id))
    }

    /// Returns false when no such message existed.
    pub fn delete_message(&self, id: i64) -> Result<bool> {
        let removed = self.with_tx(|conn| remove_message(conn, id))?;
        if removed {
            info!(message_id = id, "Message deleted");
        }
        Ok(removed)
    }

    /// Delete a message only if `allow` accepts it. The check and the delete
    /// run in one transaction. `NotFound` when the message does not exist;
    /// `Ok(false)` when `allow` refused and nothing was removed.
    pub fn delete_message_if<F>(&self, id: i64, allow: F) -> Result<bool>
    where
        F: FnOnce(&MessageRow) -> bool,
    {
        let removed = self.with_tx(|conn| {
            let message = query_message(conn, id)?.ok_or_else(|| DbError::NotFound("Message".into()))?;
            if !allow(&message) {
                return Ok(false);
            }
            remove_message(conn, id)
        })?;
        if removed {
            info!(message_id = id, "Message deleted");
        }
        Ok(removed)
    }

    /// A user's own messages, newest first.
    pub fn user_messages(&self, user_id: i64, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE m.user_id = ?1 ORDER BY m.timestamp DESC, m.id DESC LIMIT ?2",
                MessageRow::SELECT
            ))?;
            let rows = stmt
                .query_map(params![user_id, limit], MessageRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Messages by the user and everyone they follow, newest first.
    pub fn timeline(&self, user_id: i64, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE m.user_id = ?1
                    OR m.user_id IN (
                        SELECT user_being_followed_id FROM follows WHERE user_following_id = ?1
                    )
                 ORDER BY m.timestamp DESC, m.id DESC
                 LIMIT ?2",
                MessageRow::SELECT
            ))?;
            let rows = stmt
                .query_map(params![user_id, limit], MessageRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

/// Non-blank and at most `MAX_MESSAGE_LEN` characters.
pub fn validate_text(text: &str) -> Result<&str> {
    if text.trim().is_empty() {
        return Err(DbError::Validation("Message text must not be empty".into()));
    }
    if text.chars().count() > MAX_MESSAGE_LEN {
        return Err(DbError::Validation(format!(
            "Message text must be at most {} characters",
            MAX_MESSAGE_LEN
        )));
    }
    Ok(text)
}

pub fn insert_message(
    conn: &Connection,
    user_id: i64,
    text: &str,
    timestamp: &DateTime<Utc>,
) -> Result<MessageRow> {
    if !user_exists(conn, user_id)? {
        return Err(DbError::NotFound("User".into()));
    }

    conn.execute(
        "INSERT INTO messages (text, timestamp, user_id) VALUES (?1, ?2, ?3)",
        params![text, format_timestamp(timestamp), user_id],
    )?;

    let id = conn.last_insert_rowid();
    query_message(conn, id)?.ok_or_else(|| DbError::NotFound("Message".into()))
}

pub(crate) fn query_message(conn: &Connection, id: i64) -> Result<Option<MessageRow>> {
    let row = conn
        .query_row(
            &format!("{} WHERE m.id = ?1", MessageRow::SELECT),
            [id],
            MessageRow::from_row,
        )
        .optional()?;
    Ok(row)
}

fn remove_message(conn: &Connection, id: i64) -> Result<bool> {
    conn.execute("DELETE FROM likes WHERE message_id = ?1", [id])?;
    Ok(conn.execute("DELETE FROM messages WHERE id = ?1", [id])? > 0)
}

pub(crate) fn message_exists(conn: &Connection, id: i64) -> Result<bool> {
    let exists = conn.query_row("SELECT EXISTS(SELECT 1 FROM messages WHERE id = ?1)", [id], |r| r.get(0))?;
    Ok(exists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::testutil::{db, user};
    use chrono::{Duration, TimeZone};

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::minutes(minute)
    }

    #[test]
    fn create_and_fetch() {
        let db = db();
        let u = user(&db, "user1");

        let m = db.create_message(u.id, "Test Message 2").unwrap();
        let fetched = db.get_message(m.id).unwrap().unwrap();
        assert_eq!(fetched.text, "Test Message 2");
        assert_eq!(fetched.user_id, u.id);
        assert_eq!(fetched.author_username, "user1");
        assert_eq!(fetched.timestamp, m.timestamp);

        db.create_message(u.id, "another").unwrap();
        assert_eq!(db.user_stats(u.id).unwrap().messages, 2);
    }

    #[test]
    fn text_bounds() {
        let db = db();
        let u = user(&db, "user1");

        assert!(matches!(db.create_message(u.id, ""), Err(DbError::Validation(_))));
        assert!(matches!(db.create_message(u.id, "   "), Err(DbError::Validation(_))));

        let max = "é".repeat(MAX_MESSAGE_LEN);
        assert!(db.create_message(u.id, &max).is_ok());

        let too_long = "x".repeat(MAX_MESSAGE_LEN + 1);
        assert!(matches!(db.create_message(u.id, &too_long), Err(DbError::Validation(_))));
    }

    #[test]
    fn unknown_author_is_not_found() {
        let db = db();
        assert!(matches!(db.create_message(9999, "hello"), Err(DbError::NotFound(_))));
    }

    #[test]
    fn delete_removes_message_and_its_likes() {
        let db = db();
        let u = user(&db, "user1");
        let m = db.create_message(u.id, "bye").unwrap();
        db.like(u.id, m.id).unwrap();

        assert!(db.delete_message(m.id).unwrap());
        assert!(db.get_message(m.id).unwrap().is_none());
        assert_eq!(db.user_stats(u.id).unwrap().likes, 0);
        assert!(!db.delete_message(m.id).unwrap());
    }

    #[test]
    fn conditional_delete_checks_owner_in_same_unit() {
        let db = db();
        let owner = user(&db, "owner");
        let other = user(&db, "other");
        let m = db.create_message(owner.id, "mine").unwrap();
        db.like(other.id, m.id).unwrap();

        assert!(!db.delete_message_if(m.id, |msg| msg.user_id == other.id).unwrap());
        assert!(db.get_message(m.id).unwrap().is_some());
        assert_eq!(db.like_count(m.id).unwrap(), 1);

        assert!(db.delete_message_if(m.id, |msg| msg.user_id == owner.id).unwrap());
        assert!(db.get_message(m.id).unwrap().is_none());
        assert_eq!(db.user_stats(other.id).unwrap().likes, 0);

        assert!(matches!(
            db.delete_message_if(m.id, |_| true),
            Err(DbError::NotFound(_))
        ));
    }

    #[test]
    fn timeline_includes_followed_users_newest_first() {
        let db = db();
        let me = user(&db, "me");
        let friend = user(&db, "friend");
        let stranger = user(&db, "stranger");
        db.follow(me.id, friend.id).unwrap();

        db.create_message_at(me.id, "mine old", at(0)).unwrap();
        db.create_message_at(friend.id, "friend", at(2)).unwrap();
        db.create_message_at(stranger.id, "stranger", at(3)).unwrap();
        db.create_message_at(me.id, "mine new", at(4)).unwrap();

        let texts: Vec<_> = db
            .timeline(me.id, 100)
            .unwrap()
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, ["mine new", "friend", "mine old"]);

        let page: Vec<_> = db.timeline(me.id, 2).unwrap().into_iter().map(|m| m.text).collect();
        assert_eq!(page, ["mine new", "friend"]);
    }

    #[test]
    fn user_messages_only_own() {
        let db = db();
        let a = user(&db, "a");
        let b = user(&db, "b");
        db.create_message_at(a.id, "a1", at(0)).unwrap();
        db.create_message_at(b.id, "b1", at(1)).unwrap();
        db.create_message_at(a.id, "a2", at(2)).unwrap();

        let texts: Vec<_> = db.user_messages(a.id, 100).unwrap().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, ["a2", "a1"]);
    }
}
