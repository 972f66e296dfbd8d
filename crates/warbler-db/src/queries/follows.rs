use rusqlite::{Connection, params};
use tracing::info;

use crate::models::UserRow;
use crate::queries::users::user_exists;
use crate::{Database, DbError, Result};

impl Database {
    /// `follower_id` starts following `followed_id`. Idempotent: returns
    /// false when the edge already existed.
    pub fn follow(&self, follower_id: i64, followed_id: i64) -> Result<bool> {
        if follower_id == followed_id {
            return Err(DbError::Validation("Users cannot follow themselves".into()));
        }

        let added = self.with_tx(|conn| {
            if !user_exists(conn, followed_id)? {
                return Err(DbError::NotFound("User".into()));
            }
            let n = conn.execute(
                "INSERT INTO follows (user_being_followed_id, user_following_id) VALUES (?1, ?2)
                 ON CONFLICT (user_being_followed_id, user_following_id) DO NOTHING",
                params![followed_id, follower_id],
            )?;
            Ok(n > 0)
        })?;

        if added {
            info!(follower_id, followed_id, "Follow added");
        }
        Ok(added)
    }

    /// Returns false when there was no edge to remove.
    pub fn unfollow(&self, follower_id: i64, followed_id: i64) -> Result<bool> {
        let removed = self.with_tx(|conn| {
            let n = conn.execute(
                "DELETE FROM follows WHERE user_being_followed_id = ?1 AND user_following_id = ?2",
                params![followed_id, follower_id],
            )?;
            Ok(n > 0)
        })?;

        if removed {
            info!(follower_id, followed_id, "Follow removed");
        }
        Ok(removed)
    }

    /// Does `user_id` follow `other_id`?
    pub fn is_following(&self, user_id: i64, other_id: i64) -> Result<bool> {
        self.with_conn(|conn| edge_exists(conn, user_id, other_id))
    }

    /// Is `user_id` followed by `other_id`?
    pub fn is_followed_by(&self, user_id: i64, other_id: i64) -> Result<bool> {
        self.with_conn(|conn| edge_exists(conn, other_id, user_id))
    }

    /// Users that `user_id` follows, by username.
    pub fn following(&self, user_id: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            query_users(
                conn,
                "JOIN follows f ON f.user_being_followed_id = u.id WHERE f.user_following_id = ?1",
                user_id,
            )
        })
    }

    /// Users following `user_id`, by username.
    pub fn followers(&self, user_id: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            query_users(
                conn,
                "JOIN follows f ON f.user_following_id = u.id WHERE f.user_being_followed_id = ?1",
                user_id,
            )
        })
    }
}

fn edge_exists(conn: &Connection, follower_id: i64, followed_id: i64) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM follows WHERE user_following_id = ?1 AND user_being_followed_id = ?2
         )",
        params![follower_id, followed_id],
        |r| r.get(0),
    )?;
    Ok(exists)
}

fn query_users(conn: &Connection, join_where: &str, user_id: i64) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users u {} ORDER BY u.username",
        UserRow::COLUMNS,
        join_where
    ))?;
    let rows = stmt
        .query_map([user_id], UserRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::testutil::{db, user};

    #[test]
    fn unrelated_users_do_not_follow() {
        let db = db();
        let u1 = user(&db, "user1");
        let u2 = user(&db, "user2");

        assert!(!db.is_following(u1.id, u2.id).unwrap());
        assert!(!db.is_followed_by(u1.id, u2.id).unwrap());
        assert!(db.followers(u1.id).unwrap().is_empty());
    }

    #[test]
    fn follow_is_directed() {
        let db = db();
        let u1 = user(&db, "user1");
        let u2 = user(&db, "user2");
        assert!(db.follow(u1.id, u2.id).unwrap());

        assert!(db.is_following(u1.id, u2.id).unwrap());
        assert!(!db.is_following(u2.id, u1.id).unwrap());
        assert!(db.is_followed_by(u2.id, u1.id).unwrap());
        assert!(!db.is_followed_by(u1.id, u2.id).unwrap());

        assert_eq!(db.following(u1.id).unwrap().len(), 1);
        assert_eq!(db.followers(u1.id).unwrap().len(), 0);
        assert_eq!(db.followers(u2.id).unwrap().len(), 1);
        assert_eq!(db.following(u2.id).unwrap().len(), 0);
        assert_eq!(db.followers(u2.id).unwrap()[0].username, "user1");
    }

    #[test]
    fn follow_twice_is_a_noop() {
        let db = db();
        let u1 = user(&db, "user1");
        let u2 = user(&db, "user2");

        assert!(db.follow(u1.id, u2.id).unwrap());
        assert!(!db.follow(u1.id, u2.id).unwrap());
        assert_eq!(db.following(u1.id).unwrap().len(), 1);
    }

    #[test]
    fn unfollow_removes_edge() {
        let db = db();
        let u1 = user(&db, "user1");
        let u2 = user(&db, "user2");
        db.follow(u1.id, u2.id).unwrap();

        assert!(db.unfollow(u1.id, u2.id).unwrap());
        assert!(!db.is_following(u1.id, u2.id).unwrap());
        assert!(!db.unfollow(u1.id, u2.id).unwrap());
    }

    #[test]
    fn self_and_missing_targets_rejected() {
        let db = db();
        let u1 = user(&db, "user1");

        assert!(matches!(db.follow(u1.id, u1.id), Err(DbError::Validation(_))));
        assert!(matches!(db.follow(u1.id, 9999), Err(DbError::NotFound(_))));
        assert!(db.following(u1.id).unwrap().is_empty());
    }
}
