use std::collections::{HashMap, HashSet};

use rusqlite::{params, params_from_iter};
use tracing::info;

use crate::models::MessageRow;
use crate::queries::messages::message_exists;
use crate::queries::{MAX_BATCH, placeholders};
use crate::{Database, DbError, Result};

impl Database {
    /// Like a message. Idempotent: returns false when already liked.
    /// Users may like their own messages.
    pub fn like(&self, user_id: i64, message_id: i64) -> Result<bool> {
        let added = self.with_tx(|conn| {
            if !message_exists(conn, message_id)? {
                return Err(DbError::NotFound("Message".into()));
            }
            let n = conn.execute(
                "INSERT INTO likes (user_id, message_id) VALUES (?1, ?2)
                 ON CONFLICT (user_id, message_id) DO NOTHING",
                params![user_id, message_id],
            )?;
            Ok(n > 0)
        })?;

        if added {
            info!(user_id, message_id, "Like added");
        }
        Ok(added)
    }

    /// Returns false when there was no like to remove.
    pub fn unlike(&self, user_id: i64, message_id: i64) -> Result<bool> {
        let removed = self.with_tx(|conn| {
            let n = conn.execute(
                "DELETE FROM likes WHERE user_id = ?1 AND message_id = ?2",
                params![user_id, message_id],
            )?;
            Ok(n > 0)
        })?;

        if removed {
            info!(user_id, message_id, "Like removed");
        }
        Ok(removed)
    }

    pub fn has_liked(&self, user_id: i64, message_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let liked = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM likes WHERE user_id = ?1 AND message_id = ?2)",
                params![user_id, message_id],
                |r| r.get(0),
            )?;
            Ok(liked)
        })
    }

    /// Messages liked by `user_id`, most recently liked first.
    pub fn liked_messages(&self, user_id: i64, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} JOIN likes l ON l.message_id = m.id WHERE l.user_id = ?1 ORDER BY l.id DESC LIMIT ?2",
                MessageRow::SELECT
            ))?;
            let rows = stmt
                .query_map(params![user_id, limit], MessageRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn like_count(&self, message_id: i64) -> Result<i64> {
        self.with_conn(|conn| {
            let n = conn.query_row(
                "SELECT COUNT(*) FROM likes WHERE message_id = ?1",
                [message_id],
                |r| r.get(0),
            )?;
            Ok(n)
        })
    }

    /// Batch like counts. Messages without likes are absent from the map.
    pub fn like_counts(&self, message_ids: &[i64]) -> Result<HashMap<i64, i64>> {
        self.with_conn(|conn| {
            let mut counts = HashMap::with_capacity(message_ids.len());
            for chunk in message_ids.chunks(MAX_BATCH) {
                let sql = format!(
                    "SELECT message_id, COUNT(*) FROM likes WHERE message_id IN ({}) GROUP BY message_id",
                    placeholders(1, chunk.len())
                );
                let mut stmt = conn.prepare_cached(&sql)?;
                let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })?;
                for pair in rows {
                    let (id, n) = pair?;
                    counts.insert(id, n);
                }
            }
            Ok(counts)
        })
    }

    /// The subset of `message_ids` that `user_id` has liked.
    pub fn liked_among(&self, user_id: i64, message_ids: &[i64]) -> Result<HashSet<i64>> {
        self.with_conn(|conn| {
            let mut liked = HashSet::new();
            for chunk in message_ids.chunks(MAX_BATCH) {
                // ?1 is the user; message ids start at ?2.
                let sql = format!(
                    "SELECT message_id FROM likes WHERE user_id = ?1 AND message_id IN ({})",
                    placeholders(2, chunk.len())
                );
                let mut stmt = conn.prepare_cached(&sql)?;
                let params = std::iter::once(&user_id).chain(chunk.iter());
                for id in stmt.query_map(params_from_iter(params), |row| row.get(0))? {
                    liked.insert(id?);
                }
            }
            Ok(liked)
        })
    }
}
