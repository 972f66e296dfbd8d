pub mod follows;
pub mod likes;
pub mod messages;
pub mod users;

/// Ids bound per `IN (...)` query. Well under SQLite's host parameter limit.
pub(crate) const MAX_BATCH: usize = 500;

/// "?start, ?start+1, ..." with `n` entries, for an IN (...) clause.
pub(crate) fn placeholders(start: usize, n: usize) -> String {
    (start..start + n)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}
