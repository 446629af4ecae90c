use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;

pub fn upsert_session(
    conn: &mut DbConn,
    session_id: &str,
    swimmer_name: &str,
    payload: &str,
    updated_at: &str,
) -> Result<()> {
    let sql = "INSERT INTO sessions (session_id, swimmer_name, payload, updated_at) VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT(session_id) DO UPDATE SET swimmer_name = excluded.swimmer_name,
               payload = excluded.payload, updated_at = excluded.updated_at";

    conn.execute(sql, params![session_id, swimmer_name, payload, updated_at])
        .context("Failed to upsert session")
        .map(|_| ())
}

pub fn find_payload(conn: &mut DbConn, session_id: &str) -> Result<Option<String>> {
    let sql = "SELECT payload FROM sessions WHERE session_id = ?1";

    conn.query_row(sql, params![session_id], |row| row.get(0))
        .optional()
        .context("Failed to query session by id")
}

/// Returns whether a row was removed
pub fn delete_session(conn: &mut DbConn, session_id: &str) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM sessions WHERE session_id = ?1", params![session_id])
        .context("Failed to delete session")?;
    Ok(deleted > 0)
}

pub fn count_sessions(conn: &mut DbConn) -> Result<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
        .context("Failed to count sessions")?;
    Ok(usize::try_from(count).unwrap_or(0))
}
