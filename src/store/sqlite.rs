use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info};
use std::path::Path;

use crate::database::{self, DbPool, get_connection};
use crate::database::sessions;
use crate::domain::AnalysisResult;
use crate::store::SessionStore;

/// Sessions persisted as JSON payloads in SQLite, surviving restarts
pub struct SqliteSessionStore {
    pool: DbPool,
}

impl SqliteSessionStore {
    pub fn open<P: AsRef<Path>>(database_path: P) -> Result<Self> {
        let path = database_path.as_ref();
        info!("Opening session database at {}", path.display());
        let pool = database::create_pool(path)?;
        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            pool: database::create_memory_pool()?,
        })
    }
}

impl SessionStore for SqliteSessionStore {
    fn init(&self) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        database::setup::init_schema(&mut conn)
    }

    fn put(&self, session_id: &str, result: &AnalysisResult) -> Result<()> {
        let payload = serde_json::to_string(result).context("Failed to serialize analysis")?;
        let mut conn = get_connection(&self.pool)?;
        sessions::upsert_session(
            &mut conn,
            session_id,
            &result.swimmer.name,
            &payload,
            &Utc::now().to_rfc3339(),
        )?;
        debug!("Persisted analysis for session {}", session_id);
        Ok(())
    }

    fn get(&self, session_id: &str) -> Result<Option<AnalysisResult>> {
        let mut conn = get_connection(&self.pool)?;
        let Some(payload) = sessions::find_payload(&mut conn, session_id)? else {
            return Ok(None);
        };

        let result = serde_json::from_str(&payload)
            .with_context(|| format!("Corrupt analysis stored for session {}", session_id))?;
        Ok(Some(result))
    }

    fn delete(&self, session_id: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        sessions::delete_session(&mut conn, session_id)
    }

    fn len(&self) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        sessions::count_sessions(&mut conn)
    }

    /// Sessions are kept on disk for the next start
    fn teardown(&self) -> Result<()> {
        info!("Closing session database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::config::AnalysisSettings;
    use crate::domain::{RaceResult, SwimmerIdentity};

    fn analysis() -> AnalysisResult {
        let swimmer = SwimmerIdentity {
            name: "Jane Doe".to_string(),
            age: Some(30),
            team: None,
        };
        let results = vec![
            RaceResult {
                event: "50 Free".to_string(),
                time: "25.00".to_string(),
                date: "2024-01-01".to_string(),
                meet: "Viking".to_string(),
                place: Some(1),
                ..Default::default()
            },
            RaceResult {
                event: "50 Free".to_string(),
                time: "24.50".to_string(),
                date: "2024-06-01".to_string(),
                meet: "PNA".to_string(),
                place: Some(2),
                ..Default::default()
            },
        ];
        analyze(&results, &swimmer, &AnalysisSettings::default())
    }

    fn store() -> SqliteSessionStore {
        let store = SqliteSessionStore::in_memory().unwrap();
        store.init().unwrap();
        store
    }

    #[test]
    fn test_stored_analysis_reads_back_equal() {
        let store = store();
        let result = analysis();

        store.put("session-1", &result).unwrap();

        assert_eq!(store.get("session-1").unwrap(), Some(result));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_overwrite_and_delete() {
        let store = store();
        store.put("session-1", &analysis()).unwrap();
        store.put("session-1", &analysis()).unwrap();

        assert_eq!(store.len().unwrap(), 1);
        assert!(store.delete("session-1").unwrap());
        assert!(store.get("session-1").unwrap().is_none());
    }

    #[test]
    fn test_sessions_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.db");

        let first = SqliteSessionStore::open(&path).unwrap();
        first.init().unwrap();
        first.put("session-1", &analysis()).unwrap();
        first.teardown().unwrap();
        drop(first);

        let second = SqliteSessionStore::open(&path).unwrap();
        second.init().unwrap();
        assert!(second.get("session-1").unwrap().is_some());
    }
}
