use anyhow::{Result, anyhow};
use log::debug;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::AnalysisResult;
use crate::store::SessionStore;

/// Process-local store; everything is lost on restart
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, AnalysisResult>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("Session store lock poisoned")
}

impl SessionStore for MemorySessionStore {
    fn init(&self) -> Result<()> {
        Ok(())
    }

    fn put(&self, session_id: &str, result: &AnalysisResult) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.insert(session_id.to_string(), result.clone());
        debug!("Stored analysis for session {}", session_id);
        Ok(())
    }

    fn get(&self, session_id: &str) -> Result<Option<AnalysisResult>> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        Ok(sessions.get(session_id).cloned())
    }

    fn delete(&self, session_id: &str) -> Result<bool> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        Ok(sessions.remove(session_id).is_some())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.sessions.read().map_err(poisoned)?.len())
    }

    fn teardown(&self) -> Result<()> {
        self.sessions.write().map_err(poisoned)?.clear();
        Ok(())
    }
}
