pub mod memory;
pub mod sqlite;

pub use memory::MemorySessionStore;
pub use sqlite::SqliteSessionStore;

use anyhow::Result;
use log::info;
use std::sync::Arc;

use crate::config::{StoreBackend, StoreSettings};
use crate::domain::AnalysisResult;

/// Keeps one analysis result per browser session.
///
/// Writes for the same session id are last-write-wins.
pub trait SessionStore: Send + Sync {
    /// Prepare the backing storage; called once at process start
    fn init(&self) -> Result<()>;

    fn put(&self, session_id: &str, result: &AnalysisResult) -> Result<()>;

    fn get(&self, session_id: &str) -> Result<Option<AnalysisResult>>;

    /// Returns whether the session held any data
    fn delete(&self, session_id: &str) -> Result<bool>;

    /// Number of sessions currently holding data
    fn len(&self) -> Result<usize>;

    /// Release resources; called once at shutdown
    fn teardown(&self) -> Result<()>;
}

/// Build and initialize the configured store
pub fn open_store(settings: &StoreSettings) -> Result<Arc<dyn SessionStore>> {
    let store: Arc<dyn SessionStore> = match settings.backend {
        StoreBackend::Memory => Arc::new(MemorySessionStore::new()),
        StoreBackend::Sqlite => Arc::new(SqliteSessionStore::open(&settings.database_path)?),
    };
    store.init()?;

    info!("Session store ready ({:?})", settings.backend);
    Ok(store)
}
