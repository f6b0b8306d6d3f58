//! Shared state of the language server.

use std::collections::{
    HashMap,
    HashSet,
};
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{
    Mutex,
    MutexGuard,
};
use tower_lsp::lsp_types::Url;

use crate::db::LinguistDatabaseImpl;
use crate::input::catalog::CatalogFile;

/// State shared between the handlers.
///
/// # Lock order
///
/// When holding more than one lock, take them in this order:
/// 1. `db`
/// 2. `catalog_files`
/// 3. `opened_files`
#[derive(Clone)]
pub struct ServerState {
    pub db: Arc<Mutex<LinguistDatabaseImpl>>,
    /// Catalog files by path, indexed or opened.
    pub catalog_files: Arc<Mutex<HashMap<PathBuf, CatalogFile>>>,
    pub opened_files: Arc<Mutex<HashSet<Url>>>,
}

impl ServerState {
    #[must_use]
    pub fn new(db: LinguistDatabaseImpl) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            catalog_files: Arc::new(Mutex::new(HashMap::new())),
            opened_files: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Takes `db` then `catalog_files`.
    pub async fn lock_db_and_catalog_files(
        &self,
    ) -> (MutexGuard<'_, LinguistDatabaseImpl>, MutexGuard<'_, HashMap<PathBuf, CatalogFile>>)
    {
        let db = self.db.lock().await;
        let catalog_files = self.catalog_files.lock().await;
        (db, catalog_files)
    }

    /// Swaps in a fresh database and forgets every file, dropping all
    /// memoised results.
    pub async fn reset(&self) {
        let mut db = self.db.lock().await;
        let mut catalog_files = self.catalog_files.lock().await;
        *db = LinguistDatabaseImpl::default();
        catalog_files.clear();
    }
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("db", &"<LinguistDatabaseImpl>")
            .field("catalog_files", &"<HashMap<PathBuf, CatalogFile>>")
            .field("opened_files", &"<HashSet<Url>>")
            .finish()
    }
}
