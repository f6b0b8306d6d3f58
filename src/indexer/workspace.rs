//! Finds and loads the catalog files of a workspace.

use std::collections::HashMap;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;
use std::sync::atomic::{
    AtomicBool,
    AtomicU32,
    Ordering,
};

use futures::StreamExt;
use ignore::WalkBuilder;
use tokio::sync::Mutex;
use tower_lsp::lsp_types::Url;

use crate::config::{
    FileMatcher,
    TsSettings,
};
use crate::db::LinguistDatabaseImpl;
use crate::indexer::types::IndexerError;
use crate::input::catalog::CatalogFile;

#[derive(Clone, Debug, Default)]
pub struct WorkspaceIndexer {
    indexing_completed: Arc<AtomicBool>,
}

impl WorkspaceIndexer {
    #[must_use]
    pub fn new() -> Self {
        Self { indexing_completed: Arc::new(AtomicBool::new(false)) }
    }

    #[must_use]
    pub fn is_indexing_completed(&self) -> bool {
        self.indexing_completed.load(Ordering::Acquire)
    }

    /// Marks the index stale, e.g. before a re-index.
    pub fn reset(&self) {
        self.indexing_completed.store(false, Ordering::Release);
    }

    /// Indexes every catalog file under `workspace_path`.
    ///
    /// Files are read concurrently, at most `indexing.numThreads` at a time,
    /// and registered in `catalog_files` while `db` is held; no database
    /// handle is kept during the reads. Files already registered there,
    /// such as open documents, keep their text. `progress` is called with
    /// `(done, total)` after each file. Unreadable files are skipped with a
    /// warning.
    ///
    /// Returns the number of files indexed.
    ///
    /// # Errors
    /// - The workspace path does not exist
    /// - A configured pattern is invalid
    pub async fn index_workspace<F>(
        &self,
        db: Arc<Mutex<LinguistDatabaseImpl>>,
        workspace_path: &Path,
        settings: &TsSettings,
        catalog_files: Arc<Mutex<HashMap<PathBuf, CatalogFile>>>,
        progress: Option<F>,
    ) -> Result<usize, IndexerError>
    where
        F: Fn(u32, u32) + Send + Sync,
    {
        tracing::debug!(workspace_path = %workspace_path.display(), "Indexing workspace");

        if !workspace_path.is_dir() {
            return Err(IndexerError::InvalidPath(workspace_path.display().to_string()));
        }

        let matcher = FileMatcher::new(workspace_path.to_path_buf(), settings)?;
        let files = Self::find_catalog_files(&matcher);
        let total = u32::try_from(files.len()).unwrap_or(u32::MAX);
        let done = AtomicU32::new(0);
        let num_threads = Self::num_threads(settings);

        tracing::debug!(files = files.len(), num_threads, "Found catalog files");

        let loaded: Vec<(PathBuf, String)> = futures::stream::iter(files)
            .map(|path| async move {
                match tokio::fs::read_to_string(&path).await {
                    Ok(text) => Some((path, text)),
                    Err(error) => {
                        tracing::warn!(path = %path.display(), %error, "Failed to read catalog file");
                        None
                    }
                }
            })
            .buffer_unordered(num_threads)
            .inspect(|_| {
                let current = done.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(progress) = &progress {
                    progress(current, total);
                }
            })
            .filter_map(|loaded| async move { loaded })
            .collect()
            .await;

        let count = loaded.len();
        {
            // Same order as the server state: db, then catalog_files.
            let db = db.lock().await;
            let mut catalog_files = catalog_files.lock().await;
            for (path, text) in loaded {
                let Ok(uri) = Url::from_file_path(&path) else {
                    tracing::warn!(path = %path.display(), "Failed to create URI for file");
                    continue;
                };
                catalog_files
                    .entry(path)
                    .or_insert_with(|| CatalogFile::new(&*db, uri.to_string(), text));
            }
        }

        self.indexing_completed.store(true, Ordering::Release);
        tracing::debug!(count, "Workspace indexing complete");

        Ok(count)
    }

    /// Walks the matcher's root, honouring `.gitignore`, and returns the
    /// catalog files in path order.
    #[must_use]
    pub fn find_catalog_files(matcher: &FileMatcher) -> Vec<PathBuf> {
        let root = matcher.root();
        let mut found_files = Vec::new();

        for result in WalkBuilder::new(root)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .build()
        {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(?err, "Failed to read directory entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let Ok(relative_path) = path.strip_prefix(root) else {
                continue;
            };
            if matcher.is_translation_file_relative(relative_path) {
                found_files.push(path.to_path_buf());
            }
        }

        found_files.sort();
        found_files
    }

    /// `indexing.numThreads`, or 80% of the CPU cores (minimum 1).
    #[must_use]
    pub fn num_threads(settings: &TsSettings) -> usize {
        settings.indexing.num_threads.unwrap_or_else(|| (num_cpus::get() * 4 / 5).max(1)).max(1)
    }
}
