//! Language server backend.

use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use tokio::sync::Mutex;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    DidChangeConfigurationParams,
    DidChangeTextDocumentParams,
    DidChangeWatchedFilesParams,
    DidChangeWatchedFilesRegistrationOptions,
    DidCloseTextDocumentParams,
    DidOpenTextDocumentParams,
    DidSaveTextDocumentParams,
    DocumentFormattingParams,
    FileChangeType,
    FileSystemWatcher,
    GlobPattern,
    Hover,
    HoverParams,
    InitializeParams,
    InitializeResult,
    InitializedParams,
    MessageType,
    NumberOrString,
    ProgressParams,
    ProgressParamsValue,
    Registration,
    TextEdit,
    Url,
    WatchKind,
    WorkDoneProgress,
    WorkDoneProgressBegin,
    WorkDoneProgressEnd,
    WorkDoneProgressReport,
    notification::Progress,
};
use tower_lsp::{
    Client,
    LanguageServer,
};

use super::handlers;
use super::state::ServerState;
use crate::checks::CheckSettings;
use crate::config::{
    CONFIG_FILE_NAME,
    ConfigManager,
    FileMatcher,
};
use crate::db::LinguistDatabaseImpl;
use crate::indexer::workspace::WorkspaceIndexer;
use crate::input::catalog::CatalogFile;

const INDEXING_TOKEN: &str = "qt-ts-indexing";

#[derive(Clone)]
pub struct Backend {
    pub client: Client,
    pub config_manager: Arc<Mutex<ConfigManager>>,
    pub workspace_indexer: Arc<WorkspaceIndexer>,
    pub state: ServerState,
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("config_manager", &"<ConfigManager>")
            .field("workspace_indexer", &"<WorkspaceIndexer>")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Backend {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            config_manager: Arc::new(Mutex::new(ConfigManager::new())),
            workspace_indexer: Arc::new(WorkspaceIndexer::new()),
            state: ServerState::new(LinguistDatabaseImpl::default()),
        }
    }

    pub(crate) fn uri_to_path(uri: &Url) -> Option<PathBuf> {
        uri.to_file_path().map_or_else(
            |()| {
                tracing::warn!(%uri, "Failed to convert URI to file path");
                None
            },
            Some,
        )
    }

    pub(crate) fn is_config_file(path: &Path) -> bool {
        path.file_name().is_some_and(|name| name == CONFIG_FILE_NAME)
    }

    pub(crate) async fn check_settings(&self) -> CheckSettings {
        CheckSettings::from(self.config_manager.lock().await.get_settings())
    }

    /// Matcher for the current workspace, `None` before `initialize`.
    pub(crate) async fn file_matcher(&self) -> Option<FileMatcher> {
        let config_manager = self.config_manager.lock().await;
        let root = config_manager.workspace_root()?.clone();
        match FileMatcher::new(root, config_manager.get_settings()) {
            Ok(matcher) => Some(matcher),
            Err(error) => {
                tracing::error!(%error, "Invalid file patterns");
                None
            }
        }
    }

    pub(crate) async fn is_catalog_file(&self, path: &Path) -> bool {
        self.file_matcher().await.is_some_and(|matcher| matcher.is_translation_file(path))
    }

    /// Stores the new text of a document and publishes its diagnostics.
    pub(crate) async fn update_and_diagnose(&self, uri: Url, text: String) {
        use salsa::Setter;

        let Some(file_path) = Self::uri_to_path(&uri) else {
            return;
        };
        let settings = self.check_settings().await;

        let diagnostics = {
            let (mut db, mut catalog_files) = self.state.lock_db_and_catalog_files().await;
            let file = if let Some(existing) = catalog_files.get(&file_path).copied() {
                if existing.text(&*db) != &text {
                    existing.set_text(&mut *db).to(text);
                }
                existing
            } else {
                let file = CatalogFile::new(&*db, uri.to_string(), text);
                catalog_files.insert(file_path, file);
                file
            };
            drop(catalog_files);
            super::diagnostics::generate_diagnostics(&*db, file, &settings)
        };

        self.client.publish_diagnostics(uri.clone(), diagnostics, None).await;
        tracing::debug!(%uri, "Diagnostics published");
    }

    pub(crate) async fn send_diagnostics_to_opened_files(&self) {
        let settings = self.check_settings().await;
        let published = {
            let (db, catalog_files) = self.state.lock_db_and_catalog_files().await;
            let opened_files = self.state.opened_files.lock().await;
            opened_files
                .iter()
                .filter_map(|uri| {
                    let path = Self::uri_to_path(uri)?;
                    let file = catalog_files.get(&path).copied()?;
                    let diagnostics =
                        super::diagnostics::generate_diagnostics(&*db, file, &settings);
                    Some((uri.clone(), diagnostics))
                })
                .collect::<Vec<_>>()
        };

        for (uri, diagnostics) in published {
            self.client.publish_diagnostics(uri, diagnostics, None).await;
        }
    }

    /// Indexes the workspace root, reporting progress to the client.
    pub(crate) async fn index_workspace(&self) {
        let (workspace_path, settings) = {
            let config_manager = self.config_manager.lock().await;
            let Some(root) = config_manager.workspace_root().cloned() else {
                tracing::debug!("No workspace root; skipping indexing");
                return;
            };
            (root, config_manager.get_settings().clone())
        };

        let token = NumberOrString::String(INDEXING_TOKEN.to_string());
        self.send_progress(
            &token,
            WorkDoneProgress::Begin(WorkDoneProgressBegin {
                title: "Indexing catalogs".to_string(),
                cancellable: Some(false),
                message: Some("Starting...".to_string()),
                percentage: Some(0),
            }),
        )
        .await;

        let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<(u32, u32)>(100);
        let progress_task = {
            let backend = self.clone();
            let token = token.clone();
            tokio::spawn(async move {
                while let Some((current, total)) = progress_rx.recv().await {
                    let percentage = (current * 100).checked_div(total).unwrap_or(0);
                    backend
                        .send_progress(
                            &token,
                            WorkDoneProgress::Report(WorkDoneProgressReport {
                                cancellable: Some(false),
                                message: Some(format!("Reading catalogs: {current}/{total}")),
                                percentage: Some(percentage),
                            }),
                        )
                        .await;
                }
            })
        };
        let progress_callback = move |current: u32, total: u32| {
            let _ = progress_tx.try_send((current, total));
        };

        let result = self
            .workspace_indexer
            .index_workspace(
                Arc::clone(&self.state.db),
                &workspace_path,
                &settings,
                self.state.catalog_files.clone(),
                Some(progress_callback),
            )
            .await;
        let _ = progress_task.await;

        let message = match result {
            Ok(count) => {
                tracing::info!(count, "Workspace indexing complete");
                format!("Indexed {count} catalogs")
            }
            Err(error) => {
                tracing::error!(%error, "Workspace indexing failed");
                self.client
                    .log_message(MessageType::ERROR, format!("Indexing failed: {error}"))
                    .await;
                format!("Indexing failed: {error}")
            }
        };
        self.send_progress(
            &token,
            WorkDoneProgress::End(WorkDoneProgressEnd { message: Some(message) }),
        )
        .await;
    }

    async fn send_progress(&self, token: &NumberOrString, progress: WorkDoneProgress) {
        self.client
            .send_notification::<Progress>(ProgressParams {
                token: token.clone(),
                value: ProgressParamsValue::WorkDone(progress),
            })
            .await;
    }

    /// Drops every cached result and indexes again, e.g. after the
    /// configuration changed. Open documents keep their editor text.
    pub(crate) async fn reindex_workspace(&self) {
        self.client.log_message(MessageType::INFO, "Reindexing workspace...").await;

        let documents = self.opened_documents().await;
        self.workspace_indexer.reset();
        self.state.reset().await;
        self.restore_documents(documents).await;

        self.index_workspace().await;
        self.send_diagnostics_to_opened_files().await;
    }

    async fn opened_documents(&self) -> Vec<(PathBuf, Url, String)> {
        let (db, catalog_files) = self.state.lock_db_and_catalog_files().await;
        let opened_files = self.state.opened_files.lock().await;
        opened_files
            .iter()
            .filter_map(|uri| {
                let path = Self::uri_to_path(uri)?;
                let file = catalog_files.get(&path)?;
                Some((path, uri.clone(), file.text(&*db).clone()))
            })
            .collect()
    }

    async fn restore_documents(&self, documents: Vec<(PathBuf, Url, String)>) {
        let (db, mut catalog_files) = self.state.lock_db_and_catalog_files().await;
        for (path, uri, text) in documents {
            let file = CatalogFile::new(&*db, uri.to_string(), text);
            catalog_files.insert(path, file);
        }
    }

    /// Rereads a catalog changed on disk. Open documents are owned by the
    /// editor and are left alone.
    pub(crate) async fn reload_catalog_file(&self, path: &Path) {
        use salsa::Setter;

        let Ok(uri) = Url::from_file_path(path) else {
            return;
        };
        if self.state.opened_files.lock().await.contains(&uri) {
            return;
        }
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "Failed to read catalog file");
                return;
            }
        };

        let (mut db, mut catalog_files) = self.state.lock_db_and_catalog_files().await;
        if let Some(existing) = catalog_files.get(path).copied() {
            existing.set_text(&mut *db).to(text);
        } else {
            let file = CatalogFile::new(&*db, uri.to_string(), text);
            catalog_files.insert(path.to_path_buf(), file);
        }
        tracing::debug!(path = %path.display(), "Catalog reloaded");
    }

    pub(crate) async fn remove_catalog_file(&self, path: &Path) {
        self.state.catalog_files.lock().await.remove(path);
        tracing::debug!(path = %path.display(), "Catalog removed");
    }

    pub(crate) async fn handle_config_file_change(&self, path: &Path, change: FileChangeType) {
        tracing::info!(path = %path.display(), ?change, "Configuration file changed");

        let workspace_root = {
            let config_manager = self.config_manager.lock().await;
            config_manager.workspace_root().cloned()
        };
        let Some(root) = workspace_root else {
            return;
        };
        if path.parent() != Some(root.as_path()) {
            return;
        }

        let result = self.config_manager.lock().await.load_settings(Some(root));
        match result {
            Ok(()) => self.reindex_workspace().await,
            Err(error) => {
                tracing::error!(%error, "Configuration error");
                self.client
                    .log_message(MessageType::ERROR, format!("Configuration error: {error}"))
                    .await;
            }
        }
    }

    pub(crate) async fn register_file_watchers(&self) {
        let patterns = ["**/*.ts".to_string(), format!("**/{CONFIG_FILE_NAME}")];
        let watchers = patterns
            .into_iter()
            .map(|pattern| FileSystemWatcher {
                glob_pattern: GlobPattern::String(pattern),
                kind: Some(WatchKind::Create | WatchKind::Change | WatchKind::Delete),
            })
            .collect();

        let registration = Registration {
            id: "qt-ts-file-watcher".to_string(),
            method: "workspace/didChangeWatchedFiles".to_string(),
            register_options: serde_json::to_value(DidChangeWatchedFilesRegistrationOptions {
                watchers,
            })
            .ok(),
        };

        if let Err(error) = self.client.register_capability(vec![registration]).await {
            tracing::warn!(%error, "Failed to register file watchers");
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        handlers::lifecycle::handle_initialize(self, params).await
    }

    async fn initialized(&self, params: InitializedParams) {
        handlers::lifecycle::handle_initialized(self, params).await;
    }

    async fn shutdown(&self) -> Result<()> {
        handlers::lifecycle::handle_shutdown().await
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        handlers::document_sync::handle_did_open(self, params).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        handlers::document_sync::handle_did_change(self, params).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        handlers::document_sync::handle_did_save(self, params).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        handlers::document_sync::handle_did_close(self, params).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        handlers::features::handle_hover(self, params).await
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        handlers::features::handle_formatting(self, params).await
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        handlers::workspace::handle_did_change_configuration(self, params).await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        handlers::workspace::handle_did_change_watched_files(self, params).await;
    }
}
