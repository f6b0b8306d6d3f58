//! Document synchronization handlers.

use tower_lsp::lsp_types::{
    DidChangeTextDocumentParams,
    DidCloseTextDocumentParams,
    DidOpenTextDocumentParams,
    DidSaveTextDocumentParams,
};

use super::super::backend::Backend;

pub async fn handle_did_open(backend: &Backend, params: DidOpenTextDocumentParams) {
    let uri = params.text_document.uri;
    tracing::debug!(%uri, "Document opened");

    {
        let mut opened_files = backend.state.opened_files.lock().await;
        opened_files.insert(uri.clone());
    }

    backend.update_and_diagnose(uri, params.text_document.text).await;
}

pub async fn handle_did_change(backend: &Backend, params: DidChangeTextDocumentParams) {
    let uri = params.text_document.uri;

    // Full sync: the last change holds the whole text.
    let Some(change) = params.content_changes.into_iter().next_back() else {
        return;
    };

    backend.update_and_diagnose(uri, change.text).await;
}

#[allow(clippy::unused_async)]
pub async fn handle_did_save(_backend: &Backend, params: DidSaveTextDocumentParams) {
    tracing::debug!(uri = %params.text_document.uri, "Document saved");
}

pub async fn handle_did_close(backend: &Backend, params: DidCloseTextDocumentParams) {
    let uri = params.text_document.uri;
    tracing::debug!(%uri, "Document closed");

    {
        let mut opened_files = backend.state.opened_files.lock().await;
        opened_files.remove(&uri);
    }

    // Catalogs outside the workspace patterns only live while open.
    if let Some(path) = Backend::uri_to_path(&uri) {
        if backend.is_catalog_file(&path).await {
            backend.reload_catalog_file(&path).await;
        } else {
            backend.remove_catalog_file(&path).await;
            backend.client.publish_diagnostics(uri, Vec::new(), None).await;
        }
    }
}
