//! `hover` and `formatting` requests.

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    DocumentFormattingParams,
    Hover,
    HoverContents,
    HoverParams,
    MarkupContent,
    MarkupKind,
    TextEdit,
};

use super::super::backend::Backend;
use crate::input::catalog::CatalogFile;
use crate::types::SourcePosition;

pub async fn handle_hover(backend: &Backend, params: HoverParams) -> Result<Option<Hover>> {
    let uri = params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;

    tracing::debug!(uri = %uri, line = position.line, character = position.character, "Hover request");

    let Some(file_path) = Backend::uri_to_path(&uri) else {
        return Ok(None);
    };

    let hover_text = {
        let (db, catalog_files) = backend.state.lock_db_and_catalog_files().await;
        let Some(file) = catalog_files.get(&file_path).copied() else {
            tracing::debug!(path = %file_path.display(), "Catalog not found");
            return Ok(None);
        };
        let catalogs: Vec<CatalogFile> = catalog_files.values().copied().collect();
        drop(catalog_files);

        crate::ide::hover::generate_hover_content(
            &*db,
            file,
            SourcePosition::from(position),
            &catalogs,
        )
    };

    let Some(hover_text) = hover_text else {
        tracing::debug!("No message at position");
        return Ok(None);
    };

    Ok(Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: hover_text,
        }),
        range: None,
    }))
}

pub async fn handle_formatting(
    backend: &Backend,
    params: DocumentFormattingParams,
) -> Result<Option<Vec<TextEdit>>> {
    let uri = params.text_document.uri;
    tracing::debug!(%uri, "Formatting request");

    let Some(file_path) = Backend::uri_to_path(&uri) else {
        return Ok(None);
    };

    let (db, catalog_files) = backend.state.lock_db_and_catalog_files().await;
    let Some(file) = catalog_files.get(&file_path).copied() else {
        return Ok(None);
    };
    drop(catalog_files);

    Ok(crate::ide::formatting::format_document(&*db, file))
}
