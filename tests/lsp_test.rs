//! Language server requests against a copy of the fixture workspace.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]
#![allow(missing_docs)]
#![allow(clippy::match_wildcard_for_single_variants)]

use std::fs;
use std::path::Path;

use googletest::prelude::*;
use qt_ts_language_server::Backend;
use serde_json::json;
use tempfile::TempDir;
use tower_lsp::lsp_types::{
    DidChangeConfigurationParams,
    DidOpenTextDocumentParams,
    DocumentFormattingParams,
    FormattingOptions,
    HoverContents,
    HoverParams,
    HoverProviderCapability,
    InitializeParams,
    InitializedParams,
    OneOf,
    Position,
    TextDocumentIdentifier,
    TextDocumentItem,
    TextDocumentPositionParams,
    TextDocumentSyncCapability,
    TextDocumentSyncKind,
    Url,
    WorkDoneProgressParams,
    WorkspaceFolder,
};
use tower_lsp::{
    LanguageServer,
    LspService,
};

const TRANSLATIONS: &str = "qt/translations";

fn create_test_backend() -> Backend {
    let (service, _socket) = LspService::new(Backend::new);
    service.inner().clone()
}

fn copy_workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/workspace").join(TRANSLATIONS);
    let target = temp_dir.path().join(TRANSLATIONS);
    fs::create_dir_all(&target).unwrap();
    for name in ["transmission_ru.ts", "transmission_sl.ts"] {
        fs::copy(source.join(name), target.join(name)).unwrap();
    }
    temp_dir
}

fn catalog_uri(root: &Path, name: &str) -> Url {
    Url::from_file_path(root.join(TRANSLATIONS).join(name)).unwrap()
}

async fn start(backend: &Backend, root: &Path) {
    let params = InitializeParams {
        workspace_folders: Some(vec![WorkspaceFolder {
            uri: Url::from_file_path(root).unwrap(),
            name: "transmission".to_string(),
        }]),
        ..InitializeParams::default()
    };
    backend.initialize(params).await.unwrap();
    backend.initialized(InitializedParams {}).await;
}

async fn hover_text(backend: &Backend, uri: Url, line: u32) -> Option<String> {
    let hover = backend
        .hover(HoverParams {
            text_document_position_params: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri },
                position: Position { line, character: 10 },
            },
            work_done_progress_params: WorkDoneProgressParams::default(),
        })
        .await
        .unwrap()?;
    match hover.contents {
        HoverContents::Markup(markup) => Some(markup.value),
        _ => panic!("Expected Markup content"),
    }
}

#[tokio::test]
async fn test_initialize_advertises_capabilities() {
    let backend = create_test_backend();

    let result = backend.initialize(InitializeParams::default()).await.unwrap();

    let capabilities = result.capabilities;
    assert_eq!(
        capabilities.text_document_sync,
        Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL))
    );
    assert_eq!(capabilities.hover_provider, Some(HoverProviderCapability::Simple(true)));
    assert_eq!(capabilities.document_formatting_provider, Some(OneOf::Left(true)));
    assert_eq!(result.server_info.unwrap().name, "qt-ts-language-server");
}

#[tokio::test]
async fn test_hover_shows_every_indexed_catalog() {
    let workspace = copy_workspace();
    let backend = create_test_backend();
    start(&backend, workspace.path()).await;

    let text =
        hover_text(&backend, catalog_uri(workspace.path(), "transmission_ru.ts"), 7).await.unwrap();

    assert_that!(text, contains_substring("**Context:** `AboutDialog`"));
    assert_that!(text, contains_substring("**Location:** `../about.cc:35`"));
    assert_that!(
        text,
        contains_substring(
            "**ru_RU** (finished): `О программе \"Transmission\"`\n\
             **sl** (finished): `O programu Transmission`"
        )
    );
}

#[tokio::test]
async fn test_hover_uses_open_document_text() {
    let workspace = copy_workspace();
    let backend = create_test_backend();
    start(&backend, workspace.path()).await;

    let sl_uri = catalog_uri(workspace.path(), "transmission_sl.ts");
    let edited = fs::read_to_string(workspace.path().join(TRANSLATIONS).join("transmission_sl.ts"))
        .unwrap()
        .replace("O programu Transmission", "O Transmissionu");
    backend
        .did_open(DidOpenTextDocumentParams {
            text_document: TextDocumentItem {
                uri: sl_uri,
                language_id: "xml".to_string(),
                version: 1,
                text: edited,
            },
        })
        .await;

    let text =
        hover_text(&backend, catalog_uri(workspace.path(), "transmission_ru.ts"), 8).await.unwrap();

    assert_that!(text, contains_substring("**sl** (finished): `O Transmissionu`"));
}

#[tokio::test]
async fn test_hover_outside_message_is_none() {
    let workspace = copy_workspace();
    let backend = create_test_backend();
    start(&backend, workspace.path()).await;

    let text = hover_text(&backend, catalog_uri(workspace.path(), "transmission_ru.ts"), 4).await;

    assert_that!(text, none());
}

#[tokio::test]
async fn test_formatting_lupdate_layout_has_no_edits() {
    let workspace = copy_workspace();
    let backend = create_test_backend();
    start(&backend, workspace.path()).await;

    let edits = backend
        .formatting(DocumentFormattingParams {
            text_document: TextDocumentIdentifier {
                uri: catalog_uri(workspace.path(), "transmission_ru.ts"),
            },
            options: FormattingOptions::default(),
            work_done_progress_params: WorkDoneProgressParams::default(),
        })
        .await
        .unwrap();

    assert_that!(edits, some(is_empty()));
}

#[tokio::test]
async fn test_configuration_change_reindexes() {
    let workspace = copy_workspace();
    let backend = create_test_backend();
    start(&backend, workspace.path()).await;

    backend
        .did_change_configuration(DidChangeConfigurationParams {
            settings: json!({ "qtTs": { "excludePatterns": ["**/transmission_sl.ts"] } }),
        })
        .await;

    let text =
        hover_text(&backend, catalog_uri(workspace.path(), "transmission_ru.ts"), 7).await.unwrap();
    assert_that!(text, contains_substring("**ru_RU**"));
    assert_that!(text, not(contains_substring("**sl**")));
    assert_that!(backend.workspace_indexer.is_indexing_completed(), eq(true));
}
