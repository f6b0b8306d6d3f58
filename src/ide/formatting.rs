//! Document formatting through the `lupdate` writer.

use tower_lsp::lsp_types::{
    Position,
    Range,
    TextEdit,
};

use crate::analysis::read_ts_file;
use crate::db::LinguistDatabase;
use crate::input::catalog::CatalogFile;
use crate::ts::write_catalog;

/// Rewrites the whole document in `lupdate` layout.
///
/// Returns `None` when the file cannot be read or rewriting it would drop
/// content, and an empty list when it is already formatted.
pub fn format_document(db: &dyn LinguistDatabase, file: CatalogFile) -> Option<Vec<TextEdit>> {
    let Ok(outcome) = read_ts_file(db, file) else {
        tracing::debug!(uri = %file.uri(db), "Not formatting unreadable catalog");
        return None;
    };
    if !outcome.is_lossless() {
        tracing::debug!(uri = %file.uri(db), "Not formatting catalog with skipped content");
        return None;
    }

    let text = file.text(db);
    let formatted = write_catalog(&outcome.catalog);
    if formatted == *text {
        return Some(Vec::new());
    }

    Some(vec![TextEdit {
        range: Range { start: Position::new(0, 0), end: end_position(text) },
        new_text: formatted,
    }])
}

/// Position just past the last character, in UTF-16 code units.
fn end_position(text: &str) -> Position {
    let line = text.matches('\n').count();
    let last_line = text.rsplit('\n').next().unwrap_or_default();
    let character = last_line.encode_utf16().count();
    Position::new(
        u32::try_from(line).unwrap_or(u32::MAX),
        u32::try_from(character).unwrap_or(u32::MAX),
    )
}
