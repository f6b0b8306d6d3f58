//! Hover over a `<message>`: the message in every indexed catalog.

use std::fmt::Write as _;
use std::path::Path;

use crate::analysis::{
    message_at_position,
    read_ts_file,
};
use crate::db::LinguistDatabase;
use crate::input::catalog::{
    CatalogFile,
    language_from_path,
};
use crate::ts::{
    Message,
    TranslationPayload,
    TranslationStatus,
    resolve_locations,
};
use crate::types::SourcePosition;

/// Longest translation shown before it is cut.
const MAX_VALUE_LENGTH: usize = 120;

/// Builds the hover markdown for the message under `position`.
///
/// `catalogs` are the other catalogs to look the message up in; `file`
/// itself is always included. Catalogs are listed by language.
pub fn generate_hover_content(
    db: &dyn LinguistDatabase,
    file: CatalogFile,
    position: SourcePosition,
    catalogs: &[CatalogFile],
) -> Option<String> {
    let reference = message_at_position(db, file, position)?;
    let outcome = read_ts_file(db, file).as_ref().ok()?;
    let (context, message) = reference.get(outcome)?;
    let key = message.key(context);

    let mut content =
        format!("**Context:** `{context}`\n\n**Source:** {}\n", format_text(&message.source));
    if let Some(comment) = message.comment.as_deref().filter(|comment| !comment.is_empty()) {
        let _ = write!(content, "\n**Disambiguation:** {comment}\n");
    }
    if let Some(extra) = message.extra_comment.as_deref().filter(|extra| !extra.is_empty()) {
        let _ = write!(content, "\n**Note:** {extra}\n");
    }

    let locations = resolve_locations(&outcome.catalog);
    if let Some(location) = locations.get(reference.flat_index(outcome)).and_then(|l| l.first())
        && let Some(filename) = &location.filename
    {
        match location.line {
            Some(line) => {
                let _ = write!(content, "\n**Location:** `{filename}:{line}`\n");
            }
            None => {
                let _ = write!(content, "\n**Location:** `{filename}`\n");
            }
        }
    }

    let mut found: Vec<(String, String)> = Vec::new();
    let current_uri = file.uri(db);
    let others = catalogs.iter().copied().filter(|other| other.uri(db) != current_uri);
    for catalog_file in std::iter::once(file).chain(others) {
        let Ok(other) = read_ts_file(db, catalog_file) else {
            continue;
        };
        let Some((_, other_message)) = other
            .catalog
            .messages()
            .find(|(other_context, other_message)| other_message.key(&other_context.name) == key)
        else {
            continue;
        };
        let language = other
            .catalog
            .language
            .clone()
            .filter(|language| !language.is_empty())
            .or_else(|| uri_language(catalog_file.uri(db)))
            .unwrap_or_else(|| "unknown".to_string());
        found.push((language, format_translation(other_message)));
    }

    found.sort_by(|(a, _), (b, _)| a.cmp(b));

    content.push('\n');
    for (language, value) in found {
        let _ = writeln!(content, "**{language}** {value}");
    }

    Some(content.trim_end().to_string())
}

fn uri_language(uri: &str) -> Option<String> {
    let path = uri.rsplit('/').next()?;
    language_from_path(Path::new(path))
}

fn format_translation(message: &Message) -> String {
    let translation = &message.translation;
    let status = if translation.present { status_label(translation.status) } else { "missing" };

    match &translation.payload {
        TranslationPayload::Text(text) => format!("({status}): {}", format_text(text)),
        TranslationPayload::Plural(forms) => {
            let mut result = format!("({status}, plural)");
            for (index, form) in forms.iter().enumerate() {
                let _ = write!(result, "\n  [{index}] {}", format_text(form));
            }
            result
        }
    }
}

const fn status_label(status: TranslationStatus) -> &'static str {
    match status {
        TranslationStatus::Finished => "finished",
        TranslationStatus::Unfinished => "unfinished",
        TranslationStatus::Obsolete => "obsolete",
        TranslationStatus::Vanished => "vanished",
    }
}

fn format_text(text: &str) -> String {
    if text.is_empty() {
        return "_(empty)_".to_string();
    }
    let text = truncate_string(&text.replace('\n', "⏎"), MAX_VALUE_LENGTH);
    if text.contains('`') { format!("`` {text} ``") } else { format!("`{text}`") }
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;
    use crate::db::LinguistDatabaseImpl;

    const SLOVENIAN: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="sl">
<context>
    <name>MainWindow</name>
    <message>
        <location filename="../MainWindow.ui" line="+35"/>
        <source>&amp;Open</source>
        <translation>&amp;Odpri</translation>
    </message>
    <message numerus="yes">
        <location line="+10"/>
        <source>%Ln torrent(s)</source>
        <translation type="unfinished">
            <numerusform>%Ln torrent</numerusform>
            <numerusform>%Ln torrenta</numerusform>
        </translation>
    </message>
</context>
</TS>
"#;

    const RUSSIAN: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="ru">
<context>
    <name>MainWindow</name>
    <message>
        <source>&amp;Open</source>
        <translation>&amp;Открыть</translation>
    </message>
</context>
</TS>
"#;

    #[fixture]
    fn db() -> LinguistDatabaseImpl {
        LinguistDatabaseImpl::default()
    }

    #[rstest]
    fn hover_lists_every_catalog_by_language(db: LinguistDatabaseImpl) {
        let sl = CatalogFile::new(&db, "file:///tr/app_sl.ts".to_string(), SLOVENIAN.to_string());
        let ru = CatalogFile::new(&db, "file:///tr/app_ru.ts".to_string(), RUSSIAN.to_string());

        let content =
            generate_hover_content(&db, sl, SourcePosition::new(7, 12), &[sl, ru]).unwrap();

        assert_eq!(
            content,
            "**Context:** `MainWindow`\n\n**Source:** `&Open`\n\n\
             **Location:** `../MainWindow.ui:35`\n\n\
             **ru** (finished): `&Открыть`\n\
             **sl** (finished): `&Odpri`"
        );
    }

    #[rstest]
    #[googletest::test]
    fn hover_shows_plural_forms_and_status(db: LinguistDatabaseImpl) {
        let sl = CatalogFile::new(&db, "file:///tr/app_sl.ts".to_string(), SLOVENIAN.to_string());

        let content = generate_hover_content(&db, sl, SourcePosition::new(13, 4), &[]).unwrap();

        expect_that!(content, contains_substring("**Location:** `../MainWindow.ui:45`"));
        expect_that!(
            content,
            contains_substring(
                "**sl** (unfinished, plural)\n  [0] `%Ln torrent`\n  [1] `%Ln torrenta`"
            )
        );
    }

    #[rstest]
    #[googletest::test]
    fn hover_outside_message_is_none(db: LinguistDatabaseImpl) {
        let sl = CatalogFile::new(&db, "file:///tr/app_sl.ts".to_string(), SLOVENIAN.to_string());

        expect_that!(generate_hover_content(&db, sl, SourcePosition::new(4, 8), &[sl]), none());
    }

    #[rstest]
    #[googletest::test]
    fn hover_falls_back_to_file_name_language(db: LinguistDatabaseImpl) {
        let sl = CatalogFile::new(&db, "file:///tr/app_sl.ts".to_string(), SLOVENIAN.to_string());
        let de = CatalogFile::new(
            &db,
            "file:///tr/app_de.ts".to_string(),
            RUSSIAN.replace(" language=\"ru\"", ""),
        );

        let content = generate_hover_content(&db, sl, SourcePosition::new(6, 8), &[de]).unwrap();

        expect_that!(content, contains_substring("**de** (finished): `&Открыть`"));
    }

    #[rstest]
    #[case::plain("Open", "`Open`")]
    #[case::empty("", "_(empty)_")]
    #[case::backtick("a `b`", "`` a `b` ``")]
    #[case::newline("a\nb", "`a⏎b`")]
    fn format_text_cases(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(format_text(text), expected);
    }

    #[rstest]
    fn truncate_long_values() {
        let long = "x".repeat(MAX_VALUE_LENGTH + 5);

        let truncated = truncate_string(&long, MAX_VALUE_LENGTH);

        assert_eq!(truncated.chars().count(), MAX_VALUE_LENGTH + 3);
        assert!(truncated.ends_with("..."));
    }
}
