//! `lupdate`-compatible serialization.

use super::model::{
    Catalog,
    Context,
    Message,
    Translation,
    TranslationPayload,
};

const INDENT: &str = "    ";

/// Serializes a catalog in the layout `lupdate` produces.
#[must_use]
pub fn write_catalog(catalog: &Catalog) -> String {
    let mut out = String::with_capacity(catalog.message_count() * 160 + 128);

    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<!DOCTYPE TS>\n");
    out.push_str("<TS");
    push_attribute(&mut out, "version", catalog.version.as_deref());
    push_attribute(&mut out, "language", catalog.language.as_deref());
    push_attribute(&mut out, "sourcelanguage", catalog.source_language.as_deref());
    out.push_str(">\n");

    if let Some(codec) = &catalog.default_codec {
        push_element(&mut out, "", "defaultcodec", codec);
    }

    for context in &catalog.contexts {
        write_context(&mut out, context);
    }

    out.push_str("</TS>\n");
    out
}

fn write_context(out: &mut String, context: &Context) {
    out.push_str("<context>\n");
    push_element(out, INDENT, "name", &context.name);
    if let Some(comment) = &context.comment {
        push_element(out, INDENT, "comment", comment);
    }
    for message in &context.messages {
        write_message(out, message);
    }
    out.push_str("</context>\n");
}

fn write_message(out: &mut String, message: &Message) {
    let indent = INDENT.repeat(2);

    out.push_str(INDENT);
    out.push_str("<message");
    push_attribute(out, "id", message.id.as_deref());
    if message.numerus {
        push_attribute(out, "numerus", Some("yes"));
    }
    out.push_str(">\n");

    for location in &message.locations {
        out.push_str(&indent);
        out.push_str("<location");
        push_attribute(out, "filename", location.filename.as_deref());
        if let Some(line) = location.line {
            push_attribute(out, "line", Some(&line.to_string()));
        }
        out.push_str("/>\n");
    }

    push_element(out, &indent, "source", &message.source);
    let optional = [
        ("oldsource", &message.old_source),
        ("comment", &message.comment),
        ("oldcomment", &message.old_comment),
        ("extracomment", &message.extra_comment),
        ("translatorcomment", &message.translator_comment),
    ];
    for (tag, value) in optional {
        if let Some(value) = value {
            push_element(out, &indent, tag, value);
        }
    }

    if message.translation.present {
        write_translation(out, &indent, &message.translation);
    }

    for (tag, value) in &message.extras {
        push_element(out, &indent, tag, value);
    }

    out.push_str(INDENT);
    out.push_str("</message>\n");
}

fn write_translation(out: &mut String, indent: &str, translation: &Translation) {
    out.push_str(indent);
    out.push_str("<translation");
    push_attribute(out, "type", translation.status.as_attribute());
    out.push('>');

    match &translation.payload {
        TranslationPayload::Text(text) => escape_into(out, text),
        TranslationPayload::Plural(forms) if forms.is_empty() => {}
        TranslationPayload::Plural(forms) => {
            out.push('\n');
            let form_indent = format!("{indent}{INDENT}");
            for form in forms {
                push_element(out, &form_indent, "numerusform", form);
            }
            out.push_str(indent);
        }
    }

    out.push_str("</translation>\n");
}

fn push_attribute(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_into(out, value);
        out.push('"');
    }
}

fn push_element(out: &mut String, indent: &str, tag: &str, text: &str) {
    out.push_str(indent);
    out.push('<');
    out.push_str(tag);
    out.push('>');
    escape_into(out, text);
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

/// Escapes text the way `lupdate` does.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if u32::from(c) < 0x20 => {
                out.push_str(&format!("<byte value=\"x{:x}\"/>", u32::from(c)));
            }
            c if !c.is_ascii() && c.is_whitespace() => {
                out.push_str(&format!("&#x{:x};", u32::from(c)));
            }
            c => out.push(c),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::ts::model::{
        LineRef,
        Location,
        TranslationStatus,
    };
    use crate::ts::reader::read_catalog;

    const LUPDATE_LAYOUT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="ru">
<context>
    <name>AboutDialog</name>
    <message>
        <location filename="../AboutDialog.ui" line="+14"/>
        <source>About Transmission</source>
        <translation>О программе Transmission</translation>
    </message>
    <message>
        <location line="+36"/>
        <source>&lt;b&gt;Transmission %1&lt;/b&gt;</source>
        <translation>&lt;b&gt;Transmission %1&lt;/b&gt;</translation>
    </message>
</context>
<context>
    <name>FileTreeModel</name>
    <message numerus="yes">
        <location filename="../FileTreeModel.cc" line="-843"/>
        <source>%Ln file(s)</source>
        <comment>files in torrent</comment>
        <extracomment>Shown in the details dialog</extracomment>
        <translation type="unfinished">
            <numerusform>%Ln файл</numerusform>
            <numerusform>%Ln файла</numerusform>
            <numerusform></numerusform>
        </translation>
    </message>
    <message>
        <source> minute(s)</source>
        <translation type="vanished">Don&apos;t &quot;stop&quot; &amp; go</translation>
    </message>
</context>
</TS>
"#;

    #[test]
    fn test_round_trip_of_lupdate_layout_is_exact() {
        let outcome = read_catalog(LUPDATE_LAYOUT).unwrap();

        assert_eq!(write_catalog(&outcome.catalog), LUPDATE_LAYOUT);
    }

    #[test]
    fn test_round_trip_keeps_non_breaking_space_entities() {
        let polish = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="pl">
<context>
    <name>AboutDialog</name>
    <message>
        <location filename="../AboutDialog.ui" line="+14"/>
        <source>About Transmission</source>
        <translation>O&#xa0;programie</translation>
    </message>
</context>
</TS>
"#;
        let outcome = read_catalog(polish).unwrap();

        assert_eq!(
            outcome.catalog.contexts[0].messages[0].translation.forms(),
            vec!["O\u{a0}programie"]
        );
        assert_eq!(write_catalog(&outcome.catalog), polish);
    }

    #[test]
    fn test_write_is_idempotent_for_foreign_layout() {
        let foreign = r#"<TS version='2.0' language='sl'><context><name>A</name><message numerus="true">
<source>%n item(s)</source><translation><numerusform>a</numerusform><numerusform>b</numerusform></translation>
</message><message><source>x</source></message></context></TS>"#;

        let first = write_catalog(&read_catalog(foreign).unwrap().catalog);
        let reread = read_catalog(&first).unwrap();
        let second = write_catalog(&reread.catalog);

        assert_eq!(first, second);
        assert_eq!(reread.catalog.contexts[0].messages.len(), 2);
        assert_eq!(reread.catalog.contexts[0].messages[0].translation.forms().len(), 2);
        assert!(!reread.catalog.contexts[0].messages[1].translation.present);
    }

    #[googletest::test]
    fn test_write_message_child_order() {
        let mut message = Message::new("Open", Translation::text(TranslationStatus::Obsolete, "Odpri"));
        message.id = Some("open".to_string());
        message.locations.push(Location {
            filename: Some("main.cc".to_string()),
            line: Some(LineRef::Absolute(12)),
        });
        message.old_source = Some("Open...".to_string());
        message.comment = Some("menu".to_string());
        message.old_comment = Some("file menu".to_string());
        message.extra_comment = Some("Verb".to_string());
        message.translator_comment = Some("checked".to_string());
        message.extras.push(("extra-po-flags".to_string(), "no-c-format".to_string()));
        let catalog = Catalog {
            version: Some("2.1".to_string()),
            contexts: vec![Context {
                name: "Menu".to_string(),
                messages: vec![message],
                ..Context::default()
            }],
            ..Catalog::default()
        };

        let text = write_catalog(&catalog);

        let expected = r#"    <message id="open">
        <location filename="main.cc" line="12"/>
        <source>Open</source>
        <oldsource>Open...</oldsource>
        <comment>menu</comment>
        <oldcomment>file menu</oldcomment>
        <extracomment>Verb</extracomment>
        <translatorcomment>checked</translatorcomment>
        <translation type="obsolete">Odpri</translation>
        <extra-po-flags>no-c-format</extra-po-flags>
    </message>
"#;
        expect_that!(text, contains_substring(expected));
    }

    #[googletest::test]
    fn test_write_header_attribute_order() {
        let catalog = Catalog {
            version: Some("2.1".to_string()),
            language: Some("pt_BR".to_string()),
            source_language: Some("en".to_string()),
            ..Catalog::default()
        };

        let text = write_catalog(&catalog);

        expect_that!(
            text,
            contains_substring("<TS version=\"2.1\" language=\"pt_BR\" sourcelanguage=\"en\">\n")
        );
    }

    #[rstest]
    #[case::markup("<b>", "&lt;b&gt;")]
    #[case::ampersand("&Open", "&amp;Open")]
    #[case::quotes("\"it's\"", "&quot;it&apos;s&quot;")]
    #[case::whitespace_kept("a\tb\nc\r", "a\tb\nc\r")]
    #[case::escape_char("\u{1b}[0m", "<byte value=\"x1b\"/>[0m")]
    #[case::unicode("Пиры…", "Пиры…")]
    #[case::non_ascii_space("O\u{a0}programie", "O&#xa0;programie")]
    #[case::thin_space("10\u{2009}MB", "10&#x2009;MB")]
    fn test_escape(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(escape(text), expected);
    }

    #[test]
    fn test_control_characters_survive_round_trip() {
        let catalog = Catalog {
            version: Some("2.1".to_string()),
            contexts: vec![Context {
                name: "Bell".to_string(),
                messages: vec![Message::new(
                    "ring\u{7}",
                    Translation::text(TranslationStatus::Finished, "zvoni\u{7}"),
                )],
                ..Context::default()
            }],
            ..Catalog::default()
        };

        let reread = read_catalog(&write_catalog(&catalog)).unwrap();

        assert_eq!(reread.catalog.contexts[0].messages[0].source, "ring\u{7}");
        assert_eq!(reread.catalog.contexts[0].messages[0].translation.forms()[0], "zvoni\u{7}");
    }
}
