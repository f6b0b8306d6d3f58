//! Position-aware `.ts` reader.
//!
//! Structural problems (a message without `<source>`, a missing doctype, ...)
//! do not stop reading; they are collected as [`ReadIssue`]s so that every
//! problem in a file can be reported at once. Only XML syntax errors and a
//! wrong root element fail the read.

use thiserror::Error;
use xml::common::Position;
use xml::reader::{
    EventReader,
    ParserConfig,
    XmlEvent,
};

use super::model::{
    Catalog,
    Context,
    LineRef,
    Location,
    Message,
    Translation,
    TranslationPayload,
    TranslationStatus,
};
use crate::types::SourcePosition;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("{line}:{character}: malformed XML: {message}", line = .position.line + 1, character = .position.character + 1)]
    Syntax { position: SourcePosition, message: String },

    #[error("expected root element <TS>, found <{name}>")]
    UnexpectedRoot { name: String, position: SourcePosition },

    #[error("document has no root element")]
    NoRoot,
}

impl ReadError {
    /// Where the error was detected.
    #[must_use]
    pub const fn position(&self) -> SourcePosition {
        match self {
            Self::Syntax { position, .. } | Self::UnexpectedRoot { position, .. } => *position,
            Self::NoRoot => SourcePosition { line: 0, character: 0 },
        }
    }
}

/// Non-fatal structural problem found while reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    MissingDoctype,
    MissingVersion,
    MissingContextName,
    MissingSource,
    MultipleSources,
    MissingTranslation,
    UnknownElement,
    UnknownTranslationType,
    InvalidLocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadIssue {
    pub kind: IssueKind,
    pub position: SourcePosition,
    pub detail: String,
}

/// A catalog together with the issues found while reading it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadOutcome {
    pub catalog: Catalog,
    pub issues: Vec<ReadIssue>,
}

impl ReadOutcome {
    /// Whether writing the catalog back keeps everything the reader saw.
    /// Skipped elements, extra sources, unparsable lines and unknown
    /// translation types are dropped by the writer.
    #[must_use]
    pub fn is_lossless(&self) -> bool {
        !self.issues.iter().any(|issue| {
            matches!(
                issue.kind,
                IssueKind::UnknownElement
                    | IssueKind::MultipleSources
                    | IssueKind::InvalidLocation
                    | IssueKind::UnknownTranslationType
            )
        })
    }
}

/// Reads a `.ts` document.
///
/// # Errors
/// Returns [`ReadError`] when the text is not well-formed XML or its root
/// element is not `TS`.
pub fn read_catalog(text: &str) -> Result<ReadOutcome, ReadError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut parser = Parser::new(text);

    let (root_name, root_attributes, root_position) = loop {
        match parser.next_node()? {
            Node::Start { name, attributes, position } => break (name, attributes, position),
            Node::Text(_) | Node::End(_) => {}
            Node::Eof => return Err(ReadError::NoRoot),
        }
    };

    if root_name != "TS" {
        return Err(ReadError::UnexpectedRoot { name: root_name, position: root_position });
    }

    let mut catalog = Catalog {
        version: attribute(&root_attributes, "version"),
        language: attribute(&root_attributes, "language"),
        source_language: attribute(&root_attributes, "sourcelanguage"),
        has_doctype: has_ts_doctype(text),
        position: root_position,
        ..Catalog::default()
    };

    if !catalog.has_doctype {
        parser.issue(IssueKind::MissingDoctype, SourcePosition::default(), "missing <!DOCTYPE TS>");
    }
    if catalog.version.is_none() {
        parser.issue(IssueKind::MissingVersion, root_position, "<TS> has no version attribute");
    }

    loop {
        match parser.next_node()? {
            Node::Start { name, attributes, position } => match name.as_str() {
                "context" => {
                    let context = parser.read_context(position)?;
                    catalog.contexts.push(context);
                }
                "defaultcodec" => catalog.default_codec = Some(parser.read_text()?),
                _ => parser.skip_unknown(&name, &attributes, position)?,
            },
            Node::Text(_) => {}
            Node::End(_) | Node::Eof => break,
        }
    }

    tracing::debug!(
        contexts = catalog.contexts.len(),
        messages = catalog.message_count(),
        issues = parser.issues.len(),
        "Read catalog"
    );

    Ok(ReadOutcome { catalog, issues: parser.issues })
}

/// `<!DOCTYPE TS>` must appear before the root element.
fn has_ts_doctype(text: &str) -> bool {
    let head = text.find("<TS").and_then(|index| text.get(..index)).unwrap_or(text);
    head.split("<!DOCTYPE").nth(1).is_some_and(|rest| rest.trim_start().starts_with("TS"))
}

fn attribute(attributes: &[(String, String)], name: &str) -> Option<String> {
    attributes.iter().find(|(key, _)| key == name).map(|(_, value)| value.clone())
}

/// Decodes `<byte value="x1b"/>` (hex with `x`/`0x` prefix, else decimal).
fn decode_byte(value: &str) -> Option<char> {
    let code = if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix('x')) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        value.parse::<u32>().ok()?
    };
    if code == 0 { None } else { char::from_u32(code) }
}

enum Node {
    Start { name: String, attributes: Vec<(String, String)>, position: SourcePosition },
    End(SourcePosition),
    Text(String),
    Eof,
}

struct Parser<'a> {
    reader: EventReader<&'a [u8]>,
    issues: Vec<ReadIssue>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        let reader = ParserConfig::new()
            .trim_whitespace(false)
            .whitespace_to_characters(true)
            .cdata_to_characters(true)
            .ignore_comments(true)
            .coalesce_characters(true)
            .create_reader(text.as_bytes());
        Self { reader, issues: Vec::new() }
    }

    fn issue(&mut self, kind: IssueKind, position: SourcePosition, detail: impl Into<String>) {
        self.issues.push(ReadIssue { kind, position, detail: detail.into() });
    }

    fn next_node(&mut self) -> Result<Node, ReadError> {
        loop {
            let event = self.reader.next();
            let position = SourcePosition::from(self.reader.position());
            let event = event
                .map_err(|error| ReadError::Syntax { position, message: error.to_string() })?;

            match event {
                XmlEvent::StartElement { name, attributes, .. } => {
                    let attributes = attributes
                        .into_iter()
                        .map(|attribute| (attribute.name.local_name, attribute.value))
                        .collect();
                    return Ok(Node::Start { name: name.local_name, attributes, position });
                }
                XmlEvent::EndElement { .. } => return Ok(Node::End(position)),
                XmlEvent::Characters(text) | XmlEvent::Whitespace(text) | XmlEvent::CData(text) => {
                    return Ok(Node::Text(text));
                }
                XmlEvent::EndDocument => return Ok(Node::Eof),
                _ => {}
            }
        }
    }

    /// Consumes the rest of the current element.
    fn skip_element(&mut self) -> Result<(), ReadError> {
        let mut depth = 0_usize;
        loop {
            match self.next_node()? {
                Node::Start { .. } => depth += 1,
                Node::End(_) if depth == 0 => return Ok(()),
                Node::End(_) => depth -= 1,
                Node::Text(_) => {}
                Node::Eof => return Ok(()),
            }
        }
    }

    fn skip_unknown(
        &mut self,
        name: &str,
        _attributes: &[(String, String)],
        position: SourcePosition,
    ) -> Result<(), ReadError> {
        tracing::debug!(element = name, line = position.line, "Skipping unknown element");
        self.issue(IssueKind::UnknownElement, position, format!("unknown element <{name}>"));
        self.skip_element()
    }

    /// Collects the text content of the current element.
    fn read_text(&mut self) -> Result<String, ReadError> {
        let mut text = String::new();
        loop {
            match self.next_node()? {
                Node::Text(chunk) => text.push_str(&chunk),
                Node::Start { name, attributes, position } => {
                    if name == "byte" {
                        if let Some(decoded) =
                            attribute(&attributes, "value").as_deref().and_then(decode_byte)
                        {
                            text.push(decoded);
                        }
                        self.skip_element()?;
                    } else {
                        self.skip_unknown(&name, &attributes, position)?;
                    }
                }
                Node::End(_) | Node::Eof => return Ok(text),
            }
        }
    }

    fn read_context(&mut self, position: SourcePosition) -> Result<Context, ReadError> {
        let mut context = Context { position, ..Context::default() };
        let mut has_name = false;

        loop {
            match self.next_node()? {
                Node::Start { name, attributes, position } => match name.as_str() {
                    "name" => {
                        context.name = self.read_text()?;
                        has_name = true;
                    }
                    "comment" => context.comment = Some(self.read_text()?),
                    "message" => {
                        let message = self.read_message(&attributes, position)?;
                        context.messages.push(message);
                    }
                    _ => self.skip_unknown(&name, &attributes, position)?,
                },
                Node::Text(_) => {}
                Node::End(_) | Node::Eof => break,
            }
        }

        if !has_name {
            self.issue(IssueKind::MissingContextName, position, "<context> has no <name>");
        }
        Ok(context)
    }

    fn read_message(
        &mut self,
        attributes: &[(String, String)],
        position: SourcePosition,
    ) -> Result<Message, ReadError> {
        let mut message = Message {
            id: attribute(attributes, "id"),
            numerus: attribute(attributes, "numerus").is_some_and(|v| v == "yes" || v == "true"),
            position,
            ..Message::default()
        };
        let mut source_count = 0_usize;
        let mut has_translation = false;

        loop {
            match self.next_node()? {
                Node::Start { name, attributes, position } => match name.as_str() {
                    "location" => {
                        let location = self.read_location(&attributes, position);
                        message.locations.push(location);
                        self.skip_element()?;
                    }
                    "source" => {
                        source_count += 1;
                        let text = self.read_text()?;
                        if source_count == 1 {
                            message.source = text;
                            message.source_position = Some(position);
                        } else {
                            self.issue(
                                IssueKind::MultipleSources,
                                position,
                                format!("additional <source>: {text:?}"),
                            );
                        }
                    }
                    "oldsource" => message.old_source = Some(self.read_text()?),
                    "comment" => message.comment = Some(self.read_text()?),
                    "oldcomment" => message.old_comment = Some(self.read_text()?),
                    "extracomment" => message.extra_comment = Some(self.read_text()?),
                    "translatorcomment" => message.translator_comment = Some(self.read_text()?),
                    "translation" => {
                        message.translation = self.read_translation(&attributes, position)?;
                        has_translation = true;
                    }
                    extra if extra.starts_with("extra-") => {
                        let text = self.read_text()?;
                        message.extras.push((name.clone(), text));
                    }
                    _ => self.skip_unknown(&name, &attributes, position)?,
                },
                Node::Text(_) => {}
                Node::End(end) => {
                    message.end = end;
                    break;
                }
                Node::Eof => break,
            }
        }

        if source_count == 0 {
            self.issue(IssueKind::MissingSource, position, "<message> has no <source>");
        }
        if !has_translation {
            self.issue(IssueKind::MissingTranslation, position, "<message> has no <translation>");
            message.translation.present = false;
        }
        Ok(message)
    }

    fn read_location(
        &mut self,
        attributes: &[(String, String)],
        position: SourcePosition,
    ) -> Location {
        let line = attribute(attributes, "line").and_then(|value| {
            let parsed = LineRef::parse(&value);
            if parsed.is_none() {
                self.issue(
                    IssueKind::InvalidLocation,
                    position,
                    format!("invalid location line {value:?}"),
                );
            }
            parsed
        });
        Location { filename: attribute(attributes, "filename"), line }
    }

    fn read_translation(
        &mut self,
        attributes: &[(String, String)],
        position: SourcePosition,
    ) -> Result<Translation, ReadError> {
        let status = match attribute(attributes, "type") {
            None => TranslationStatus::Finished,
            Some(value) => TranslationStatus::from_attribute(&value).unwrap_or_else(|| {
                self.issue(
                    IssueKind::UnknownTranslationType,
                    position,
                    format!("unknown translation type {value:?}"),
                );
                TranslationStatus::Finished
            }),
        };

        let mut text = String::new();
        let mut forms: Option<Vec<String>> = None;

        loop {
            match self.next_node()? {
                Node::Text(chunk) => text.push_str(&chunk),
                Node::Start { name, attributes, position } => match name.as_str() {
                    "numerusform" => {
                        let form = self.read_text()?;
                        forms.get_or_insert_with(Vec::new).push(form);
                    }
                    "byte" => {
                        if let Some(decoded) =
                            attribute(&attributes, "value").as_deref().and_then(decode_byte)
                        {
                            text.push(decoded);
                        }
                        self.skip_element()?;
                    }
                    _ => self.skip_unknown(&name, &attributes, position)?,
                },
                Node::End(_) | Node::Eof => break,
            }
        }

        let payload = forms.map_or(TranslationPayload::Text(text), TranslationPayload::Plural);
        Ok(Translation { status, payload, present: true, position: Some(position) })
    }
}
