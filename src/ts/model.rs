//! In-memory representation of a Qt Linguist `.ts` catalog.

use crate::types::SourcePosition;

/// One `.ts` document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    /// `TS/@version`
    pub version: Option<String>,
    /// `TS/@language`, e.g. `sl`, `ru_RU`
    pub language: Option<String>,
    /// `TS/@sourcelanguage`
    pub source_language: Option<String>,
    /// `<!DOCTYPE TS>` appears before the root element.
    pub has_doctype: bool,
    /// Legacy `<defaultcodec>` child of `TS`.
    pub default_codec: Option<String>,
    pub contexts: Vec<Context>,
    /// Position of the `<TS>` element.
    pub position: SourcePosition,
}

/// A named group of messages, one per UI class.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Context {
    pub name: String,
    pub comment: Option<String>,
    pub messages: Vec<Message>,
    pub position: SourcePosition,
}

/// One translatable unit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub id: Option<String>,
    pub numerus: bool,
    pub locations: Vec<Location>,
    /// Canonical source text; the lookup key.
    pub source: String,
    pub old_source: Option<String>,
    /// Disambiguation.
    pub comment: Option<String>,
    pub old_comment: Option<String>,
    /// Developer guidance for translators.
    pub extra_comment: Option<String>,
    pub translator_comment: Option<String>,
    pub translation: Translation,
    /// `extra-*` elements, kept verbatim as (tag, text).
    pub extras: Vec<(String, String)>,
    pub position: SourcePosition,
    /// Start of the closing `</message>` tag.
    pub end: SourcePosition,
    pub source_position: Option<SourcePosition>,
}

/// `<location filename=".." line=".."/>`
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Location {
    pub filename: Option<String>,
    pub line: Option<LineRef>,
}

/// A location line, either absolute or relative to the previous reference
/// to the same file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineRef {
    Absolute(u32),
    Relative(i64),
}

impl LineRef {
    /// Parses `35`, `+35` or `-843`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with('+') || value.starts_with('-') {
            value.parse::<i64>().ok().map(Self::Relative)
        } else {
            value.parse::<u32>().ok().map(Self::Absolute)
        }
    }
}

impl std::fmt::Display for LineRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absolute(line) => write!(f, "{line}"),
            Self::Relative(offset) => write!(f, "{offset:+}"),
        }
    }
}

/// Translation state from the `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TranslationStatus {
    /// No `type` attribute.
    #[default]
    Finished,
    Unfinished,
    Obsolete,
    Vanished,
}

impl TranslationStatus {
    #[must_use]
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "unfinished" => Some(Self::Unfinished),
            "obsolete" => Some(Self::Obsolete),
            "vanished" => Some(Self::Vanished),
            _ => None,
        }
    }

    /// Value of the `type` attribute, `None` for finished translations.
    #[must_use]
    pub const fn as_attribute(self) -> Option<&'static str> {
        match self {
            Self::Finished => None,
            Self::Unfinished => Some("unfinished"),
            Self::Obsolete => Some("obsolete"),
            Self::Vanished => Some("vanished"),
        }
    }

    /// Obsolete and vanished messages no longer exist in the application.
    #[must_use]
    pub const fn is_retired(self) -> bool {
        matches!(self, Self::Obsolete | Self::Vanished)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TranslationPayload {
    Text(String),
    /// Ordered `<numerusform>` values.
    Plural(Vec<String>),
}

impl Default for TranslationPayload {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// The `<translation>` element of a message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Translation {
    pub status: TranslationStatus,
    pub payload: TranslationPayload,
    /// `false` when the message had no `<translation>` element at all.
    pub present: bool,
    pub position: Option<SourcePosition>,
}

impl Translation {
    #[must_use]
    pub fn text(status: TranslationStatus, text: impl Into<String>) -> Self {
        Self {
            status,
            payload: TranslationPayload::Text(text.into()),
            present: true,
            position: None,
        }
    }

    #[must_use]
    pub fn plural(status: TranslationStatus, forms: Vec<String>) -> Self {
        Self { status, payload: TranslationPayload::Plural(forms), present: true, position: None }
    }

    /// The payload as a list of forms; plain text is a single form.
    #[must_use]
    pub fn forms(&self) -> &[String] {
        match &self.payload {
            TranslationPayload::Text(text) => std::slice::from_ref(text),
            TranslationPayload::Plural(forms) => forms,
        }
    }

    #[must_use]
    pub const fn is_plural(&self) -> bool {
        matches!(self.payload, TranslationPayload::Plural(_))
    }
}

/// Key a message is looked up by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageKey {
    pub context: String,
    pub source: String,
    pub comment: String,
}

impl Message {
    #[must_use]
    pub fn new(source: impl Into<String>, translation: Translation) -> Self {
        Self { source: source.into(), translation, ..Self::default() }
    }

    /// Finished and every form filled in.
    #[must_use]
    pub fn is_translated(&self) -> bool {
        self.translation.status == TranslationStatus::Finished
            && self.translation.present
            && self.translation.forms().iter().all(|form| !form.is_empty())
    }

    #[must_use]
    pub fn key(&self, context: &str) -> MessageKey {
        MessageKey {
            context: context.to_string(),
            source: self.source.clone(),
            comment: self.comment.clone().unwrap_or_default(),
        }
    }
}

impl Catalog {
    /// All messages with their context, in document order.
    pub fn messages(&self) -> impl Iterator<Item = (&Context, &Message)> {
        self.contexts
            .iter()
            .flat_map(|context| context.messages.iter().map(move |message| (context, message)))
    }

    #[must_use]
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|context| context.name == name)
    }

    #[must_use]
    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|context| context.messages.len()).sum()
    }
}
