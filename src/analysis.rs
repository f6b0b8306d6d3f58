//! Memoised queries over catalog files.

use crate::checks::{
    CheckSettings,
    Finding,
    check_catalog,
    check_read_error,
};
use crate::db::LinguistDatabase;
use crate::input::catalog::CatalogFile;
use crate::ts::{
    Message,
    ReadError,
    ReadOutcome,
    read_catalog,
};
use crate::types::{
    SourcePosition,
    SourceRange,
};

/// Parses a catalog file.
#[salsa::tracked(returns(ref))]
pub fn read_ts_file(db: &dyn LinguistDatabase, file: CatalogFile) -> Result<ReadOutcome, ReadError> {
    let result = read_catalog(file.text(db));
    if let Err(error) = &result {
        tracing::debug!(uri = %file.uri(db), %error, "Catalog could not be read");
    }
    result
}

/// Runs the integrity checks for one file.
#[salsa::tracked]
#[allow(clippy::needless_pass_by_value)]
pub fn file_findings(
    db: &dyn LinguistDatabase,
    file: CatalogFile,
    settings: CheckSettings,
) -> Vec<Finding> {
    match read_ts_file(db, file) {
        Ok(outcome) => check_catalog(outcome, &settings),
        Err(error) => check_read_error(error, &settings),
    }
}

/// Index of a message inside its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub context: usize,
    pub message: usize,
}

impl MessageRef {
    /// Resolves the reference against a read catalog.
    #[must_use]
    pub fn get<'a>(&self, outcome: &'a ReadOutcome) -> Option<(&'a str, &'a Message)> {
        let context = outcome.catalog.contexts.get(self.context)?;
        let message = context.messages.get(self.message)?;
        Some((context.name.as_str(), message))
    }

    /// Position of the message in [`crate::ts::Catalog::messages`] order.
    #[must_use]
    pub fn flat_index(&self, outcome: &ReadOutcome) -> usize {
        outcome
            .catalog
            .contexts
            .iter()
            .take(self.context)
            .map(|context| context.messages.len())
            .sum::<usize>()
            + self.message
    }
}

/// Finds the `<message>` element enclosing a position.
#[salsa::tracked]
pub fn message_at_position(
    db: &dyn LinguistDatabase,
    file: CatalogFile,
    position: SourcePosition,
) -> Option<MessageRef> {
    let outcome = read_ts_file(db, file).as_ref().ok()?;

    outcome.catalog.contexts.iter().enumerate().find_map(|(context_index, context)| {
        context.messages.iter().position(|message| message_span(message).contains(position)).map(
            |message_index| MessageRef { context: context_index, message: message_index },
        )
    })
}

fn message_span(message: &Message) -> SourceRange {
    SourceRange {
        start: message.position,
        end: SourcePosition { line: message.end.line, character: u32::MAX },
    }
}
