//! Qt Linguist `.ts` catalogs: model, reader and writer.

mod location;
pub mod model;
mod reader;
mod writer;

pub use location::{
    ResolvedLocation,
    resolve_locations,
};
pub use model::{
    Catalog,
    Context,
    LineRef,
    Location,
    Message,
    MessageKey,
    Translation,
    TranslationPayload,
    TranslationStatus,
};
pub use reader::{
    IssueKind,
    ReadError,
    ReadIssue,
    ReadOutcome,
    read_catalog,
};
pub use writer::{
    escape,
    write_catalog,
};
