//! qt-ts-language-server
//!
//! Reader, writer, checks and a Language Server for Qt Linguist `.ts`
//! translation catalogs.

pub mod analysis;
pub mod checks;
pub mod cli;
pub mod config;
pub mod db;
pub mod ide;
pub mod indexer;
pub mod input;
pub mod lookup;
pub mod plural;
pub mod stats;
pub mod ts;
pub mod types;

pub use ide::backend::Backend;
