//! Language server features.

pub mod backend;
pub mod diagnostics;
pub mod formatting;
mod handlers;
pub mod hover;
pub mod state;
