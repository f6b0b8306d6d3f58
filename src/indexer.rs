//! Workspace indexing.

pub mod types;
pub mod workspace;
