//! Salsa inputs.

pub mod catalog;
