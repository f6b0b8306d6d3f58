//! Salsa database definition.

#[salsa::db]
pub trait LinguistDatabase: salsa::Database {}

#[salsa::db]
#[derive(Clone, Default)]
pub struct LinguistDatabaseImpl {
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl salsa::Database for LinguistDatabaseImpl {}

#[salsa::db]
impl LinguistDatabase for LinguistDatabaseImpl {}
