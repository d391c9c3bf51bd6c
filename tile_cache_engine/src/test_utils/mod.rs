//! Helpers for tests that need a fresh database or a ledger node that does what they are told.
mod prepare_env;
mod stub_ledger;

pub use prepare_env::{create_database, prepare_test_env, random_db_path, run_migrations};
pub use stub_ledger::StubLedgerClient;
