pub mod ledger_store;
pub use ledger_store::LedgerStore;
pub mod memory_ledger;
pub use memory_ledger::MemoryLedgerStore;
pub mod appointments_repo;
pub use appointments_repo::PgLedgerStore;
