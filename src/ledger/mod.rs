//! Ledger orchestration and per-collection record builders

pub mod core;
pub mod debit_notes;
pub mod deposits;
pub mod purchases;

pub use core::{Ledger, LedgerState};
