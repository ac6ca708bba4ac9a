//! # poultry-ledger
//!
//! Accounting core for a poultry resale operation: supplier purchases,
//! bank deposits, debit-note discounts, customer sales, and business
//! expenses, tied together by a deterministic balance-reconciliation pass.
//!
//! The supplier side is the heart of the crate. Every mutation re-runs the
//! [`reconciliation::ReconciliationEngine`] over the full record store, so
//! the per-day movements and the running balance are always a pure function
//! of the stored purchases, deposits, and debit notes. An opening-balance
//! sentinel row anchors the running balance and can never be edited or
//! deleted.
//!
//! Storage is pluggable through [`traits::LedgerStorage`]; CSV-file and
//! in-memory backends ship in [`utils`].
//!
//! ## Example
//!
//! ```no_run
//! use poultry_ledger::{Ledger, LedgerConfig, MemoryStorage, PurchaseInput};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! # async fn run() -> Result<(), poultry_ledger::LedgerError> {
//! let mut ledger = Ledger::open(MemoryStorage::new(), LedgerConfig::default()).await?;
//! ledger
//!     .add_purchase(&PurchaseInput {
//!         date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
//!         supplier: "LIRIS SA".to_string(),
//!         unit_count: 10,
//!         outbound_kg: BigDecimal::from(100),
//!         returned_kg: BigDecimal::from(20),
//!         document_type: "Invoice".to_string(),
//!         crate_count: 4,
//!         unit_price: BigDecimal::from(1),
//!     })
//!     .await?;
//! println!("balance: {}", ledger.current_balance());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod display;
pub mod import;
pub mod ledger;
pub mod reconciliation;
pub mod sales;
pub mod traits;
pub mod types;
pub mod utils;

pub use config::LedgerConfig;
pub use import::{ImportBatch, ImportReport, Sheet};
pub use ledger::{Ledger, LedgerState};
pub use reconciliation::ReconciliationEngine;
pub use sales::alerts::{AlertPriority, CustomerAlert};
pub use traits::{DepositValidator, LedgerStorage, PurchaseValidator};
pub use types::{
    DebitNoteInput, DebitNoteRecord, DepositInput, DepositKind, DepositRecord, ExpenseInput,
    ExpenseRecord, LedgerError, LedgerResult, PurchaseInput, PurchaseRecord, SaleInput,
    SaleRecord,
};
pub use utils::{CsvStorage, MemoryStorage};
