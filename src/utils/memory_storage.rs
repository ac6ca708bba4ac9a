//! In-memory storage backend
//!
//! The default backend for tests and ephemeral sessions. Clones share the
//! same underlying collections, so a cloned handle observes writes made
//! through the original.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::traits::LedgerStorage;
use crate::types::*;

/// Storage backend that keeps every collection in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    purchases: Arc<RwLock<Vec<PurchaseRecord>>>,
    deposits: Arc<RwLock<Vec<DepositRecord>>>,
    debit_notes: Arc<RwLock<Vec<DebitNoteRecord>>>,
    sales: Arc<RwLock<Vec<SaleRecord>>>,
    expenses: Arc<RwLock<Vec<ExpenseRecord>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save fail. Used to exercise the callers'
    /// rollback paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn read<T: Clone>(lock: &RwLock<Vec<T>>) -> LedgerResult<Vec<T>> {
        lock.read()
            .map(|guard| guard.clone())
            .map_err(|_| LedgerError::Persistence("storage lock poisoned".to_string()))
    }

    fn write<T: Clone>(&self, lock: &RwLock<Vec<T>>, records: &[T]) -> LedgerResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LedgerError::Persistence(
                "simulated write failure".to_string(),
            ));
        }
        let mut guard = lock
            .write()
            .map_err(|_| LedgerError::Persistence("storage lock poisoned".to_string()))?;
        *guard = records.to_vec();
        Ok(())
    }
}

#[async_trait]
impl LedgerStorage for MemoryStorage {
    async fn load_purchases(&self) -> LedgerResult<Vec<PurchaseRecord>> {
        Self::read(&self.purchases)
    }

    async fn save_purchases(&mut self, records: &[PurchaseRecord]) -> LedgerResult<()> {
        self.write(&self.purchases, records)
    }

    async fn load_deposits(&self) -> LedgerResult<Vec<DepositRecord>> {
        Self::read(&self.deposits)
    }

    async fn save_deposits(&mut self, records: &[DepositRecord]) -> LedgerResult<()> {
        self.write(&self.deposits, records)
    }

    async fn load_debit_notes(&self) -> LedgerResult<Vec<DebitNoteRecord>> {
        Self::read(&self.debit_notes)
    }

    async fn save_debit_notes(&mut self, records: &[DebitNoteRecord]) -> LedgerResult<()> {
        self.write(&self.debit_notes, records)
    }

    async fn load_sales(&self) -> LedgerResult<Vec<SaleRecord>> {
        Self::read(&self.sales)
    }

    async fn save_sales(&mut self, records: &[SaleRecord]) -> LedgerResult<()> {
        self.write(&self.sales, records)
    }

    async fn load_expenses(&self) -> LedgerResult<Vec<ExpenseRecord>> {
        Self::read(&self.expenses)
    }

    async fn save_expenses(&mut self, records: &[ExpenseRecord]) -> LedgerResult<()> {
        self.write(&self.expenses, records)
    }
}
