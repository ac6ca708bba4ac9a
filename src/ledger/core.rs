//! The ledger orchestrator
//!
//! Owns the in-memory record store and funnels every mutation through the
//! same protocol: validate the input, stage a copy of the state, apply the
//! change, reconcile, persist all five collections, and only then swap the
//! staged state in. A failed save leaves the in-memory state on the previous
//! snapshot; since every commit rewrites all five collections, the next
//! successful commit also brings a partially written backend back in line.

use bigdecimal::BigDecimal;
use tracing::info;
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::display::{DebitNoteRow, DepositRow, ExpenseRow, PurchaseRow, SaleRow};
use crate::import::{self, ImportBatch, ImportReport};
use crate::ledger::{debit_notes, deposits, purchases};
use crate::reconciliation::ReconciliationEngine;
use crate::sales::{self, alerts};
use crate::traits::{
    DefaultDepositValidator, DefaultPurchaseValidator, DepositValidator, LedgerStorage,
    PurchaseValidator,
};
use crate::types::*;

/// The five record collections, cloned wholesale when staging a mutation.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    pub purchases: Vec<PurchaseRecord>,
    pub deposits: Vec<DepositRecord>,
    pub debit_notes: Vec<DebitNoteRecord>,
    pub sales: Vec<SaleRecord>,
    pub expenses: Vec<ExpenseRecord>,
}

/// Ledger over a storage backend.
pub struct Ledger<S: LedgerStorage> {
    storage: S,
    config: LedgerConfig,
    engine: ReconciliationEngine,
    state: LedgerState,
    purchase_validator: Box<dyn PurchaseValidator>,
    deposit_validator: Box<dyn DepositValidator>,
}

impl<S: LedgerStorage> Ledger<S> {
    /// Open the ledger with the default validators.
    pub async fn open(storage: S, config: LedgerConfig) -> LedgerResult<Self> {
        Self::open_with_validators(
            storage,
            config,
            Box::new(DefaultPurchaseValidator),
            Box::new(DefaultDepositValidator),
        )
        .await
    }

    /// Open the ledger, loading every collection and reconciling once so the
    /// in-memory and stored purchase rows start from a consistent snapshot.
    pub async fn open_with_validators(
        mut storage: S,
        config: LedgerConfig,
        purchase_validator: Box<dyn PurchaseValidator>,
        deposit_validator: Box<dyn DepositValidator>,
    ) -> LedgerResult<Self> {
        let engine = ReconciliationEngine::new(config.clone());
        let mut state = LedgerState {
            purchases: storage.load_purchases().await?,
            deposits: storage.load_deposits().await?,
            debit_notes: storage.load_debit_notes().await?,
            sales: storage.load_sales().await?,
            expenses: storage.load_expenses().await?,
        };
        state.purchases = engine.reconcile(&state.purchases, &state.deposits, &state.debit_notes);
        storage.save_purchases(&state.purchases).await?;
        info!(
            purchases = state.purchases.len(),
            deposits = state.deposits.len(),
            "ledger opened"
        );
        Ok(Self {
            storage,
            config,
            engine,
            state,
            purchase_validator,
            deposit_validator,
        })
    }

    /// Reconcile a staged state, persist all five collections, and swap it
    /// in. On any save error the in-memory state is left untouched.
    async fn commit(&mut self, mut staged: LedgerState) -> LedgerResult<()> {
        staged.purchases =
            self.engine
                .reconcile(&staged.purchases, &staged.deposits, &staged.debit_notes);
        self.storage.save_purchases(&staged.purchases).await?;
        self.storage.save_deposits(&staged.deposits).await?;
        self.storage.save_debit_notes(&staged.debit_notes).await?;
        self.storage.save_sales(&staged.sales).await?;
        self.storage.save_expenses(&staged.expenses).await?;
        self.state = staged;
        Ok(())
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn purchases(&self) -> &[PurchaseRecord] {
        &self.state.purchases
    }

    pub fn deposits(&self) -> &[DepositRecord] {
        &self.state.deposits
    }

    pub fn debit_notes(&self) -> &[DebitNoteRecord] {
        &self.state.debit_notes
    }

    pub fn sales(&self) -> &[SaleRecord] {
        &self.state.sales
    }

    pub fn expenses(&self) -> &[ExpenseRecord] {
        &self.state.expenses
    }

    /// Running balance after the latest purchase date; the opening balance
    /// when no purchases exist.
    pub fn current_balance(&self) -> BigDecimal {
        self.state
            .purchases
            .last()
            .map(|r| r.cumulative_balance.clone())
            .unwrap_or_else(|| self.config.initial_balance.clone())
    }

    /// Add a purchase and return its assigned sequence number.
    pub async fn add_purchase(&mut self, input: &PurchaseInput) -> LedgerResult<String> {
        self.purchase_validator.validate_purchase(input)?;
        let mut staged = self.state.clone();
        let sequence = purchases::next_sequence(&staged.purchases);
        staged
            .purchases
            .push(purchases::build_record(sequence.clone(), input, &self.config));
        self.commit(staged).await?;
        info!(%sequence, "purchase added");
        Ok(sequence)
    }

    /// Replace the purchase with the given sequence, keeping the sequence.
    pub async fn edit_purchase(
        &mut self,
        sequence: &str,
        input: &PurchaseInput,
    ) -> LedgerResult<()> {
        if sequence == SENTINEL_SEQUENCE {
            return Err(LedgerError::SentinelProtected);
        }
        self.purchase_validator.validate_purchase(input)?;
        let mut staged = self.state.clone();
        let position = staged
            .purchases
            .iter()
            .position(|r| !r.is_sentinel() && r.sequence == sequence)
            .ok_or_else(|| LedgerError::NotFound(format!("purchase {sequence}")))?;
        staged.purchases[position] =
            purchases::build_record(sequence.to_string(), input, &self.config);
        self.commit(staged).await
    }

    /// Delete the purchase with the given sequence. Sequences are not
    /// reassigned afterward.
    pub async fn delete_purchase(&mut self, sequence: &str) -> LedgerResult<()> {
        if sequence == SENTINEL_SEQUENCE {
            return Err(LedgerError::SentinelProtected);
        }
        let mut staged = self.state.clone();
        let position = staged
            .purchases
            .iter()
            .position(|r| !r.is_sentinel() && r.sequence == sequence)
            .ok_or_else(|| LedgerError::NotFound(format!("purchase {sequence}")))?;
        staged.purchases.remove(position);
        self.commit(staged).await
    }

    /// Add a deposit and return its assigned sequence number.
    pub async fn add_deposit(&mut self, input: &DepositInput) -> LedgerResult<String> {
        self.deposit_validator.validate_deposit(input)?;
        let mut staged = self.state.clone();
        let sequence = deposits::next_sequence(&staged.deposits);
        staged
            .deposits
            .push(deposits::build_record(sequence.clone(), input, &self.config));
        self.commit(staged).await?;
        Ok(sequence)
    }

    /// Replace the deposit with the given sequence. The document kind is
    /// re-derived from the new agency name.
    pub async fn edit_deposit(&mut self, sequence: &str, input: &DepositInput) -> LedgerResult<()> {
        self.deposit_validator.validate_deposit(input)?;
        let mut staged = self.state.clone();
        let position = staged
            .deposits
            .iter()
            .position(|r| r.sequence == sequence)
            .ok_or_else(|| LedgerError::NotFound(format!("deposit {sequence}")))?;
        staged.deposits[position] =
            deposits::build_record(sequence.to_string(), input, &self.config);
        self.commit(staged).await
    }

    pub async fn delete_deposit(&mut self, sequence: &str) -> LedgerResult<()> {
        let mut staged = self.state.clone();
        let position = staged
            .deposits
            .iter()
            .position(|r| r.sequence == sequence)
            .ok_or_else(|| LedgerError::NotFound(format!("deposit {sequence}")))?;
        staged.deposits.remove(position);
        self.commit(staged).await
    }

    /// Add a debit note, snapshotting the day's weight against the current
    /// purchase collection, and return its id.
    pub async fn add_debit_note(&mut self, input: &DebitNoteInput) -> LedgerResult<Uuid> {
        debit_notes::validate_note(input)?;
        let mut staged = self.state.clone();
        let id = Uuid::new_v4();
        let record = debit_notes::build_record(id, input, &staged.purchases);
        staged.debit_notes.push(record);
        self.commit(staged).await?;
        Ok(id)
    }

    /// Replace the debit note with the given id, retaking the weight
    /// snapshot.
    pub async fn edit_debit_note(&mut self, id: Uuid, input: &DebitNoteInput) -> LedgerResult<()> {
        debit_notes::validate_note(input)?;
        let mut staged = self.state.clone();
        let position = staged
            .debit_notes
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| LedgerError::NotFound(format!("debit note {id}")))?;
        staged.debit_notes[position] = debit_notes::build_record(id, input, &staged.purchases);
        self.commit(staged).await
    }

    pub async fn delete_debit_note(&mut self, id: Uuid) -> LedgerResult<()> {
        let mut staged = self.state.clone();
        let position = staged
            .debit_notes
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| LedgerError::NotFound(format!("debit note {id}")))?;
        staged.debit_notes.remove(position);
        self.commit(staged).await
    }

    /// Add a sale and return its id.
    pub async fn add_sale(&mut self, input: &SaleInput) -> LedgerResult<Uuid> {
        sales::validate_sale(input)?;
        let mut staged = self.state.clone();
        let id = Uuid::new_v4();
        staged.sales.push(sales::build_sale(id, input));
        self.commit(staged).await?;
        Ok(id)
    }

    pub async fn edit_sale(&mut self, id: Uuid, input: &SaleInput) -> LedgerResult<()> {
        sales::validate_sale(input)?;
        let mut staged = self.state.clone();
        let position = staged
            .sales
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| LedgerError::NotFound(format!("sale {id}")))?;
        staged.sales[position] = sales::build_sale(id, input);
        self.commit(staged).await
    }

    pub async fn delete_sale(&mut self, id: Uuid) -> LedgerResult<()> {
        let mut staged = self.state.clone();
        let position = staged
            .sales
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| LedgerError::NotFound(format!("sale {id}")))?;
        staged.sales.remove(position);
        self.commit(staged).await
    }

    /// Delete the whole sales ledger.
    pub async fn clear_sales(&mut self) -> LedgerResult<()> {
        let mut staged = self.state.clone();
        staged.sales.clear();
        self.commit(staged).await
    }

    /// Delete the whole expense ledger.
    pub async fn clear_expenses(&mut self) -> LedgerResult<()> {
        let mut staged = self.state.clone();
        staged.expenses.clear();
        self.commit(staged).await
    }

    /// Add an expense and return its id.
    pub async fn add_expense(&mut self, input: &ExpenseInput) -> LedgerResult<Uuid> {
        sales::validate_expense(input)?;
        let mut staged = self.state.clone();
        let id = Uuid::new_v4();
        staged.expenses.push(sales::build_expense(id, input));
        self.commit(staged).await?;
        Ok(id)
    }

    pub async fn edit_expense(&mut self, id: Uuid, input: &ExpenseInput) -> LedgerResult<()> {
        sales::validate_expense(input)?;
        let mut staged = self.state.clone();
        let position = staged
            .expenses
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| LedgerError::NotFound(format!("expense {id}")))?;
        staged.expenses[position] = sales::build_expense(id, input);
        self.commit(staged).await
    }

    pub async fn delete_expense(&mut self, id: Uuid) -> LedgerResult<()> {
        let mut staged = self.state.clone();
        let position = staged
            .expenses
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| LedgerError::NotFound(format!("expense {id}")))?;
        staged.expenses.remove(position);
        self.commit(staged).await
    }

    /// Import a batch of sheets. The whole batch commits as one mutation;
    /// the report tallies what landed and what was skipped.
    pub async fn import_batch(&mut self, batch: &ImportBatch) -> LedgerResult<ImportReport> {
        let mut staged = self.state.clone();
        let report = import::apply_batch(
            batch,
            &mut staged.purchases,
            &mut staged.deposits,
            &mut staged.debit_notes,
            &mut staged.sales,
            &mut staged.expenses,
            &self.config,
        );
        self.commit(staged).await?;
        info!(
            purchases = report.purchases_added,
            sales = report.sales_added,
            duplicates = report.duplicates_skipped,
            "import batch applied"
        );
        Ok(report)
    }

    /// Customers whose outstanding balances warrant attention.
    pub fn customer_alerts(&self) -> Vec<alerts::CustomerAlert> {
        alerts::analyze(&self.state.sales, &self.config)
    }

    pub fn purchase_rows(&self) -> Vec<PurchaseRow> {
        self.state.purchases.iter().map(PurchaseRow::from).collect()
    }

    pub fn deposit_rows(&self) -> Vec<DepositRow> {
        self.state.deposits.iter().map(DepositRow::from).collect()
    }

    pub fn debit_note_rows(&self) -> Vec<DebitNoteRow> {
        self.state.debit_notes.iter().map(DebitNoteRow::from).collect()
    }

    pub fn sale_rows(&self) -> Vec<SaleRow> {
        self.state.sales.iter().map(SaleRow::from).collect()
    }

    pub fn expense_rows(&self) -> Vec<ExpenseRow> {
        self.state.expenses.iter().map(ExpenseRow::from).collect()
    }
}
