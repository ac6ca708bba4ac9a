//! Traits for storage abstraction and input validation

use async_trait::async_trait;

use crate::types::*;
use crate::utils::validation;

/// Storage abstraction for the ledger system
///
/// The core works against any durable backend (CSV files, a database, plain
/// memory) through this trait. A load on an absent store yields the empty
/// collection; saves must complete before the surrounding operation reports
/// success.
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// Load the purchase collection, including the sentinel row if present
    async fn load_purchases(&self) -> LedgerResult<Vec<PurchaseRecord>>;

    /// Replace the stored purchase collection
    async fn save_purchases(&mut self, records: &[PurchaseRecord]) -> LedgerResult<()>;

    /// Load the deposit collection
    async fn load_deposits(&self) -> LedgerResult<Vec<DepositRecord>>;

    /// Replace the stored deposit collection
    async fn save_deposits(&mut self, records: &[DepositRecord]) -> LedgerResult<()>;

    /// Load the debit-note collection
    async fn load_debit_notes(&self) -> LedgerResult<Vec<DebitNoteRecord>>;

    /// Replace the stored debit-note collection
    async fn save_debit_notes(&mut self, records: &[DebitNoteRecord]) -> LedgerResult<()>;

    /// Load the sales ledger
    async fn load_sales(&self) -> LedgerResult<Vec<SaleRecord>>;

    /// Replace the stored sales ledger
    async fn save_sales(&mut self, records: &[SaleRecord]) -> LedgerResult<()>;

    /// Load the expense ledger
    async fn load_expenses(&self) -> LedgerResult<Vec<ExpenseRecord>>;

    /// Replace the stored expense ledger
    async fn save_expenses(&mut self, records: &[ExpenseRecord]) -> LedgerResult<()>;
}

/// Trait for implementing custom purchase validation rules
pub trait PurchaseValidator: Send + Sync {
    /// Validate raw purchase fields before normalization
    fn validate_purchase(&self, input: &PurchaseInput) -> LedgerResult<()>;
}

/// Trait for implementing custom deposit validation rules
pub trait DepositValidator: Send + Sync {
    /// Validate raw deposit fields before the record is built
    fn validate_deposit(&self, input: &DepositInput) -> LedgerResult<()>;
}

/// Default purchase validator enforcing the entry preconditions
pub struct DefaultPurchaseValidator;

impl PurchaseValidator for DefaultPurchaseValidator {
    fn validate_purchase(&self, input: &PurchaseInput) -> LedgerResult<()> {
        validation::validate_required_text("supplier", &input.supplier)?;
        validation::validate_non_negative_count("unit count", input.unit_count)?;
        validation::validate_non_negative_count("crate count", input.crate_count)?;
        validation::validate_non_negative("outbound weight", &input.outbound_kg)?;
        validation::validate_non_negative("returned weight", &input.returned_kg)?;
        validation::validate_non_negative("unit price", &input.unit_price)?;

        if input.unit_count == 0
            && validation::is_zero(&input.outbound_kg)
            && validation::is_zero(&input.returned_kg)
        {
            return Err(LedgerError::Validation(
                "empty record: unit count and both weights are all zero".to_string(),
            ));
        }

        if input.returned_kg > input.outbound_kg {
            return Err(LedgerError::Validation(
                "returned weight cannot exceed outbound weight".to_string(),
            ));
        }

        Ok(())
    }
}

/// Default deposit validator enforcing the entry preconditions
pub struct DefaultDepositValidator;

impl DepositValidator for DefaultDepositValidator {
    fn validate_deposit(&self, input: &DepositInput) -> LedgerResult<()> {
        validation::validate_required_text("counterparty", &input.counterparty)?;
        validation::validate_required_text("agency", &input.agency)?;
        validation::validate_positive_amount("deposit amount", &input.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn purchase_input() -> PurchaseInput {
        PurchaseInput {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            supplier: "LIRIS SA".to_string(),
            unit_count: 10,
            outbound_kg: BigDecimal::from(100),
            returned_kg: BigDecimal::from(20),
            document_type: "Invoice".to_string(),
            crate_count: 5,
            unit_price: BigDecimal::from(1),
        }
    }

    #[test]
    fn accepts_a_well_formed_purchase() {
        assert!(DefaultPurchaseValidator
            .validate_purchase(&purchase_input())
            .is_ok());
    }

    #[test]
    fn rejects_negative_values() {
        let mut input = purchase_input();
        input.outbound_kg = BigDecimal::from(-1);
        let err = DefaultPurchaseValidator
            .validate_purchase(&input)
            .unwrap_err();
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn rejects_all_zero_quantity_triple() {
        let mut input = purchase_input();
        input.unit_count = 0;
        input.outbound_kg = BigDecimal::from(0);
        input.returned_kg = BigDecimal::from(0);
        let err = DefaultPurchaseValidator
            .validate_purchase(&input)
            .unwrap_err();
        assert!(err.to_string().contains("empty record"));
    }

    #[test]
    fn rejects_returned_weight_above_outbound() {
        let mut input = purchase_input();
        input.returned_kg = BigDecimal::from(150);
        let err = DefaultPurchaseValidator
            .validate_purchase(&input)
            .unwrap_err();
        assert!(err.to_string().contains("returned weight"));
    }

    #[test]
    fn rejects_non_positive_deposit_amount() {
        let input = DepositInput {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            counterparty: "LIRIS SA".to_string(),
            agency: "Banco Pichincha".to_string(),
            amount: BigDecimal::from(0),
        };
        assert!(DefaultDepositValidator.validate_deposit(&input).is_err());
    }
}
