//! Core record types and error taxonomy for the ledger system

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supplier name that marks the opening-balance sentinel row.
pub const SENTINEL_SUPPLIER: &str = "OPENING_BALANCE";

/// Sequence number reserved for the sentinel row.
pub const SENTINEL_SEQUENCE: &str = "00";

/// Epoch marker date carried by the sentinel row. Sorts before any real
/// purchase so the opening balance always heads the collection.
pub fn sentinel_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).expect("1900-01-01 is a valid date")
}

/// Kind of deposit document, derived from the agency name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepositKind {
    /// Deposited through a cash machine (agency name carries the marker)
    CashDeposit,
    /// Bank-to-bank transfer
    Transfer,
}

impl DepositKind {
    /// Derive the document kind from an agency name. Re-run whenever the
    /// agency field changes.
    pub fn from_agency(agency: &str, cash_machine_marker: &str) -> Self {
        if agency.contains(cash_machine_marker) {
            DepositKind::CashDeposit
        } else {
            DepositKind::Transfer
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DepositKind::CashDeposit => "Cash deposit",
            DepositKind::Transfer => "Transfer",
        }
    }
}

/// One supplier delivery, with the derived weight/money columns filled in by
/// the purchase normalizer and the balance columns owned by the
/// reconciliation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    /// Zero-padded sequence number, unique among non-sentinel rows ("00" is
    /// reserved for the sentinel)
    pub sequence: String,
    pub date: NaiveDate,
    pub supplier: String,
    pub product: String,
    pub unit_count: i64,
    /// Weight leaving the supplier, in kg
    pub outbound_kg: BigDecimal,
    /// Weight returned to the supplier, in kg
    pub returned_kg: BigDecimal,
    pub document_type: String,
    pub crate_count: i64,
    pub unit_price: BigDecimal,
    /// Derived: net weight in lb divided by unit count (0 when count is 0)
    pub average_lb: BigDecimal,
    /// Derived: outbound minus returned, in kg
    pub net_kg: BigDecimal,
    /// Derived: net weight converted to lb
    pub net_lb: BigDecimal,
    /// Derived: net lb times unit price
    pub total: BigDecimal,
    /// Written by the reconciliation engine: full daily deposit total for
    /// this (date, supplier) pair
    pub deposit_amount: BigDecimal,
    /// Written by the reconciliation engine: adjusted net cash movement for
    /// this record's date (identical across same-date rows)
    pub daily_movement: BigDecimal,
    /// Written by the reconciliation engine: running balance as of this
    /// record's date (a step function of date)
    pub cumulative_balance: BigDecimal,
}

impl PurchaseRecord {
    /// Build the opening-balance sentinel row pinned to the configured
    /// initial balance.
    pub fn sentinel(initial_balance: BigDecimal) -> Self {
        Self {
            sequence: SENTINEL_SEQUENCE.to_string(),
            date: sentinel_date(),
            supplier: SENTINEL_SUPPLIER.to_string(),
            product: String::new(),
            unit_count: 0,
            outbound_kg: BigDecimal::from(0),
            returned_kg: BigDecimal::from(0),
            document_type: String::new(),
            crate_count: 0,
            unit_price: BigDecimal::from(0),
            average_lb: BigDecimal::from(0),
            net_kg: BigDecimal::from(0),
            net_lb: BigDecimal::from(0),
            total: BigDecimal::from(0),
            deposit_amount: BigDecimal::from(0),
            daily_movement: BigDecimal::from(0),
            cumulative_balance: initial_balance,
        }
    }

    /// Whether this row is the opening-balance sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.supplier == SENTINEL_SUPPLIER
    }
}

/// One bank deposit or transfer toward a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositRecord {
    pub sequence: String,
    pub date: NaiveDate,
    /// Supplier the money is destined for; joined to purchases by
    /// (date, counterparty) at reconciliation time
    pub counterparty: String,
    pub agency: String,
    pub amount: BigDecimal,
    pub kind: DepositKind,
}

/// One discount adjustment tied to a date.
///
/// `computed_net_lb` and `possible_discount` are snapshots taken when the
/// note is created or edited. They are not re-derived when purchase data for
/// that date later changes, so they can go stale; only `actual_discount`
/// feeds the cash balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebitNoteRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    /// Snapshot: sum of non-sentinel purchase net lb on this date at
    /// creation/edit time
    pub computed_net_lb: BigDecimal,
    /// Discount rate as a fraction (0.05 = 5%)
    pub rate: BigDecimal,
    /// Snapshot: computed_net_lb times rate
    pub possible_discount: BigDecimal,
    /// The amount that actually adjusts the daily movement
    pub actual_discount: BigDecimal,
}

/// One customer sale. Self-contained: no references into the purchase or
/// deposit collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    pub customer: String,
    pub bird_type: String,
    pub unit_count: i64,
    pub gross_lb: BigDecimal,
    pub discount_lb: BigDecimal,
    /// Derived: gross minus discount, rounded to 2 decimals
    pub net_lb: BigDecimal,
    pub unit_price: BigDecimal,
    /// Derived: net lb times price, rounded to 2 decimals
    pub amount_due: BigDecimal,
    pub amount_paid: BigDecimal,
    /// Derived: amount due minus amount paid, rounded to 2 decimals
    pub balance_due: BigDecimal,
}

/// One business expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    /// Optional working figure entered alongside the expense
    pub reference_amount: BigDecimal,
    pub description: String,
    pub category: String,
    pub amount: BigDecimal,
}

/// Raw fields for creating or editing a purchase. Derived columns are
/// computed by the purchase normalizer, never accepted from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseInput {
    pub date: NaiveDate,
    pub supplier: String,
    pub unit_count: i64,
    pub outbound_kg: BigDecimal,
    pub returned_kg: BigDecimal,
    pub document_type: String,
    pub crate_count: i64,
    pub unit_price: BigDecimal,
}

/// Raw fields for creating or editing a deposit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositInput {
    pub date: NaiveDate,
    pub counterparty: String,
    pub agency: String,
    pub amount: BigDecimal,
}

/// Raw fields for creating or editing a debit note. The weight snapshot is
/// computed against the purchase collection at apply time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebitNoteInput {
    pub date: NaiveDate,
    pub rate: BigDecimal,
    pub actual_discount: BigDecimal,
}

/// Raw fields for creating or editing a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleInput {
    pub date: NaiveDate,
    pub customer: String,
    pub bird_type: String,
    pub unit_count: i64,
    pub gross_lb: BigDecimal,
    pub discount_lb: BigDecimal,
    pub unit_price: BigDecimal,
    pub amount_paid: BigDecimal,
}

/// Raw fields for creating or editing an expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseInput {
    pub date: NaiveDate,
    pub reference_amount: BigDecimal,
    pub description: String,
    pub category: String,
    pub amount: BigDecimal,
}

/// Errors that can occur in the ledger system
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("sheet '{sheet}' is missing required columns: {missing}")]
    Schema { sheet: String, missing: String },
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("the opening-balance row cannot be edited or deleted")]
    SentinelProtected,
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_kind_follows_agency_marker() {
        assert_eq!(
            DepositKind::from_agency("Pichincha ATM", "ATM"),
            DepositKind::CashDeposit
        );
        assert_eq!(
            DepositKind::from_agency("Banco Pichincha", "ATM"),
            DepositKind::Transfer
        );
    }

    #[test]
    fn sentinel_row_is_recognized_and_pinned() {
        let row = PurchaseRecord::sentinel(BigDecimal::from(100));
        assert!(row.is_sentinel());
        assert_eq!(row.sequence, SENTINEL_SEQUENCE);
        assert_eq!(row.date, sentinel_date());
        assert_eq!(row.cumulative_balance, BigDecimal::from(100));
        assert_eq!(row.total, BigDecimal::from(0));
    }

    #[test]
    fn purchase_record_serializes_with_canonical_column_names() {
        let row = PurchaseRecord::sentinel(BigDecimal::from(0));
        let json = serde_json::to_value(&row).unwrap();
        for column in [
            "sequence",
            "date",
            "supplier",
            "unit_count",
            "outbound_kg",
            "returned_kg",
            "net_kg",
            "net_lb",
            "total",
            "deposit_amount",
            "daily_movement",
            "cumulative_balance",
        ] {
            assert!(json.get(column).is_some(), "missing column {column}");
        }
    }
}
