//! Presentation formatting for record listings
//!
//! Records are stored at full precision; rounding to cents happens here, at
//! the display edge, never in the stored data.

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::NaiveDate;

use crate::types::*;

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && i % 3 == offset % 3 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Currency with a dollar sign, thousands grouping, and two decimals,
/// rounded half up. Negative values read as `$-0.36`.
pub fn format_currency(value: &BigDecimal) -> String {
    let rounded = value.with_scale_round(2, RoundingMode::HalfUp);
    let text = rounded.to_string();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));
    format!("${sign}{}.{frac_part}", group_thousands(int_part))
}

/// Weights and other quantities: two decimals, no grouping.
pub fn format_quantity(value: &BigDecimal) -> String {
    value.with_scale_round(2, RoundingMode::HalfUp).to_string()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// A purchase row rendered for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRow {
    pub sequence: String,
    pub date: String,
    pub supplier: String,
    pub product: String,
    pub unit_count: String,
    pub outbound_kg: String,
    pub returned_kg: String,
    pub document_type: String,
    pub crate_count: String,
    pub unit_price: String,
    pub average_lb: String,
    pub net_kg: String,
    pub net_lb: String,
    pub total: String,
    pub deposit_amount: String,
    pub daily_movement: String,
    pub cumulative_balance: String,
}

impl From<&PurchaseRecord> for PurchaseRow {
    fn from(record: &PurchaseRecord) -> Self {
        Self {
            sequence: record.sequence.clone(),
            date: format_date(record.date),
            supplier: record.supplier.clone(),
            product: record.product.clone(),
            unit_count: record.unit_count.to_string(),
            outbound_kg: format_quantity(&record.outbound_kg),
            returned_kg: format_quantity(&record.returned_kg),
            document_type: record.document_type.clone(),
            crate_count: record.crate_count.to_string(),
            unit_price: format_currency(&record.unit_price),
            average_lb: format_quantity(&record.average_lb),
            net_kg: format_quantity(&record.net_kg),
            net_lb: format_quantity(&record.net_lb),
            total: format_currency(&record.total),
            deposit_amount: format_currency(&record.deposit_amount),
            daily_movement: format_currency(&record.daily_movement),
            cumulative_balance: format_currency(&record.cumulative_balance),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositRow {
    pub sequence: String,
    pub date: String,
    pub counterparty: String,
    pub agency: String,
    pub amount: String,
    pub kind: String,
}

impl From<&DepositRecord> for DepositRow {
    fn from(record: &DepositRecord) -> Self {
        Self {
            sequence: record.sequence.clone(),
            date: format_date(record.date),
            counterparty: record.counterparty.clone(),
            agency: record.agency.clone(),
            amount: format_currency(&record.amount),
            kind: record.kind.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebitNoteRow {
    pub id: String,
    pub date: String,
    pub computed_net_lb: String,
    pub rate: String,
    pub possible_discount: String,
    pub actual_discount: String,
}

impl From<&DebitNoteRecord> for DebitNoteRow {
    fn from(record: &DebitNoteRecord) -> Self {
        Self {
            id: record.id.to_string(),
            date: format_date(record.date),
            computed_net_lb: format_quantity(&record.computed_net_lb),
            rate: record.rate.to_string(),
            possible_discount: format_currency(&record.possible_discount),
            actual_discount: format_currency(&record.actual_discount),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleRow {
    pub id: String,
    pub date: String,
    pub customer: String,
    pub bird_type: String,
    pub unit_count: String,
    pub gross_lb: String,
    pub discount_lb: String,
    pub net_lb: String,
    pub unit_price: String,
    pub amount_due: String,
    pub amount_paid: String,
    pub balance_due: String,
}

impl From<&SaleRecord> for SaleRow {
    fn from(record: &SaleRecord) -> Self {
        Self {
            id: record.id.to_string(),
            date: format_date(record.date),
            customer: record.customer.clone(),
            bird_type: record.bird_type.clone(),
            unit_count: record.unit_count.to_string(),
            gross_lb: format_quantity(&record.gross_lb),
            discount_lb: format_quantity(&record.discount_lb),
            net_lb: format_quantity(&record.net_lb),
            unit_price: format_currency(&record.unit_price),
            amount_due: format_currency(&record.amount_due),
            amount_paid: format_currency(&record.amount_paid),
            balance_due: format_currency(&record.balance_due),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRow {
    pub id: String,
    pub date: String,
    pub reference_amount: String,
    pub description: String,
    pub category: String,
    pub amount: String,
}

impl From<&ExpenseRecord> for ExpenseRow {
    fn from(record: &ExpenseRecord) -> Self {
        Self {
            id: record.id.to_string(),
            date: format_date(record.date),
            reference_amount: format_currency(&record.reference_amount),
            description: record.description.clone(),
            category: record.category.clone(),
            amount: format_currency(&record.amount),
        }
    }
}
