//! Debit-note construction with its point-in-time weight snapshot

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::types::*;
use crate::utils::validation;

/// Sum of stored net lb across non-sentinel purchases on the given date.
///
/// This feeds the note's snapshot columns. It reads the purchase collection
/// as it stands when the note is created or edited and is deliberately not
/// kept live afterward.
pub fn net_lb_on_date(purchases: &[PurchaseRecord], date: NaiveDate) -> BigDecimal {
    purchases
        .iter()
        .filter(|r| !r.is_sentinel() && r.date == date)
        .map(|r| &r.net_lb)
        .sum()
}

/// Validate raw debit-note fields: the rate must be a fraction, and at least
/// one of rate / actual discount must be positive.
pub fn validate_note(input: &DebitNoteInput) -> LedgerResult<()> {
    validation::validate_rate_fraction("discount rate", &input.rate)?;
    validation::validate_non_negative("actual discount", &input.actual_discount)?;
    if validation::is_zero(&input.rate) && validation::is_zero(&input.actual_discount) {
        return Err(LedgerError::Validation(
            "either the discount rate or the actual discount must be greater than zero"
                .to_string(),
        ));
    }
    Ok(())
}

/// Build a debit note, snapshotting the day's net weight and the possible
/// discount against the current purchase collection.
pub fn build_record(
    id: Uuid,
    input: &DebitNoteInput,
    purchases: &[PurchaseRecord],
) -> DebitNoteRecord {
    let computed_net_lb = net_lb_on_date(purchases, input.date);
    let possible_discount = &computed_net_lb * &input.rate;
    DebitNoteRecord {
        id,
        date: input.date,
        computed_net_lb,
        rate: input.rate.clone(),
        possible_discount,
        actual_discount: input.actual_discount.clone(),
    }
}
