//! Deposit record construction and sequence assignment

use crate::config::LedgerConfig;
use crate::types::*;
use crate::utils::coerce;

/// Next sequence number for a new deposit. The deposit counter is
/// independent of the purchase counter.
pub fn next_sequence(records: &[DepositRecord]) -> String {
    let max = records
        .iter()
        .map(|r| coerce::sequence_value(&r.sequence))
        .max();
    match max {
        Some(value) => format!("{:02}", value + 1),
        None => "01".to_string(),
    }
}

/// Build a deposit record, deriving the document kind from the agency name.
pub fn build_record(
    sequence: String,
    input: &DepositInput,
    config: &LedgerConfig,
) -> DepositRecord {
    DepositRecord {
        sequence,
        date: input.date,
        counterparty: input.counterparty.clone(),
        agency: input.agency.clone(),
        amount: input.amount.clone(),
        kind: DepositKind::from_agency(&input.agency, &config.cash_machine_marker),
    }
}
