//! Purchase normalization and sequence assignment

use bigdecimal::BigDecimal;

use crate::config::LedgerConfig;
use crate::traits::{DefaultPurchaseValidator, PurchaseValidator};
use crate::types::*;
use crate::utils::coerce;

/// Next sequence number for a new purchase: numeric maximum over the
/// non-sentinel rows plus one, zero-padded to two digits. Sequences are
/// never reused after a deletion, so gaps are expected.
pub fn next_sequence(records: &[PurchaseRecord]) -> String {
    let max = records
        .iter()
        .filter(|r| !r.is_sentinel())
        .map(|r| coerce::sequence_value(&r.sequence))
        .max();
    match max {
        Some(value) => format!("{:02}", value + 1),
        None => "01".to_string(),
    }
}

/// Derive the weight and money columns from raw purchase fields and produce
/// a full record. Balance columns start at zero; the reconciliation engine
/// owns them.
pub fn build_record(
    sequence: String,
    input: &PurchaseInput,
    config: &LedgerConfig,
) -> PurchaseRecord {
    let net_kg = &input.outbound_kg - &input.returned_kg;
    let net_lb = &net_kg * &config.lbs_per_kg;
    let average_lb = if input.unit_count == 0 {
        BigDecimal::from(0)
    } else {
        &net_lb / BigDecimal::from(input.unit_count)
    };
    let total = &net_lb * &input.unit_price;

    PurchaseRecord {
        sequence,
        date: input.date,
        supplier: input.supplier.clone(),
        product: config.product_name.clone(),
        unit_count: input.unit_count,
        outbound_kg: input.outbound_kg.clone(),
        returned_kg: input.returned_kg.clone(),
        document_type: input.document_type.clone(),
        crate_count: input.crate_count,
        unit_price: input.unit_price.clone(),
        average_lb,
        net_kg,
        net_lb,
        total,
        deposit_amount: BigDecimal::from(0),
        daily_movement: BigDecimal::from(0),
        cumulative_balance: BigDecimal::from(0),
    }
}

/// Validate and normalize one raw purchase in a single step.
///
/// This is the standalone entry point for callers outside the ledger
/// orchestrator (the import boundary reuses the derivation half with its own
/// lenient parsing).
pub fn normalize_purchase(
    sequence: String,
    input: &PurchaseInput,
    config: &LedgerConfig,
) -> LedgerResult<PurchaseRecord> {
    DefaultPurchaseValidator.validate_purchase(input)?;
    Ok(build_record(sequence, input, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn input() -> PurchaseInput {
        PurchaseInput {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            supplier: "LIRIS SA".to_string(),
            unit_count: 10,
            outbound_kg: BigDecimal::from(100),
            returned_kg: BigDecimal::from(20),
            document_type: "Invoice".to_string(),
            crate_count: 4,
            unit_price: BigDecimal::from(1),
        }
    }

    #[test]
    fn derives_weights_and_total() {
        let config = LedgerConfig::default();
        let record = normalize_purchase("01".to_string(), &input(), &config).unwrap();
        assert_eq!(record.net_kg, BigDecimal::from(80));
        assert_eq!(record.net_lb, "176.3696".parse::<BigDecimal>().unwrap());
        assert_eq!(record.total, "176.3696".parse::<BigDecimal>().unwrap());
        assert_eq!(record.average_lb, "17.63696".parse::<BigDecimal>().unwrap());
        assert_eq!(record.product, config.product_name);
    }

    #[test]
    fn zero_unit_count_yields_zero_average() {
        let config = LedgerConfig::default();
        let mut raw = input();
        raw.unit_count = 0;
        let record = normalize_purchase("01".to_string(), &raw, &config).unwrap();
        assert_eq!(record.average_lb, BigDecimal::from(0));
    }

    #[test]
    fn rejects_invalid_input() {
        let config = LedgerConfig::default();
        let mut raw = input();
        raw.returned_kg = BigDecimal::from(500);
        assert!(normalize_purchase("01".to_string(), &raw, &config).is_err());
    }

    #[test]
    fn sequences_are_monotonic_and_skip_the_sentinel() {
        let config = LedgerConfig::default();
        let mut records = vec![PurchaseRecord::sentinel(config.initial_balance.clone())];
        assert_eq!(next_sequence(&records), "01");

        records.push(build_record("07".to_string(), &input(), &config));
        assert_eq!(next_sequence(&records), "08");
    }

    #[test]
    fn hundredth_sequence_grows_to_three_digits() {
        let config = LedgerConfig::default();
        let records = vec![build_record("99".to_string(), &input(), &config)];
        assert_eq!(next_sequence(&records), "100");
    }

    #[test]
    fn unparseable_sequences_count_as_zero() {
        let config = LedgerConfig::default();
        let records = vec![build_record("junk".to_string(), &input(), &config)];
        assert_eq!(next_sequence(&records), "01");
    }
}
