//! Balance reconciliation engine
//!
//! Combines the purchase, deposit, and debit-note collections into per-day
//! net cash movements and a cumulative balance anchored at the configured
//! opening balance. The pass is a pure function of its three inputs: it is
//! re-run in full after every mutation and running it twice on the same
//! inputs yields identical output.

use std::collections::{BTreeMap, HashMap};

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::config::LedgerConfig;
use crate::types::{DebitNoteRecord, DepositRecord, PurchaseRecord};
use crate::utils::coerce;

/// Sum deposit amounts per (date, counterparty) pair. Cash deposits and
/// transfers are pooled; an empty collection yields an empty map.
pub fn aggregate_deposits(
    deposits: &[DepositRecord],
) -> HashMap<(NaiveDate, String), BigDecimal> {
    let mut totals: HashMap<(NaiveDate, String), BigDecimal> = HashMap::new();
    for deposit in deposits {
        let key = (deposit.date, deposit.counterparty.clone());
        let entry = totals.entry(key).or_insert_with(|| BigDecimal::from(0));
        *entry += &deposit.amount;
    }
    totals
}

/// Sum the actual discount of all debit notes per date. Only the actual
/// discount moves cash; the possible-discount snapshot is informational.
pub fn aggregate_debit_notes(notes: &[DebitNoteRecord]) -> HashMap<NaiveDate, BigDecimal> {
    let mut totals: HashMap<NaiveDate, BigDecimal> = HashMap::new();
    for note in notes {
        let entry = totals
            .entry(note.date)
            .or_insert_with(|| BigDecimal::from(0));
        *entry += &note.actual_discount;
    }
    totals
}

/// The reconciliation pass over the full record store.
pub struct ReconciliationEngine {
    config: LedgerConfig,
}

impl ReconciliationEngine {
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    /// Recompute every derived column and return the replacement purchase
    /// collection: re-derived weight/money fields, per-row deposit
    /// allocation, per-date adjusted movement, the chronological cumulative
    /// fold, and exactly one sentinel row pinned to the opening balance,
    /// sorted by (date, numeric sequence).
    ///
    /// The deposit allocation assigns the full daily (date, supplier) total
    /// to every purchase row sharing that key rather than splitting it, and
    /// the per-date movement is the sum of per-row movements. With several
    /// same-day purchases from one supplier the deposit therefore counts
    /// once per row. This mirrors the books this system replaces; do not
    /// "fix" it here.
    pub fn reconcile(
        &self,
        purchases: &[PurchaseRecord],
        deposits: &[DepositRecord],
        notes: &[DebitNoteRecord],
    ) -> Vec<PurchaseRecord> {
        let deposit_totals = aggregate_deposits(deposits);
        let note_adjustments = aggregate_debit_notes(notes);

        // Stored derived fields are an untrusted cache; re-derive everything.
        let mut operational: Vec<PurchaseRecord> = purchases
            .iter()
            .filter(|r| !r.is_sentinel())
            .cloned()
            .collect();

        for record in &mut operational {
            record.net_kg = &record.outbound_kg - &record.returned_kg;
            record.net_lb = &record.net_kg * &self.config.lbs_per_kg;
            record.average_lb = if record.unit_count == 0 {
                BigDecimal::from(0)
            } else {
                &record.net_lb / BigDecimal::from(record.unit_count)
            };
            record.total = &record.net_lb * &record.unit_price;

            let key = (record.date, record.supplier.clone());
            record.deposit_amount = deposit_totals
                .get(&key)
                .cloned()
                .unwrap_or_else(|| BigDecimal::from(0));
        }

        // Per-date movement sums; a BTreeMap keeps the fold chronological.
        let mut daily: BTreeMap<NaiveDate, BigDecimal> = BTreeMap::new();
        for record in &operational {
            let entry = daily
                .entry(record.date)
                .or_insert_with(|| BigDecimal::from(0));
            *entry += &record.deposit_amount - &record.total;
        }

        // Debit notes adjust only dates that carry purchases; a note on an
        // empty date has no cash effect until a purchase lands there.
        for (date, movement) in daily.iter_mut() {
            if let Some(adjustment) = note_adjustments.get(date) {
                *movement += adjustment;
            }
        }

        let mut cumulative: BTreeMap<NaiveDate, BigDecimal> = BTreeMap::new();
        let mut running = self.config.initial_balance.clone();
        for (date, movement) in &daily {
            running += movement;
            cumulative.insert(*date, running.clone());
        }

        // Scatter the per-date pair back onto every row of that date.
        for record in &mut operational {
            record.daily_movement = daily
                .get(&record.date)
                .cloned()
                .unwrap_or_else(|| BigDecimal::from(0));
            record.cumulative_balance = cumulative
                .get(&record.date)
                .cloned()
                .unwrap_or_else(|| self.config.initial_balance.clone());
        }

        let mut result = Vec::with_capacity(operational.len() + 1);
        result.push(PurchaseRecord::sentinel(self.config.initial_balance.clone()));
        result.extend(operational);
        result.sort_by(|a, b| {
            a.date.cmp(&b.date).then_with(|| {
                coerce::sequence_value(&a.sequence).cmp(&coerce::sequence_value(&b.sequence))
            })
        });
        result
    }
}
