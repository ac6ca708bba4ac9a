//! Outstanding-balance alerts over the sales collection
//!
//! A customer is flagged when their summed balance due crosses the
//! configured threshold, or when they carry a positive balance on a run of
//! consecutive calendar days. Both at once raises the priority.

use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use chrono::{Duration, NaiveDate};

use crate::config::LedgerConfig;
use crate::types::SaleRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertPriority {
    High,
    Medium,
}

impl AlertPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertPriority::High => "High",
            AlertPriority::Medium => "Medium",
        }
    }
}

/// One flagged customer with the reasons that triggered the flag.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerAlert {
    pub customer: String,
    /// Sum of balance due across all of the customer's sales
    pub total_balance: BigDecimal,
    pub last_sale_date: NaiveDate,
    pub reasons: Vec<String>,
    pub priority: AlertPriority,
}

/// Length of the longest run of consecutive calendar days in a sorted,
/// deduplicated date list.
fn longest_consecutive_run(dates: &[NaiveDate]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous: Option<NaiveDate> = None;
    for date in dates {
        current = match previous {
            Some(prev) if *date == prev + Duration::days(1) => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        previous = Some(*date);
    }
    longest
}

/// Scan the sales collection and return the flagged customers, ordered by
/// customer name.
pub fn analyze(sales: &[SaleRecord], config: &LedgerConfig) -> Vec<CustomerAlert> {
    // BTreeMap keeps the output order stable across runs
    let mut by_customer: BTreeMap<&str, Vec<&SaleRecord>> = BTreeMap::new();
    for sale in sales {
        by_customer.entry(sale.customer.as_str()).or_default().push(sale);
    }

    let zero = BigDecimal::from(0);
    let mut alerts = Vec::new();
    for (customer, records) in by_customer {
        let total_balance: BigDecimal = records.iter().map(|s| &s.balance_due).sum();
        let last_sale_date = match records.iter().map(|s| s.date).max() {
            Some(date) => date,
            None => continue,
        };

        let mut positive_dates: Vec<NaiveDate> = records
            .iter()
            .filter(|s| s.balance_due > zero)
            .map(|s| s.date)
            .collect();
        positive_dates.sort();
        positive_dates.dedup();
        let run = longest_consecutive_run(&positive_dates);

        let mut reasons = Vec::new();
        if total_balance > config.alert_balance_threshold {
            reasons.push(format!(
                "outstanding balance of {} exceeds the {} threshold",
                total_balance, config.alert_balance_threshold
            ));
        }
        if run >= config.alert_min_consecutive_days {
            reasons.push(format!(
                "positive balance on {run} consecutive days"
            ));
        }
        if reasons.is_empty() {
            continue;
        }

        let priority = if reasons.len() > 1 {
            AlertPriority::High
        } else {
            AlertPriority::Medium
        };
        alerts.push(CustomerAlert {
            customer: customer.to_string(),
            total_balance,
            last_sale_date,
            reasons,
            priority,
        });
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sales::build_sale;
    use crate::types::SaleInput;
    use uuid::Uuid;

    fn sale(day: u32, customer: &str, paid: i64) -> SaleRecord {
        build_sale(
            Uuid::new_v4(),
            &SaleInput {
                date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
                customer: customer.to_string(),
                bird_type: "Broiler".to_string(),
                unit_count: 2,
                gross_lb: BigDecimal::from(8),
                discount_lb: BigDecimal::from(0),
                unit_price: BigDecimal::from(1),
                amount_paid: BigDecimal::from(paid),
            },
        )
    }

    #[test]
    fn settled_customers_are_not_flagged() {
        let sales = vec![sale(1, "Maria", 8), sale(2, "Maria", 8)];
        assert!(analyze(&sales, &LedgerConfig::default()).is_empty());
    }

    #[test]
    fn consecutive_small_balances_escalate_to_high() {
        // $4 owed on each of three consecutive days: $12 total crosses the
        // $10 threshold and the run condition fires too
        let sales = vec![sale(1, "Maria", 4), sale(2, "Maria", 4), sale(3, "Maria", 4)];
        let alerts = analyze(&sales, &LedgerConfig::default());
        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.priority, AlertPriority::High);
        assert_eq!(alert.total_balance, "12.00".parse::<BigDecimal>().unwrap());
        assert_eq!(alert.reasons.len(), 2);
        assert_eq!(alert.last_sale_date, NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
    }

    #[test]
    fn threshold_alone_is_medium() {
        let sales = vec![sale(1, "Pedro", 0), sale(10, "Pedro", 0)];
        let alerts = analyze(&sales, &LedgerConfig::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].priority, AlertPriority::Medium);
        assert_eq!(alerts[0].reasons.len(), 1);
    }

    #[test]
    fn run_alone_is_medium() {
        // $4 on two consecutive days: $8 total stays under the threshold
        let sales = vec![sale(1, "Ana", 4), sale(2, "Ana", 4)];
        let alerts = analyze(&sales, &LedgerConfig::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].priority, AlertPriority::Medium);
    }

    #[test]
    fn nonconsecutive_dates_do_not_form_a_run() {
        let sales = vec![sale(1, "Ana", 4), sale(5, "Ana", 4)];
        let alerts = analyze(&sales, &LedgerConfig::default());
        assert!(alerts.is_empty());
    }

    #[test]
    fn same_day_sales_count_once_toward_the_run() {
        let sales = vec![sale(1, "Ana", 4), sale(1, "Ana", 4)];
        assert!(analyze(&sales, &LedgerConfig::default()).is_empty());
    }

    #[test]
    fn alerts_come_out_in_customer_order() {
        let sales = vec![sale(1, "Zoe", 0), sale(1, "Ana", 0)];
        let alerts = analyze(&sales, &LedgerConfig::default());
        let names: Vec<&str> = alerts.iter().map(|a| a.customer.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Zoe"]);
    }

    #[test]
    fn longest_run_handles_breaks() {
        let dates: Vec<NaiveDate> = [1, 2, 4, 5, 6]
            .iter()
            .map(|d| NaiveDate::from_ymd_opt(2024, 3, *d).unwrap())
            .collect();
        assert_eq!(longest_consecutive_run(&dates), 3);
        assert_eq!(longest_consecutive_run(&[]), 0);
    }
}
