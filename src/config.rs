//! Ledger configuration constants, externally overridable via TOML

use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::{LedgerError, LedgerResult};

/// Fixed constants of the ledger, resolved once at startup.
///
/// Every figure the reconciliation engine and the alert analyzer depend on
/// lives here, so deployments can override them from a TOML file without
/// touching code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Opening balance carried by the sentinel row
    #[serde(default = "default_initial_balance")]
    pub initial_balance: BigDecimal,
    /// Conversion factor from kg to lb
    #[serde(default = "default_lbs_per_kg")]
    pub lbs_per_kg: BigDecimal,
    /// Customer alert fires when the summed balance due exceeds this
    #[serde(default = "default_alert_balance_threshold")]
    pub alert_balance_threshold: BigDecimal,
    /// Customer alert fires on a run of at least this many consecutive days
    /// with a positive balance due
    #[serde(default = "default_alert_min_consecutive_days")]
    pub alert_min_consecutive_days: usize,
    /// Product name stamped on every purchase row
    #[serde(default = "default_product_name")]
    pub product_name: String,
    /// Agency-name marker that classifies a deposit as a cash deposit
    #[serde(default = "default_cash_machine_marker")]
    pub cash_machine_marker: String,
}

fn default_initial_balance() -> BigDecimal {
    // 176.01
    BigDecimal::new(BigInt::from(17601), 2)
}

fn default_lbs_per_kg() -> BigDecimal {
    // 2.20462
    BigDecimal::new(BigInt::from(220462), 5)
}

fn default_alert_balance_threshold() -> BigDecimal {
    BigDecimal::from(10)
}

fn default_alert_min_consecutive_days() -> usize {
    2
}

fn default_product_name() -> String {
    "Chicken".to_string()
}

fn default_cash_machine_marker() -> String {
    "ATM".to_string()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_balance: default_initial_balance(),
            lbs_per_kg: default_lbs_per_kg(),
            alert_balance_threshold: default_alert_balance_threshold(),
            alert_min_consecutive_days: default_alert_min_consecutive_days(),
            product_name: default_product_name(),
            cash_machine_marker: default_cash_machine_marker(),
        }
    }
}

impl LedgerConfig {
    /// Parse a configuration from TOML text. Absent keys fall back to the
    /// built-in defaults.
    pub fn from_toml_str(text: &str) -> LedgerResult<Self> {
        toml::from_str(text).map_err(|e| LedgerError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let config = LedgerConfig::default();
        assert_eq!(config.initial_balance, "176.01".parse::<BigDecimal>().unwrap());
        assert_eq!(config.lbs_per_kg, "2.20462".parse::<BigDecimal>().unwrap());
        assert_eq!(config.alert_balance_threshold, BigDecimal::from(10));
        assert_eq!(config.alert_min_consecutive_days, 2);
    }

    #[test]
    fn toml_overrides_selected_keys() {
        let config = LedgerConfig::from_toml_str(
            r#"
            initial_balance = "250.00"
            product_name = "Hen"
            "#,
        )
        .unwrap();
        assert_eq!(config.initial_balance, BigDecimal::from(250));
        assert_eq!(config.product_name, "Hen");
        // untouched keys keep their defaults
        assert_eq!(config.lbs_per_kg, "2.20462".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = LedgerConfig::from_toml_str("initial_balance = [1,").unwrap_err();
        assert!(matches!(err, LedgerError::Config(_)));
    }
}
