//! Validation utilities shared by the entry-point validators

use bigdecimal::BigDecimal;

use crate::types::{LedgerError, LedgerResult};

/// Validate that a monetary or weight field is not negative
pub fn validate_non_negative(field: &str, value: &BigDecimal) -> LedgerResult<()> {
    if *value < BigDecimal::from(0) {
        Err(LedgerError::Validation(format!(
            "negative value: {field} cannot be negative"
        )))
    } else {
        Ok(())
    }
}

/// Validate that a count field is not negative
pub fn validate_non_negative_count(field: &str, value: i64) -> LedgerResult<()> {
    if value < 0 {
        Err(LedgerError::Validation(format!(
            "negative value: {field} cannot be negative"
        )))
    } else {
        Ok(())
    }
}

/// Validate that a count field is strictly positive
pub fn validate_positive_count(field: &str, value: i64) -> LedgerResult<()> {
    if value <= 0 {
        Err(LedgerError::Validation(format!(
            "{field} must be greater than zero"
        )))
    } else {
        Ok(())
    }
}

/// Validate that an amount is strictly positive
pub fn validate_positive_amount(field: &str, value: &BigDecimal) -> LedgerResult<()> {
    if *value <= BigDecimal::from(0) {
        Err(LedgerError::Validation(format!(
            "{field} must be greater than zero"
        )))
    } else {
        Ok(())
    }
}

/// Validate that a required text field is not blank
pub fn validate_required_text(field: &str, value: &str) -> LedgerResult<()> {
    if value.trim().is_empty() {
        Err(LedgerError::Validation(format!("{field} cannot be empty")))
    } else {
        Ok(())
    }
}

/// Validate that a discount rate is a fraction in [0, 1]
pub fn validate_rate_fraction(field: &str, value: &BigDecimal) -> LedgerResult<()> {
    if *value < BigDecimal::from(0) || *value > BigDecimal::from(1) {
        Err(LedgerError::Validation(format!(
            "{field} must be a fraction between 0 and 1"
        )))
    } else {
        Ok(())
    }
}

pub fn is_zero(value: &BigDecimal) -> bool {
    *value == BigDecimal::from(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_negative_allows_zero() {
        assert!(validate_non_negative("weight", &BigDecimal::from(0)).is_ok());
        assert!(validate_non_negative("weight", &BigDecimal::from(-1)).is_err());
    }

    #[test]
    fn positive_amount_rejects_zero() {
        assert!(validate_positive_amount("amount", &BigDecimal::from(0)).is_err());
        assert!(validate_positive_amount("amount", &BigDecimal::from(1)).is_ok());
    }

    #[test]
    fn rate_fraction_bounds() {
        assert!(validate_rate_fraction("rate", &"0.05".parse().unwrap()).is_ok());
        assert!(validate_rate_fraction("rate", &BigDecimal::from(1)).is_ok());
        assert!(validate_rate_fraction("rate", &BigDecimal::from(2)).is_err());
    }

    #[test]
    fn required_text_rejects_whitespace() {
        assert!(validate_required_text("supplier", "  ").is_err());
        assert!(validate_required_text("supplier", "Medina").is_ok());
    }
}
