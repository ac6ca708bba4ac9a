//! Customer sales and business expenses
//!
//! The sales side of the books is independent of the supplier balance: no
//! reconciliation pass runs over it. Each record carries its own derived
//! columns, rounded to cents at derivation time.

pub mod alerts;

use bigdecimal::{BigDecimal, RoundingMode};
use uuid::Uuid;

use crate::types::*;
use crate::utils::validation;

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(2, RoundingMode::HalfUp)
}

/// Net saleable weight: gross minus per-sale weight discount.
pub fn net_weight(gross_lb: &BigDecimal, discount_lb: &BigDecimal) -> BigDecimal {
    round2(&(gross_lb - discount_lb))
}

/// Validate raw sale fields before derivation.
pub fn validate_sale(input: &SaleInput) -> LedgerResult<()> {
    validation::validate_required_text("customer", &input.customer)?;
    validation::validate_positive_count("unit count", input.unit_count)?;
    validation::validate_positive_amount("gross weight", &input.gross_lb)?;
    validation::validate_positive_amount("unit price", &input.unit_price)?;
    validation::validate_non_negative("weight discount", &input.discount_lb)?;
    validation::validate_non_negative("amount paid", &input.amount_paid)?;
    if input.discount_lb > input.gross_lb {
        return Err(LedgerError::Validation(
            "weight discount cannot exceed the gross weight".to_string(),
        ));
    }
    Ok(())
}

/// Validate raw expense fields.
pub fn validate_expense(input: &ExpenseInput) -> LedgerResult<()> {
    validation::validate_required_text("category", &input.category)?;
    validation::validate_positive_amount("amount", &input.amount)?;
    validation::validate_non_negative("reference amount", &input.reference_amount)?;
    Ok(())
}

/// Derive the money columns and produce a full sale record.
pub fn build_sale(id: Uuid, input: &SaleInput) -> SaleRecord {
    let net_lb = net_weight(&input.gross_lb, &input.discount_lb);
    let amount_due = round2(&(&net_lb * &input.unit_price));
    let balance_due = round2(&(&amount_due - &input.amount_paid));
    SaleRecord {
        id,
        date: input.date,
        customer: input.customer.clone(),
        bird_type: input.bird_type.clone(),
        unit_count: input.unit_count,
        gross_lb: input.gross_lb.clone(),
        discount_lb: input.discount_lb.clone(),
        net_lb,
        unit_price: input.unit_price.clone(),
        amount_due,
        amount_paid: input.amount_paid.clone(),
        balance_due,
    }
}

/// Produce a full expense record from raw fields.
pub fn build_expense(id: Uuid, input: &ExpenseInput) -> ExpenseRecord {
    ExpenseRecord {
        id,
        date: input.date,
        reference_amount: round2(&input.reference_amount),
        description: input.description.clone(),
        category: input.category.clone(),
        amount: round2(&input.amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn input() -> SaleInput {
        SaleInput {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            customer: "Maria".to_string(),
            bird_type: "Broiler".to_string(),
            unit_count: 4,
            gross_lb: "21.5".parse().unwrap(),
            discount_lb: "1.5".parse().unwrap(),
            unit_price: "1.25".parse().unwrap(),
            amount_paid: BigDecimal::from(20),
        }
    }

    #[test]
    fn derives_net_weight_due_and_balance() {
        let sale = build_sale(Uuid::new_v4(), &input());
        assert_eq!(sale.net_lb, BigDecimal::from(20));
        assert_eq!(sale.amount_due, "25.00".parse::<BigDecimal>().unwrap());
        assert_eq!(sale.balance_due, "5.00".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn overpayment_leaves_a_negative_balance() {
        let mut raw = input();
        raw.amount_paid = BigDecimal::from(30);
        let sale = build_sale(Uuid::new_v4(), &raw);
        assert_eq!(sale.balance_due, "-5.00".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn rounding_is_half_up_at_two_decimals() {
        assert_eq!(round2(&"1.005".parse::<BigDecimal>().unwrap()), "1.01".parse::<BigDecimal>().unwrap());
        assert_eq!(round2(&"1.004".parse::<BigDecimal>().unwrap()), "1.00".parse::<BigDecimal>().unwrap());
        assert_eq!(round2(&"-0.3596".parse::<BigDecimal>().unwrap()), "-0.36".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn rejects_discount_exceeding_gross() {
        let mut raw = input();
        raw.discount_lb = BigDecimal::from(50);
        assert!(validate_sale(&raw).is_err());
    }

    #[test]
    fn rejects_nonpositive_core_fields() {
        let mut raw = input();
        raw.unit_count = 0;
        assert!(validate_sale(&raw).is_err());

        let mut raw = input();
        raw.unit_price = BigDecimal::from(0);
        assert!(validate_sale(&raw).is_err());

        let mut raw = input();
        raw.customer = "  ".to_string();
        assert!(validate_sale(&raw).is_err());
    }

    #[test]
    fn expense_requires_category_and_positive_amount() {
        let raw = ExpenseInput {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            reference_amount: BigDecimal::from(0),
            description: "Fuel".to_string(),
            category: String::new(),
            amount: BigDecimal::from(12),
        };
        assert!(validate_expense(&raw).is_err());

        let raw = ExpenseInput {
            category: "Transport".to_string(),
            amount: BigDecimal::from(0),
            ..raw
        };
        assert!(validate_expense(&raw).is_err());
    }
}
