use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::OverdueConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{Result, ServicingError};
use crate::schedule::InstallmentPosition;
use crate::types::InstallmentId;

/// overdue interest owed on one installment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdueInterest {
    pub installment_id: InstallmentId,
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub days_overdue: u32,
    pub pending_balance: Money,
    pub overdue_rate: Rate,
    pub overdue_interest: Money,
    pub total_with_overdue: Money,
}

/// simple daily interest on the pending balance of late installments
#[derive(Debug, Clone)]
pub struct OverdueInterestCalculator {
    pub config: OverdueConfig,
}

impl OverdueInterestCalculator {
    pub fn new(config: OverdueConfig) -> Self {
        Self { config }
    }

    /// interest for a position at `rate`, or the configured default rate.
    ///
    /// computed unrounded and rounded half-up to cents once at the end
    pub fn calculate(&self, position: &InstallmentPosition, rate: Option<Rate>) -> Result<OverdueInterest> {
        let rate = rate.unwrap_or(self.config.default_annual_rate);
        if rate < Rate::ZERO {
            return Err(ServicingError::validation(format!("overdue rate cannot be negative: {}", rate)));
        }

        let installment = &position.installment;
        let mut result = OverdueInterest {
            installment_id: installment.installment_id,
            installment_number: installment.installment_number,
            due_date: installment.due_date,
            days_overdue: 0,
            pending_balance: position.pending_balance,
            overdue_rate: rate,
            overdue_interest: Money::ZERO,
            total_with_overdue: position.pending_balance,
        };

        if !position.is_overdue {
            return Ok(result);
        }

        let interest = position
            .pending_balance
            .simple_interest(rate, position.days_overdue, self.config.day_basis);

        result.days_overdue = position.days_overdue;
        result.overdue_interest = Money::from_decimal(interest);
        result.total_with_overdue = Money::from_decimal(position.pending_balance.as_decimal() + interest);
        Ok(result)
    }
}

impl Default for OverdueInterestCalculator {
    fn default() -> Self {
        Self::new(OverdueConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Installment;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn position(amount: i64, paid: i64, due: NaiveDate, today: NaiveDate) -> InstallmentPosition {
        let installment = Installment {
            installment_id: Uuid::new_v4(),
            credit_id: Uuid::new_v4(),
            installment_number: 3,
            due_date: due,
            installment_amount: Money::from_major(amount),
        };
        InstallmentPosition::evaluate(&installment, Money::from_major(paid), today)
    }

    #[test]
    fn test_ten_days_at_default_rate() {
        let due = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let calculator = OverdueInterestCalculator::default();

        let result = calculator.calculate(&position(100_000, 0, due, today), None).unwrap();

        assert_eq!(result.days_overdue, 10);
        assert_eq!(result.overdue_rate, Rate::from_decimal(dec!(0.02)));
        assert_eq!(result.overdue_interest, Money::from_str_exact("54.79").unwrap());
        assert_eq!(result.total_with_overdue, Money::from_str_exact("100054.79").unwrap());
    }

    #[test]
    fn test_interest_on_pending_balance_only() {
        let due = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let calculator = OverdueInterestCalculator::default();

        // 60000 * 0.10 / 365 * 30 = 493.150...
        let result = calculator
            .calculate(&position(100_000, 40_000, due, today), Some(Rate::from_percentage(10)))
            .unwrap();
        assert_eq!(result.pending_balance, Money::from_major(60_000));
        assert_eq!(result.overdue_interest, Money::from_str_exact("493.15").unwrap());
        assert_eq!(result.total_with_overdue, Money::from_str_exact("60493.15").unwrap());
    }

    #[test]
    fn test_not_overdue_yields_zero() {
        let due = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let calculator = OverdueInterestCalculator::default();

        let upcoming = position(100_000, 0, due, NaiveDate::from_ymd_opt(2024, 2, 20).unwrap());
        let result = calculator.calculate(&upcoming, None).unwrap();
        assert_eq!(result.days_overdue, 0);
        assert_eq!(result.overdue_interest, Money::ZERO);
        assert_eq!(result.total_with_overdue, Money::from_major(100_000));

        // paid late installments accrue nothing
        let settled = position(100_000, 100_000, due, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        let result = calculator.calculate(&settled, None).unwrap();
        assert_eq!(result.overdue_interest, Money::ZERO);
        assert_eq!(result.total_with_overdue, Money::ZERO);
    }

    #[test]
    fn test_negative_rate_rejected() {
        let due = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let calculator = OverdueInterestCalculator::default();

        let err = calculator
            .calculate(&position(1_000, 0, due, today), Some(Rate::from_decimal(dec!(-0.01))))
            .unwrap_err();
        assert!(matches!(err, ServicingError::Validation { .. }));
    }
}
