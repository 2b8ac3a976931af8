use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{round_half_up, Money, MONEY_DP};
use crate::schedule::InstallmentPosition;
use crate::types::InstallmentStatus;

/// roll-up of a set of installments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub installment_count: usize,
    pub pending_count: usize,
    pub partial_count: usize,
    pub paid_count: usize,
    pub overdue_count: usize,
    pub total_amount: Money,
    pub paid_amount: Money,
    pub pending_amount: Money,
    /// paid share of the total in percent, unrounded
    pub payment_percentage: Decimal,
    /// mean days overdue across overdue installments, to cents
    pub average_overdue_days: Decimal,
}

impl ScheduleSummary {
    /// an empty set yields the all-zero summary
    pub fn from_positions(positions: &[InstallmentPosition]) -> Self {
        let mut summary = ScheduleSummary {
            installment_count: positions.len(),
            ..Default::default()
        };
        let mut overdue_days: u64 = 0;

        for position in positions {
            match position.status {
                InstallmentStatus::Pending => summary.pending_count += 1,
                InstallmentStatus::Partial => summary.partial_count += 1,
                InstallmentStatus::Paid => summary.paid_count += 1,
                InstallmentStatus::Overdue => {
                    summary.overdue_count += 1;
                    overdue_days += u64::from(position.days_overdue);
                }
            }
            summary.total_amount += position.installment.installment_amount;
            summary.paid_amount += position.amount_paid;
        }

        summary.pending_amount = summary.total_amount - summary.paid_amount;
        summary.payment_percentage = summary.paid_amount.percentage_of(summary.total_amount);
        if summary.overdue_count > 0 {
            let mean = Decimal::from(overdue_days) / Decimal::from(summary.overdue_count as u64);
            summary.average_overdue_days = round_half_up(mean, MONEY_DP);
        }

        summary
    }

    pub fn count(&self, status: InstallmentStatus) -> usize {
        match status {
            InstallmentStatus::Pending => self.pending_count,
            InstallmentStatus::Partial => self.partial_count,
            InstallmentStatus::Paid => self.paid_count,
            InstallmentStatus::Overdue => self.overdue_count,
        }
    }

    pub fn is_fully_paid(&self) -> bool {
        self.installment_count > 0 && self.paid_count == self.installment_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Installment;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn position(number: u32, due: NaiveDate, paid: i64, today: NaiveDate) -> InstallmentPosition {
        let installment = Installment {
            installment_id: Uuid::new_v4(),
            credit_id: Uuid::new_v4(),
            installment_number: number,
            due_date: due,
            installment_amount: Money::from_major(100_000),
        };
        InstallmentPosition::evaluate(&installment, Money::from_major(paid), today)
    }

    #[test]
    fn test_empty_set_is_all_zero() {
        let summary = ScheduleSummary::from_positions(&[]);
        assert_eq!(summary, ScheduleSummary::default());
        assert_eq!(summary.payment_percentage, Decimal::ZERO);
        assert!(!summary.is_fully_paid());
    }

    #[test]
    fn test_quarter_paid() {
        let today = date(2024, 1, 1);
        let positions = vec![
            position(1, date(2024, 1, 10), 50_000, today),
            position(2, date(2024, 2, 10), 0, today),
        ];
        let summary = ScheduleSummary::from_positions(&positions);

        assert_eq!(summary.total_amount, Money::from_major(200_000));
        assert_eq!(summary.paid_amount, Money::from_major(50_000));
        assert_eq!(summary.pending_amount, Money::from_major(150_000));
        assert_eq!(summary.payment_percentage, dec!(25));
        assert_eq!(summary.partial_count, 1);
        assert_eq!(summary.pending_count, 1);
    }

    #[test]
    fn test_counts_and_average_overdue_days() {
        let today = date(2024, 4, 1);
        let positions = vec![
            position(1, date(2024, 3, 1), 100_000, today),
            position(2, date(2024, 3, 21), 0, today),
            position(3, date(2024, 3, 31), 20_000, today),
            position(4, date(2024, 4, 30), 0, today),
        ];
        let summary = ScheduleSummary::from_positions(&positions);

        assert_eq!(summary.paid_count, 1);
        assert_eq!(summary.overdue_count, 2);
        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.partial_count, 0);
        // (11 + 1) / 2
        assert_eq!(summary.average_overdue_days, dec!(6));
        assert_eq!(
            InstallmentStatus::ALL.iter().map(|s| summary.count(*s)).sum::<usize>(),
            summary.installment_count
        );
    }

    #[test]
    fn test_overpayment_can_push_pending_below_zero() {
        let today = date(2024, 1, 1);
        let positions = vec![position(1, date(2024, 2, 1), 150_000, today)];
        let summary = ScheduleSummary::from_positions(&positions);

        assert!(summary.pending_amount.is_negative());
        assert_eq!(summary.payment_percentage, dec!(150));
        assert!(summary.is_fully_paid());
    }
}
