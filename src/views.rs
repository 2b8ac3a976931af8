//! serializable views over credits and their schedules
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::model::{Client, Credit, Payment};
use crate::reporting::ScheduleSummary;
use crate::schedule::InstallmentPosition;
use crate::types::{CreditId, CreditStatus, InstallmentId, InstallmentStatus, ProductType};

/// an installment with its derived fields and payments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentView {
    pub installment_id: InstallmentId,
    pub credit_id: CreditId,
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub installment_amount: Money,
    pub amount_paid: Money,
    pub pending_balance: Money,
    pub status: InstallmentStatus,
    pub is_overdue: bool,
    pub days_overdue: u32,
    pub payments: Vec<Payment>,
}

impl InstallmentView {
    pub fn from_position(position: &InstallmentPosition, payments: Vec<Payment>) -> Self {
        let installment = &position.installment;
        InstallmentView {
            installment_id: installment.installment_id,
            credit_id: installment.credit_id,
            installment_number: installment.installment_number,
            due_date: installment.due_date,
            installment_amount: installment.installment_amount,
            amount_paid: position.amount_paid,
            pending_balance: position.pending_balance,
            status: position.status,
            is_overdue: position.is_overdue,
            days_overdue: position.days_overdue,
            payments,
        }
    }
}

/// one credit's full schedule with its summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditScheduleView {
    pub credit: Credit,
    pub principal: Money,
    pub installments: Vec<InstallmentView>,
    pub summary: ScheduleSummary,
}

impl CreditScheduleView {
    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// every installment of a client across its credits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientScheduleView {
    pub client: Client,
    pub installments: Vec<InstallmentView>,
    pub summary: ScheduleSummary,
}

impl ClientScheduleView {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// headline terms of a credit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditTermsSummary {
    pub credit_id: CreditId,
    pub product: ProductType,
    pub principal: Money,
    pub installment_count: u32,
    pub installment_value: Money,
    pub annual_rate: Rate,
    pub status: CreditStatus,
}

impl CreditTermsSummary {
    pub fn from_credit(credit: &Credit, rounding_unit: u32) -> Self {
        CreditTermsSummary {
            credit_id: credit.credit_id,
            product: credit.product(),
            principal: credit.principal(),
            installment_count: credit.terms.installment_count,
            installment_value: credit.terms.installment_value(rounding_unit),
            annual_rate: credit.terms.annual_rate,
            status: credit.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CreditTerms, NewCredit};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn test_terms_summary_serializes_money_as_strings() {
        let credit = Credit::originate(
            NewCredit {
                client_id: Uuid::new_v4(),
                terms: CreditTerms {
                    product: ProductType::EBike,
                    principal: Money::from_major(2_500_000),
                    installment_count: 9,
                    annual_rate: Rate::from_decimal(dec!(0.28)),
                    disbursement_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    first_payment_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                },
            },
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        );

        let summary = CreditTermsSummary::from_credit(&credit, 10);
        assert_eq!(summary.installment_value, Money::from_major(277_780));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["product"], "e-bike");
        assert_eq!(json["status"], "active");
        assert!(json["installment_value"].is_string());
    }
}
