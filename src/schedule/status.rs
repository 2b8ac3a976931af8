use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::model::Installment;
use crate::types::InstallmentStatus;

/// classify an installment from its paid total, due date and the current date.
///
/// a fully paid installment is `Paid` even when its due date has passed.
pub fn classify(
    installment_amount: Money,
    amount_paid: Money,
    due_date: NaiveDate,
    today: NaiveDate,
) -> InstallmentStatus {
    if amount_paid >= installment_amount {
        InstallmentStatus::Paid
    } else if due_date < today {
        InstallmentStatus::Overdue
    } else if amount_paid.is_positive() {
        InstallmentStatus::Partial
    } else {
        InstallmentStatus::Pending
    }
}

/// balance still owed and the due date has passed
pub fn is_overdue(pending_balance: Money, due_date: NaiveDate, today: NaiveDate) -> bool {
    pending_balance.is_positive() && due_date < today
}

/// whole days past due, zero unless overdue
pub fn days_overdue(pending_balance: Money, due_date: NaiveDate, today: NaiveDate) -> u32 {
    if !is_overdue(pending_balance, due_date, today) {
        return 0;
    }
    u32::try_from((today - due_date).num_days()).unwrap_or(u32::MAX)
}

/// an installment with every field derived from the ledger as of one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentPosition {
    pub installment: Installment,
    pub amount_paid: Money,
    /// negative when the installment was overpaid
    pub pending_balance: Money,
    pub status: InstallmentStatus,
    pub is_overdue: bool,
    pub days_overdue: u32,
}

impl InstallmentPosition {
    pub fn evaluate(installment: &Installment, amount_paid: Money, today: NaiveDate) -> Self {
        let due_date = installment.due_date;
        let pending_balance = installment.installment_amount - amount_paid;

        Self {
            installment: installment.clone(),
            amount_paid,
            pending_balance,
            status: classify(installment.installment_amount, amount_paid, due_date, today),
            is_overdue: is_overdue(pending_balance, due_date, today),
            days_overdue: days_overdue(pending_balance, due_date, today),
        }
    }

    /// signed days from `today` to the due date, negative once it has passed
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.installment.due_date - today).num_days()
    }

    pub fn is_paid(&self) -> bool {
        self.status == InstallmentStatus::Paid
    }
}
