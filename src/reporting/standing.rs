use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::reporting::ScheduleSummary;
use crate::schedule::InstallmentPosition;
use crate::types::{ClientId, CreditId, InstallmentId, InstallmentStatus, PaymentStanding, ProductType};

/// brief reference to one installment in a standing report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentRef {
    pub installment_id: InstallmentId,
    pub credit_id: CreditId,
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub installment_amount: Money,
    pub pending_balance: Money,
    pub days_until_due: i64,
    pub days_overdue: u32,
}

impl InstallmentRef {
    fn of(position: &InstallmentPosition, today: NaiveDate) -> Self {
        let installment = &position.installment;
        Self {
            installment_id: installment.installment_id,
            credit_id: installment.credit_id,
            installment_number: installment.installment_number,
            due_date: installment.due_date,
            installment_amount: installment.installment_amount,
            pending_balance: position.pending_balance,
            days_until_due: position.days_until_due(today),
            days_overdue: position.days_overdue,
        }
    }
}

/// whether a client is up to date on its active credits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentStandingReport {
    pub client_id: ClientId,
    pub as_of: NaiveDate,
    pub standing: PaymentStanding,
    pub upcoming_count: usize,
    pub overdue_count: usize,
    pub paid_count: usize,
    /// earliest unpaid installment not yet past due
    pub next_installment: Option<InstallmentRef>,
    /// overdue installment with the latest due date
    pub latest_overdue: Option<InstallmentRef>,
}

impl PaymentStandingReport {
    /// `positions` should cover the installments of active credits only
    pub fn build(client_id: ClientId, positions: &[InstallmentPosition], today: NaiveDate) -> Self {
        let upcoming: Vec<&InstallmentPosition> = positions
            .iter()
            .filter(|p| !p.is_paid() && p.installment.due_date >= today)
            .collect();
        let overdue: Vec<&InstallmentPosition> = positions.iter().filter(|p| p.is_overdue).collect();

        let next_installment = upcoming
            .iter()
            .min_by_key(|p| (p.installment.due_date, p.installment.installment_number))
            .map(|p| InstallmentRef::of(p, today));
        let latest_overdue = overdue
            .iter()
            .max_by_key(|p| (p.installment.due_date, p.installment.installment_number))
            .map(|p| InstallmentRef::of(p, today));

        Self {
            client_id,
            as_of: today,
            standing: standing_of(positions),
            upcoming_count: upcoming.len(),
            overdue_count: overdue.len(),
            paid_count: positions.iter().filter(|p| p.is_paid()).count(),
            next_installment,
            latest_overdue,
        }
    }
}

/// in arrears as soon as any installment is overdue
pub fn standing_of(positions: &[InstallmentPosition]) -> PaymentStanding {
    if positions.iter().any(|p| p.is_overdue) {
        PaymentStanding::InArrears
    } else {
        PaymentStanding::UpToDate
    }
}

/// one row of the compact schedule timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub credit_id: CreditId,
    pub product: ProductType,
    pub installment_id: InstallmentId,
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub installment_amount: Money,
    pub amount_paid: Money,
    pub pending_balance: Money,
    pub status: InstallmentStatus,
    /// zero once the due date has passed
    pub days_until_due: u32,
    pub days_past_due: u32,
}

/// installments of a client's active credits ordered by due date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTimeline {
    pub client_id: ClientId,
    pub as_of: NaiveDate,
    pub standing: PaymentStanding,
    pub entries: Vec<TimelineEntry>,
    pub summary: ScheduleSummary,
}

impl ScheduleTimeline {
    pub fn build(
        client_id: ClientId,
        positions: &[(ProductType, InstallmentPosition)],
        today: NaiveDate,
    ) -> Self {
        let mut entries: Vec<TimelineEntry> = positions
            .iter()
            .map(|(product, p)| TimelineEntry {
                credit_id: p.installment.credit_id,
                product: *product,
                installment_id: p.installment.installment_id,
                installment_number: p.installment.installment_number,
                due_date: p.installment.due_date,
                installment_amount: p.installment.installment_amount,
                amount_paid: p.amount_paid,
                pending_balance: p.pending_balance,
                status: p.status,
                days_until_due: u32::try_from(p.days_until_due(today).max(0)).unwrap_or(u32::MAX),
                days_past_due: p.days_overdue,
            })
            .collect();
        entries.sort_by_key(|e| (e.due_date, e.installment_number));

        let bare: Vec<InstallmentPosition> = positions.iter().map(|(_, p)| p.clone()).collect();

        Self {
            client_id,
            as_of: today,
            standing: standing_of(&bare),
            entries,
            summary: ScheduleSummary::from_positions(&bare),
        }
    }
}
