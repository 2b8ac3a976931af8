use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::decimal::Money;
use crate::model::{Credit, Installment, Payment};
use crate::types::{ClientId, CreditStatus, InstallmentId, PaymentMethod};

/// credits of one client by lifecycle status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditPortfolioSummary {
    pub client_id: ClientId,
    pub credit_count: usize,
    pub active_count: usize,
    pub cancelled_count: usize,
    pub written_off_count: usize,
    pub total_principal: Money,
    pub active_principal: Money,
    /// sum of every scheduled installment amount
    pub total_scheduled: Money,
    pub total_paid: Money,
    /// scheduled amount not yet covered by payments, never below zero
    pub total_pending: Money,
}

impl CreditPortfolioSummary {
    pub fn build(
        client_id: ClientId,
        credits: &[Credit],
        installments: &[Installment],
        payments: &[Payment],
    ) -> Self {
        let count = |status: CreditStatus| credits.iter().filter(|c| c.status == status).count();
        let total_scheduled: Money = installments.iter().map(|i| i.installment_amount).sum();
        let total_paid: Money = payments.iter().map(|p| p.amount).sum();

        Self {
            client_id,
            credit_count: credits.len(),
            active_count: count(CreditStatus::Active),
            cancelled_count: count(CreditStatus::Cancelled),
            written_off_count: count(CreditStatus::WrittenOff),
            total_principal: credits.iter().map(Credit::principal).sum(),
            active_principal: credits.iter().filter(|c| c.is_active()).map(Credit::principal).sum(),
            total_scheduled,
            total_paid,
            total_pending: (total_scheduled - total_paid).max(Money::ZERO),
        }
    }
}

/// payments collected through one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodTotals {
    pub count: usize,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastPayment {
    pub paid_at: DateTime<Utc>,
    pub amount: Money,
    pub method: PaymentMethod,
    pub installment_number: Option<u32>,
}

/// payment history of one client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentHistorySummary {
    pub client_id: ClientId,
    pub payment_count: usize,
    pub total_amount: Money,
    pub average_amount: Money,
    pub by_method: BTreeMap<PaymentMethod, MethodTotals>,
    pub last_payment: Option<LastPayment>,
}

impl PaymentHistorySummary {
    /// `installment_numbers` resolves the installment of the last payment
    pub fn build(
        client_id: ClientId,
        payments: &[Payment],
        installment_numbers: &HashMap<InstallmentId, u32>,
    ) -> Self {
        let total_amount: Money = payments.iter().map(|p| p.amount).sum();
        let average_amount = if payments.is_empty() {
            Money::ZERO
        } else {
            total_amount / Decimal::from(payments.len() as u64)
        };

        let mut by_method: BTreeMap<PaymentMethod, MethodTotals> = BTreeMap::new();
        for payment in payments {
            let totals = by_method.entry(payment.method).or_default();
            totals.count += 1;
            totals.amount += payment.amount;
        }

        let last_payment = payments.iter().max_by_key(|p| p.paid_at).map(|p| LastPayment {
            paid_at: p.paid_at,
            amount: p.amount,
            method: p.method,
            installment_number: installment_numbers.get(&p.installment_id).copied(),
        });

        Self {
            client_id,
            payment_count: payments.len(),
            total_amount,
            average_amount,
            by_method,
            last_payment,
        }
    }
}
