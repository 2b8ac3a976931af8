use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::decimal::Money;
use crate::errors::Result;
use crate::model::{NewPayment, Payment};
use crate::payments::{PaymentLedger, PaymentReceipt};
use crate::reporting::PaymentHistorySummary;
use crate::store::ServicingStore;
use crate::types::{ClientId, CreditId, InstallmentId};

use super::CreditServicer;

impl<'a, S: ServicingStore + ?Sized> CreditServicer<'a, S> {
    /// append a payment to the ledger of one installment
    pub fn record_payment(&mut self, request: NewPayment) -> Result<PaymentReceipt> {
        let ledger = PaymentLedger::new(self.store, self.config.ledger.clone());
        let installment_id = request.installment_id;
        let amount = request.amount;

        let receipt = match ledger.record(request, self.time_provider, &mut self.events) {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(installment_id = %installment_id, amount = %amount, error = %err, "payment rejected");
                return Err(err);
            }
        };

        info!(
            payment_id = %receipt.payment.payment_id,
            installment_id = %installment_id,
            credit_id = %receipt.payment.credit_id,
            amount = %amount,
            method = %receipt.payment.method,
            pending_balance = %receipt.pending_balance,
            "payment recorded"
        );
        if receipt.is_overpaid() {
            warn!(
                installment_id = %installment_id,
                excess = %receipt.excess(),
                "installment overpaid"
            );
        }

        Ok(receipt)
    }

    /// total paid against an installment
    pub fn amount_paid(&self, installment_id: InstallmentId) -> Result<Money> {
        self.require_installment(installment_id)?;
        self.store.amount_paid(installment_id)
    }

    /// payments of an installment, newest first
    pub fn payments_by_installment(&self, installment_id: InstallmentId) -> Result<Vec<Payment>> {
        self.require_installment(installment_id)?;
        Ok(newest_first(self.store.payments_by_installment(installment_id)?))
    }

    /// payments of a credit, newest first
    pub fn payments_by_credit(&self, credit_id: CreditId) -> Result<Vec<Payment>> {
        self.require_credit(credit_id)?;
        Ok(newest_first(self.store.payments_by_credit(credit_id)?))
    }

    /// payments across all credits of a client, newest first
    pub fn payments_by_client(&self, client_id: ClientId) -> Result<Vec<Payment>> {
        self.require_client(client_id)?;
        Ok(newest_first(self.store.payments_by_client(client_id)?))
    }

    pub fn client_payment_summary(&self, client_id: ClientId) -> Result<PaymentHistorySummary> {
        self.require_client(client_id)?;

        let payments = self.store.payments_by_client(client_id)?;
        let installment_numbers: HashMap<InstallmentId, u32> = self
            .store
            .installments_by_client(client_id)?
            .into_iter()
            .map(|i| (i.installment_id, i.installment_number))
            .collect();

        let summary = PaymentHistorySummary::build(client_id, &payments, &installment_numbers);
        debug!(
            client_id = %client_id,
            payments = summary.payment_count,
            total = %summary.total_amount,
            "payment summary computed"
        );
        Ok(summary)
    }
}

fn newest_first(mut payments: Vec<Payment>) -> Vec<Payment> {
    payments.sort_by(|a, b| b.paid_at.cmp(&a.paid_at));
    payments
}
