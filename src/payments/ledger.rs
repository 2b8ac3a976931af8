use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::decimal::Money;
use crate::errors::{EntityKind, Result, ServicingError};
use crate::events::{EventStore, ServicingEvent};
use crate::model::{Installment, NewPayment, Payment};
use crate::store::ServicingStore;
use crate::types::InstallmentId;

/// outcome of recording one payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub installment_number: u32,
    pub installment_amount: Money,
    /// ledger total after this payment
    pub amount_paid: Money,
    pub pending_balance: Money,
}

impl PaymentReceipt {
    pub fn is_overpaid(&self) -> bool {
        self.pending_balance.is_negative()
    }

    /// amount paid beyond the installment value
    pub fn excess(&self) -> Money {
        (-self.pending_balance).max(Money::ZERO)
    }
}

/// append-only payment ledger over a store
pub struct PaymentLedger<'a, S: ServicingStore + ?Sized> {
    store: &'a S,
    config: LedgerConfig,
}

impl<'a, S: ServicingStore + ?Sized> PaymentLedger<'a, S> {
    pub fn new(store: &'a S, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    /// record a payment against an installment.
    ///
    /// payments beyond the pending balance are accepted unless the ledger was configured
    /// to reject them.
    pub fn record(
        &self,
        request: NewPayment,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<PaymentReceipt> {
        request.validate()?;

        let installment = self.installment(request.installment_id)?;

        if self.config.reject_overpayment {
            let pending = installment.installment_amount - self.amount_paid(installment.installment_id)?;
            if request.amount > pending {
                return Err(ServicingError::domain_state(format!(
                    "payment of {} exceeds pending balance {} of installment {}",
                    request.amount, pending, installment.installment_number
                )));
            }
        }

        let payment = self.store.insert_payment(Payment {
            payment_id: Uuid::new_v4(),
            installment_id: installment.installment_id,
            credit_id: installment.credit_id,
            paid_at: request.paid_at,
            amount: request.amount,
            method: request.method,
        })?;

        let amount_paid = self.amount_paid(installment.installment_id)?;
        let receipt = PaymentReceipt {
            installment_number: installment.installment_number,
            installment_amount: installment.installment_amount,
            amount_paid,
            pending_balance: installment.installment_amount - amount_paid,
            payment,
        };

        let now = time_provider.now();
        events.emit(ServicingEvent::PaymentRecorded {
            payment_id: receipt.payment.payment_id,
            installment_id: receipt.payment.installment_id,
            credit_id: receipt.payment.credit_id,
            amount: receipt.payment.amount,
            method: receipt.payment.method,
            amount_paid: receipt.amount_paid,
            pending_balance: receipt.pending_balance,
            timestamp: now,
        });
        if receipt.is_overpaid() {
            events.emit(ServicingEvent::OverpaymentAccepted {
                installment_id: receipt.payment.installment_id,
                credit_id: receipt.payment.credit_id,
                excess: receipt.excess(),
                timestamp: now,
            });
        }

        Ok(receipt)
    }

    /// total paid against an installment, summed fresh from the ledger
    pub fn amount_paid(&self, installment_id: InstallmentId) -> Result<Money> {
        self.store.amount_paid(installment_id)
    }

    pub fn payments(&self, installment_id: InstallmentId) -> Result<Vec<Payment>> {
        self.installment(installment_id)?;
        self.store.payments_by_installment(installment_id)
    }

    fn installment(&self, installment_id: InstallmentId) -> Result<Installment> {
        self.store
            .installment(installment_id)?
            .ok_or_else(|| ServicingError::not_found(EntityKind::Installment, installment_id))
    }
}

/// sum of payment amounts, independent of order
pub fn amount_paid_from(payments: &[Payment]) -> Money {
    payments.iter().map(|p| p.amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServicingConfig;
    use crate::decimal::Rate;
    use crate::model::{Credit, CreditTerms, NewClient, NewCredit};
    use crate::schedule::generate_schedule;
    use crate::store::InMemoryStore;
    use crate::types::{DocumentType, PaymentMethod, ProductType};
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap()
    }

    fn seeded() -> (InMemoryStore, Vec<Installment>) {
        let store = InMemoryStore::new();
        let client = store
            .insert_client(
                NewClient {
                    document_type: DocumentType::CC,
                    document_number: "20000002".to_string(),
                    name: "Cliente 2".to_string(),
                    city: None,
                }
                .into_client(now()),
            )
            .unwrap();
        let credit = store
            .insert_credit(Credit::originate(
                NewCredit {
                    client_id: client.client_id,
                    terms: CreditTerms {
                        product: ProductType::EMoped,
                        principal: Money::from_major(300_000),
                        installment_count: 3,
                        annual_rate: Rate::from_decimal(dec!(0.3)),
                        disbursement_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                        first_payment_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                    },
                },
                now(),
            ))
            .unwrap();
        let schedule = generate_schedule(&credit, &ServicingConfig::default()).unwrap();
        store.insert_installments(credit.credit_id, schedule.clone()).unwrap();
        (store, schedule)
    }

    fn request(installment_id: InstallmentId, amount: i64) -> NewPayment {
        NewPayment {
            installment_id,
            amount: Money::from_major(amount),
            method: PaymentMethod::Transfer,
            paid_at: now(),
        }
    }

    #[test]
    fn test_payments_accumulate() {
        let (store, schedule) = seeded();
        let ledger = PaymentLedger::new(&store, LedgerConfig::default());
        let time = SafeTimeProvider::new(TimeSource::Test(now()));
        let mut events = EventStore::new();
        let target = schedule[0].installment_id;

        let first = ledger.record(request(target, 40_000), &time, &mut events).unwrap();
        assert_eq!(first.amount_paid, Money::from_major(40_000));
        assert_eq!(first.pending_balance, Money::from_major(60_000));

        let second = ledger.record(request(target, 60_000), &time, &mut events).unwrap();
        assert_eq!(second.amount_paid, Money::from_major(100_000));
        assert!(second.pending_balance.is_zero());
        assert!(!second.is_overpaid());

        assert_eq!(ledger.amount_paid(target).unwrap(), Money::from_major(100_000));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_sum_is_order_independent() {
        let (store, schedule) = seeded();
        let target = &schedule[1];
        let time = SafeTimeProvider::new(TimeSource::Test(now()));
        let ledger = PaymentLedger::new(&store, LedgerConfig::default());
        let mut events = EventStore::new();

        for amount in [10_000, 25_000, 5_000] {
            ledger.record(request(target.installment_id, amount), &time, &mut events).unwrap();
        }

        let mut payments = ledger.payments(target.installment_id).unwrap();
        let forward = amount_paid_from(&payments);
        payments.reverse();
        assert_eq!(forward, amount_paid_from(&payments));
        assert_eq!(forward, Money::from_major(40_000));
    }

    #[test]
    fn test_overpayment_accepted_by_default() {
        let (store, schedule) = seeded();
        let ledger = PaymentLedger::new(&store, LedgerConfig::default());
        let time = SafeTimeProvider::new(TimeSource::Test(now()));
        let mut events = EventStore::new();

        let receipt = ledger
            .record(request(schedule[0].installment_id, 120_000), &time, &mut events)
            .unwrap();

        assert!(receipt.is_overpaid());
        assert_eq!(receipt.pending_balance, Money::from_major(-20_000));
        assert_eq!(receipt.excess(), Money::from_major(20_000));
        assert!(matches!(
            events.events().last(),
            Some(ServicingEvent::OverpaymentAccepted { .. })
        ));
    }

    #[test]
    fn test_overpayment_guard() {
        let (store, schedule) = seeded();
        let ledger = PaymentLedger::new(&store, LedgerConfig { reject_overpayment: true });
        let time = SafeTimeProvider::new(TimeSource::Test(now()));
        let mut events = EventStore::new();
        let target = schedule[0].installment_id;

        ledger.record(request(target, 90_000), &time, &mut events).unwrap();
        let err = ledger.record(request(target, 10_001), &time, &mut events).unwrap_err();
        assert!(matches!(err, ServicingError::DomainState { .. }));

        ledger.record(request(target, 10_000), &time, &mut events).unwrap();
        assert_eq!(ledger.amount_paid(target).unwrap(), Money::from_major(100_000));
    }

    #[test]
    fn test_rejects_invalid_requests() {
        let (store, _) = seeded();
        let ledger = PaymentLedger::new(&store, LedgerConfig::default());
        let time = SafeTimeProvider::new(TimeSource::Test(now()));
        let mut events = EventStore::new();

        let missing = ledger.record(request(Uuid::new_v4(), 1_000), &time, &mut events).unwrap_err();
        assert!(matches!(missing, ServicingError::NotFound { .. }));

        let (_, schedule) = seeded();
        let zero = ledger.record(request(schedule[0].installment_id, 0), &time, &mut events).unwrap_err();
        assert!(matches!(zero, ServicingError::Validation { .. }));

        assert!(events.is_empty());
        assert_eq!(store.payment_count(), 0);
    }
}
