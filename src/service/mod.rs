//! credit servicing operations over a store.
//!
//! every "today" is read from the time provider. installment status, balances and
//! days overdue are derived from the ledger on each call and never stored.

mod clients;
mod credits;
mod payments;
mod reports;

use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use std::collections::HashMap;

use crate::config::ServicingConfig;
use crate::decimal::Money;
use crate::errors::{EntityKind, Result, ServicingError};
use crate::events::{EventStore, ServicingEvent};
use crate::model::{Client, Credit, Installment};
use crate::schedule::InstallmentPosition;
use crate::store::ServicingStore;
use crate::types::{ClientId, CreditId, InstallmentId};

/// entry point for servicing operations
pub struct CreditServicer<'a, S: ServicingStore + ?Sized> {
    store: &'a S,
    config: ServicingConfig,
    time_provider: &'a SafeTimeProvider,
    events: EventStore,
}

impl<'a, S: ServicingStore + ?Sized> CreditServicer<'a, S> {
    pub fn new(store: &'a S, config: ServicingConfig, time_provider: &'a SafeTimeProvider) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            time_provider,
            events: EventStore::new(),
        })
    }

    pub fn config(&self) -> &ServicingConfig {
        &self.config
    }

    pub fn store(&self) -> &'a S {
        self.store
    }

    pub fn events(&self) -> &[ServicingEvent] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<ServicingEvent> {
        self.events.take_events()
    }

    fn now(&self) -> DateTime<Utc> {
        self.time_provider.now()
    }

    /// current business date
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    fn require_client(&self, client_id: ClientId) -> Result<Client> {
        self.store
            .client(client_id)?
            .ok_or_else(|| ServicingError::not_found(EntityKind::Client, client_id))
    }

    fn require_credit(&self, credit_id: CreditId) -> Result<Credit> {
        self.store
            .credit(credit_id)?
            .ok_or_else(|| ServicingError::not_found(EntityKind::Credit, credit_id))
    }

    fn require_installment(&self, installment_id: InstallmentId) -> Result<Installment> {
        self.store
            .installment(installment_id)?
            .ok_or_else(|| ServicingError::not_found(EntityKind::Installment, installment_id))
    }

    /// evaluate installments against the ledger as of today, preserving their order
    fn positions(&self, installments: &[Installment]) -> Result<Vec<InstallmentPosition>> {
        let today = self.today();
        let mut paid_by_credit: HashMap<CreditId, HashMap<InstallmentId, Money>> = HashMap::new();
        let mut positions = Vec::with_capacity(installments.len());

        for installment in installments {
            if !paid_by_credit.contains_key(&installment.credit_id) {
                let totals = self.store.amounts_paid_by_credit(installment.credit_id)?;
                paid_by_credit.insert(installment.credit_id, totals);
            }
            let amount_paid = paid_by_credit
                .get(&installment.credit_id)
                .and_then(|totals| totals.get(&installment.installment_id))
                .copied()
                .unwrap_or(Money::ZERO);

            positions.push(InstallmentPosition::evaluate(installment, amount_paid, today));
        }

        Ok(positions)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::decimal::Rate;
    use crate::model::{CreditTerms, NewClient, NewCredit};
    use crate::types::{DocumentType, ProductType};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    /// 2024-01-01 09:00 UTC
    pub fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    pub fn new_client(number: &str, name: &str, city: Option<&str>) -> NewClient {
        NewClient {
            document_type: DocumentType::CC,
            document_number: number.to_string(),
            name: name.to_string(),
            city: city.map(str::to_string),
        }
    }

    /// first installment due 2024-01-31, then every 30 days
    pub fn new_credit(client_id: ClientId, product: ProductType, principal: i64, count: u32) -> NewCredit {
        NewCredit {
            client_id,
            terms: CreditTerms {
                product,
                principal: Money::from_major(principal),
                installment_count: count,
                annual_rate: Rate::from_decimal(dec!(0.28)),
                disbursement_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                first_payment_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            },
        }
    }
}
