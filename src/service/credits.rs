use chrono::NaiveDate;
use tracing::{info, warn};

use crate::errors::{Result, ServicingError};
use crate::events::ServicingEvent;
use crate::model::{Credit, Installment, NewCredit};
use crate::schedule::ScheduleGenerator;
use crate::store::ServicingStore;
use crate::types::{ClientId, CreditId, CreditStatus, ProductType};
use crate::views::CreditTermsSummary;

use super::CreditServicer;

impl<'a, S: ServicingStore + ?Sized> CreditServicer<'a, S> {
    /// originate a credit for an existing client and persist its schedule
    pub fn originate_credit(&mut self, request: NewCredit) -> Result<Credit> {
        self.require_client(request.client_id)?;

        let generator = ScheduleGenerator::from_config(&self.config);
        let now = self.now();
        let credit = Credit::originate(request, now);
        // generate before persisting so invalid terms leave nothing behind
        let installments = generator.generate(&credit)?;

        let credit = self.store.insert_credit(credit)?;
        info!(
            credit_id = %credit.credit_id,
            client_id = %credit.client_id,
            product = %credit.product(),
            principal = %credit.principal(),
            installments = credit.terms.installment_count,
            "credit originated"
        );
        self.events.emit(ServicingEvent::CreditOriginated {
            credit_id: credit.credit_id,
            client_id: credit.client_id,
            product: credit.product(),
            principal: credit.principal(),
            installment_count: credit.terms.installment_count,
            timestamp: now,
        });

        self.persist_schedule(&credit, installments)?;
        Ok(credit)
    }

    /// generate and store the schedule of a credit that has none
    pub fn generate_schedule(&mut self, credit_id: CreditId) -> Result<Vec<Installment>> {
        let credit = self.require_credit(credit_id)?;

        if !self.store.installments_by_credit(credit_id)?.is_empty() {
            warn!(credit_id = %credit_id, "schedule already generated");
            return Err(ServicingError::domain_state(format!(
                "credit {} already has a payment schedule",
                credit_id
            )));
        }

        let installments = ScheduleGenerator::from_config(&self.config).generate(&credit)?;
        self.persist_schedule(&credit, installments.clone())?;
        Ok(installments)
    }

    fn persist_schedule(&mut self, credit: &Credit, installments: Vec<Installment>) -> Result<()> {
        let first_due_date = installments.first().map(|i| i.due_date);
        let last_due_date = installments.last().map(|i| i.due_date);
        let installment_amount = credit.terms.installment_value(self.config.schedule.rounding_unit);
        let installment_count = installments.len() as u32;

        self.store.insert_installments(credit.credit_id, installments)?;

        if let (Some(first_due_date), Some(last_due_date)) = (first_due_date, last_due_date) {
            info!(
                credit_id = %credit.credit_id,
                installments = installment_count,
                installment_amount = %installment_amount,
                %first_due_date,
                %last_due_date,
                "schedule generated"
            );
            self.events.emit(ServicingEvent::ScheduleGenerated {
                credit_id: credit.credit_id,
                installment_count,
                installment_amount,
                first_due_date,
                last_due_date,
                timestamp: self.now(),
            });
        }
        Ok(())
    }

    /// close or write off an active credit
    pub fn update_credit_status(&mut self, credit_id: CreditId, status: CreditStatus) -> Result<Credit> {
        let mut credit = self.require_credit(credit_id)?;
        let old_status = credit.status;

        if old_status != CreditStatus::Active || status == CreditStatus::Active {
            warn!(credit_id = %credit_id, from = %old_status, to = %status, "credit status change rejected");
            return Err(ServicingError::domain_state(format!(
                "credit {} cannot move from {} to {}",
                credit_id, old_status, status
            )));
        }

        credit.status = status;
        let credit = self.store.update_credit(credit)?;

        info!(credit_id = %credit_id, from = %old_status, to = %status, "credit status changed");
        self.events.emit(ServicingEvent::CreditStatusChanged {
            credit_id,
            old_status,
            new_status: status,
            timestamp: self.now(),
        });

        Ok(credit)
    }

    pub fn credit(&self, credit_id: CreditId) -> Result<Credit> {
        self.require_credit(credit_id)
    }

    pub fn credits_by_client(&self, client_id: ClientId) -> Result<Vec<Credit>> {
        self.require_client(client_id)?;
        self.store.credits_by_client(client_id)
    }

    pub fn active_credits(&self) -> Result<Vec<Credit>> {
        self.store.credits_by_status(CreditStatus::Active)
    }

    pub fn credits_by_product(&self, product: ProductType) -> Result<Vec<Credit>> {
        self.store.credits_by_product(product)
    }

    /// credits disbursed between `start` and `end`, both inclusive
    pub fn credits_disbursed_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Credit>> {
        if start > end {
            return Err(ServicingError::validation(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        self.store.credits_disbursed_between(start, end)
    }

    pub fn credit_terms_summary(&self, credit_id: CreditId) -> Result<CreditTermsSummary> {
        let credit = self.require_credit(credit_id)?;
        Ok(CreditTermsSummary::from_credit(&credit, self.config.schedule.rounding_unit))
    }
}
