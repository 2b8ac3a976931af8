use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::config::{CreditLimits, ScheduleConfig, ServicingConfig};
use crate::decimal::Money;
use crate::errors::{Result, ServicingError};
use crate::model::{Credit, CreditTerms, Installment};
use crate::types::CreditId;

/// builds the fixed installment schedule of a credit
#[derive(Debug, Clone)]
pub struct ScheduleGenerator {
    limits: CreditLimits,
    schedule: ScheduleConfig,
}

impl ScheduleGenerator {
    pub fn new(limits: CreditLimits, schedule: ScheduleConfig) -> Self {
        Self { limits, schedule }
    }

    pub fn from_config(config: &ServicingConfig) -> Self {
        Self::new(config.credit_limits.clone(), config.schedule.clone())
    }

    /// generate the installments of a credit
    pub fn generate(&self, credit: &Credit) -> Result<Vec<Installment>> {
        self.generate_for_terms(credit.credit_id, &credit.terms)
    }

    /// generate installments for the given terms.
    ///
    /// installment `i` (1-based) falls due `cadence_days * (i - 1)` days after the first
    /// payment date. every installment carries the same rounded value and the last one
    /// absorbs no rounding remainder.
    pub fn generate_for_terms(&self, credit_id: CreditId, terms: &CreditTerms) -> Result<Vec<Installment>> {
        terms.validate(&self.limits)?;

        let amount = terms.installment_value(self.schedule.rounding_unit);
        let mut installments = Vec::with_capacity(terms.installment_count as usize);

        for number in 1..=terms.installment_count {
            installments.push(Installment {
                installment_id: Uuid::new_v4(),
                credit_id,
                installment_number: number,
                due_date: self.due_date(terms.first_payment_date, number)?,
                installment_amount: amount,
            });
        }

        Ok(installments)
    }

    /// due date of installment `number` (1-based)
    pub fn due_date(&self, first_payment_date: NaiveDate, number: u32) -> Result<NaiveDate> {
        let offset = i64::from(self.schedule.cadence_days) * i64::from(number.saturating_sub(1));
        first_payment_date
            .checked_add_signed(Duration::days(offset))
            .ok_or_else(|| {
                ServicingError::validation(format!(
                    "due date of installment {} is out of range",
                    number
                ))
            })
    }

    /// sum of all installment values for the given terms
    pub fn scheduled_total(&self, terms: &CreditTerms) -> Money {
        terms.installment_value(self.schedule.rounding_unit) * rust_decimal::Decimal::from(terms.installment_count)
    }
}

/// generate a credit's schedule with the given configuration
pub fn generate_schedule(credit: &Credit, config: &ServicingConfig) -> Result<Vec<Installment>> {
    ScheduleGenerator::from_config(config).generate(credit)
}
