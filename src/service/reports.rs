use std::collections::HashMap;
use tracing::debug;

use crate::decimal::Rate;
use crate::errors::Result;
use crate::interest::{OverdueInterest, OverdueInterestCalculator};
use crate::model::{Installment, Payment};
use crate::reporting::{CreditPortfolioSummary, PaymentStandingReport, ScheduleSummary, ScheduleTimeline};
use crate::schedule::InstallmentPosition;
use crate::store::ServicingStore;
use crate::types::{ClientId, CreditId, InstallmentId, InstallmentStatus};
use crate::views::{ClientScheduleView, CreditScheduleView, InstallmentView};

use super::CreditServicer;

impl<'a, S: ServicingStore + ?Sized> CreditServicer<'a, S> {
    /// one installment with its derived fields as of today
    pub fn installment_position(&self, installment_id: InstallmentId) -> Result<InstallmentPosition> {
        let installment = self.require_installment(installment_id)?;
        let amount_paid = self.store.amount_paid(installment_id)?;
        Ok(InstallmentPosition::evaluate(&installment, amount_paid, self.today()))
    }

    /// a credit's installments with payments, ordered by number, and its summary
    pub fn credit_schedule(&self, credit_id: CreditId) -> Result<CreditScheduleView> {
        let credit = self.require_credit(credit_id)?;
        let installments = self.store.installments_by_credit(credit_id)?;
        let positions = self.positions(&installments)?;
        let payments = self.store.payments_by_credit(credit_id)?;

        let summary = ScheduleSummary::from_positions(&positions);
        debug!(
            credit_id = %credit_id,
            paid = summary.paid_count,
            overdue = summary.overdue_count,
            "credit schedule evaluated"
        );

        Ok(CreditScheduleView {
            principal: credit.principal(),
            credit,
            installments: views(&positions, payments),
            summary,
        })
    }

    pub fn credit_summary(&self, credit_id: CreditId) -> Result<ScheduleSummary> {
        self.require_credit(credit_id)?;
        let installments = self.store.installments_by_credit(credit_id)?;
        Ok(ScheduleSummary::from_positions(&self.positions(&installments)?))
    }

    /// every installment of a client ordered by credit then number, with a summary
    pub fn client_schedule(&self, client_id: ClientId) -> Result<ClientScheduleView> {
        let client = self.require_client(client_id)?;
        let installments = self.store.installments_by_client(client_id)?;
        let positions = self.positions(&installments)?;
        let payments = self.store.payments_by_client(client_id)?;

        let summary = ScheduleSummary::from_positions(&positions);
        debug!(client_id = %client_id, installments = summary.installment_count, "client schedule evaluated");

        Ok(ClientScheduleView {
            client,
            installments: views(&positions, payments),
            summary,
        })
    }

    /// installments of the client's active credits ordered by due date
    pub fn client_schedule_timeline(&self, client_id: ClientId) -> Result<ScheduleTimeline> {
        self.require_client(client_id)?;

        let mut positions = Vec::new();
        for credit in self.store.credits_by_client(client_id)? {
            if !credit.is_active() {
                continue;
            }
            let installments = self.store.installments_by_credit(credit.credit_id)?;
            for position in self.positions(&installments)? {
                positions.push((credit.product(), position));
            }
        }

        Ok(ScheduleTimeline::build(client_id, &positions, self.today()))
    }

    /// up to date or in arrears, over the client's active credits
    pub fn client_payment_standing(&self, client_id: ClientId) -> Result<PaymentStandingReport> {
        self.require_client(client_id)?;
        let positions = self.active_positions(client_id)?;
        let report = PaymentStandingReport::build(client_id, &positions, self.today());

        debug!(client_id = %client_id, standing = ?report.standing, "payment standing evaluated");
        Ok(report)
    }

    /// overdue installments, across all clients when `client_id` is `None`
    pub fn overdue_installments(&self, client_id: Option<ClientId>) -> Result<Vec<InstallmentPosition>> {
        self.installments_by_status(InstallmentStatus::Overdue, client_id)
    }

    /// installments currently in `status`, across all clients when `client_id` is `None`
    pub fn installments_by_status(
        &self,
        status: InstallmentStatus,
        client_id: Option<ClientId>,
    ) -> Result<Vec<InstallmentPosition>> {
        let installments = match client_id {
            Some(client_id) => {
                self.require_client(client_id)?;
                self.store.installments_by_client(client_id)?
            }
            None => self.store.installments()?,
        };

        let mut matching: Vec<InstallmentPosition> = self
            .positions(&installments)?
            .into_iter()
            .filter(|p| p.status == status)
            .collect();
        matching.sort_by_key(|p| (p.installment.due_date, p.installment.installment_number));
        Ok(matching)
    }

    /// overdue interest on one installment, at the configured rate unless one is given
    pub fn overdue_interest(&self, installment_id: InstallmentId, rate: Option<Rate>) -> Result<OverdueInterest> {
        let position = self.installment_position(installment_id)?;
        OverdueInterestCalculator::new(self.config.overdue.clone()).calculate(&position, rate)
    }

    pub fn client_credit_portfolio(&self, client_id: ClientId) -> Result<CreditPortfolioSummary> {
        self.require_client(client_id)?;
        let credits = self.store.credits_by_client(client_id)?;
        let installments = self.store.installments_by_client(client_id)?;
        let payments = self.store.payments_by_client(client_id)?;
        Ok(CreditPortfolioSummary::build(client_id, &credits, &installments, &payments))
    }

    fn active_positions(&self, client_id: ClientId) -> Result<Vec<InstallmentPosition>> {
        let mut installments: Vec<Installment> = Vec::new();
        for credit in self.store.credits_by_client(client_id)? {
            if credit.is_active() {
                installments.extend(self.store.installments_by_credit(credit.credit_id)?);
            }
        }
        self.positions(&installments)
    }
}

fn views(positions: &[InstallmentPosition], payments: Vec<Payment>) -> Vec<InstallmentView> {
    let mut by_installment: HashMap<InstallmentId, Vec<Payment>> = HashMap::new();
    for payment in payments {
        by_installment.entry(payment.installment_id).or_default().push(payment);
    }

    positions
        .iter()
        .map(|p| {
            let mut payments = by_installment.remove(&p.installment.installment_id).unwrap_or_default();
            payments.sort_by_key(|payment| payment.paid_at);
            InstallmentView::from_position(p, payments)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{new_client, new_credit, start};
    use super::*;
    use crate::config::ServicingConfig;
    use crate::decimal::Money;
    use crate::errors::ServicingError;
    use crate::model::NewPayment;
    use crate::store::InMemoryStore;
    use crate::types::{CreditStatus, PaymentMethod, PaymentStanding, ProductType};
    use chrono::{Duration, NaiveDate};
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn pay(installment: &Installment, amount: i64) -> NewPayment {
        NewPayment {
            installment_id: installment.installment_id,
            amount: Money::from_major(amount),
            method: PaymentMethod::App,
            paid_at: start(),
        }
    }

    #[test]
    fn test_credit_schedule_quarter_paid() {
        let store = InMemoryStore::new();
        let time = SafeTimeProvider::new(TimeSource::Test(start()));
        let mut servicer = CreditServicer::new(&store, ServicingConfig::default(), &time).unwrap();

        let client = servicer.register_client(new_client("1", "Cliente 1", None)).unwrap();
        let credit = servicer
            .originate_credit(new_credit(client.client_id, ProductType::EBike, 200_000, 2))
            .unwrap();
        let schedule = store.installments_by_credit(credit.credit_id).unwrap();
        servicer.record_payment(pay(&schedule[0], 30_000)).unwrap();
        servicer.record_payment(pay(&schedule[0], 20_000)).unwrap();

        let view = servicer.credit_schedule(credit.credit_id).unwrap();
        assert_eq!(view.principal, Money::from_major(200_000));
        assert_eq!(view.installments.len(), 2);
        assert_eq!(view.installments[0].status, InstallmentStatus::Partial);
        assert_eq!(view.installments[0].payments.len(), 2);
        assert_eq!(view.installments[1].status, InstallmentStatus::Pending);
        assert_eq!(view.summary.payment_percentage, dec!(25));
        assert_eq!(view.summary.pending_amount, Money::from_major(150_000));
        assert!(view.to_json_pretty().is_ok());
    }

    #[test]
    fn test_status_follows_the_clock() {
        let store = InMemoryStore::new();
        let time = SafeTimeProvider::new(TimeSource::Test(start()));
        let mut servicer = CreditServicer::new(&store, ServicingConfig::default(), &time).unwrap();

        let client = servicer.register_client(new_client("1", "Cliente 1", None)).unwrap();
        let credit = servicer
            .originate_credit(new_credit(client.client_id, ProductType::EBike, 300_000, 3))
            .unwrap();
        let schedule = store.installments_by_credit(credit.credit_id).unwrap();
        servicer.record_payment(pay(&schedule[0], 100_000)).unwrap();
        servicer.record_payment(pay(&schedule[1], 10_000)).unwrap();

        assert!(servicer.overdue_installments(None).unwrap().is_empty());

        // 2024-03-11: installment 2 (due 03-01) is 10 days late, installment 1 stays paid
        time.test_control().unwrap().advance(Duration::days(70));
        assert_eq!(servicer.today(), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());

        let overdue = servicer.overdue_installments(Some(client.client_id)).unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].installment.installment_number, 2);
        assert_eq!(overdue[0].days_overdue, 10);

        let paid = servicer
            .installments_by_status(InstallmentStatus::Paid, Some(client.client_id))
            .unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].days_overdue, 0);

        let summary = servicer.credit_summary(credit.credit_id).unwrap();
        assert_eq!(summary.overdue_count, 1);
        assert_eq!(summary.average_overdue_days, dec!(10));
    }

    #[test]
    fn test_overdue_interest_worked_example() {
        let store = InMemoryStore::new();
        let time = SafeTimeProvider::new(TimeSource::Test(start()));
        let mut servicer = CreditServicer::new(&store, ServicingConfig::default(), &time).unwrap();

        let client = servicer.register_client(new_client("1", "Cliente 1", None)).unwrap();
        let credit = servicer
            .originate_credit(new_credit(client.client_id, ProductType::EMoped, 1_000_000, 10))
            .unwrap();
        let first = store.installments_by_credit(credit.credit_id).unwrap()[0].clone();

        let early = servicer.overdue_interest(first.installment_id, None).unwrap();
        assert_eq!(early.days_overdue, 0);
        assert_eq!(early.overdue_interest, Money::ZERO);

        // first installment due 2024-01-31, ten days later
        time.test_control().unwrap().advance(Duration::days(40));
        let late = servicer.overdue_interest(first.installment_id, None).unwrap();
        assert_eq!(late.days_overdue, 10);
        assert_eq!(late.pending_balance, Money::from_major(100_000));
        assert_eq!(late.overdue_interest, Money::from_str_exact("54.79").unwrap());
        assert_eq!(late.total_with_overdue, Money::from_str_exact("100054.79").unwrap());

        let err = servicer.overdue_interest(Uuid::new_v4(), None).unwrap_err();
        assert!(matches!(err, ServicingError::NotFound { .. }));
    }

    #[test]
    fn test_standing_and_timeline_ignore_closed_credits() {
        let store = InMemoryStore::new();
        let time = SafeTimeProvider::new(TimeSource::Test(start()));
        let mut servicer = CreditServicer::new(&store, ServicingConfig::default(), &time).unwrap();

        let client = servicer.register_client(new_client("1", "Cliente 1", None)).unwrap();
        let active = servicer
            .originate_credit(new_credit(client.client_id, ProductType::EBike, 200_000, 2))
            .unwrap();
        let closed = servicer
            .originate_credit(new_credit(client.client_id, ProductType::EMoped, 500_000, 5))
            .unwrap();
        servicer.update_credit_status(closed.credit_id, CreditStatus::WrittenOff).unwrap();

        let schedule = store.installments_by_credit(active.credit_id).unwrap();
        servicer.record_payment(pay(&schedule[0], 100_000)).unwrap();

        // 2024-02-05: the closed credit's first installment is late but does not count
        time.test_control().unwrap().advance(Duration::days(35));

        let standing = servicer.client_payment_standing(client.client_id).unwrap();
        assert_eq!(standing.standing, PaymentStanding::UpToDate);
        assert_eq!(standing.paid_count, 1);
        assert_eq!(standing.upcoming_count, 1);
        assert_eq!(standing.next_installment.unwrap().installment_number, 2);

        let timeline = servicer.client_schedule_timeline(client.client_id).unwrap();
        assert_eq!(timeline.entries.len(), 2);
        assert!(timeline.entries.iter().all(|e| e.product == ProductType::EBike));
        assert_eq!(timeline.summary.pending_amount, Money::from_major(100_000));

        // the dashboard view still covers every credit
        let dashboard = servicer.client_schedule(client.client_id).unwrap();
        assert_eq!(dashboard.installments.len(), 7);
        assert_eq!(dashboard.summary.overdue_count, 1);
    }

    #[test]
    fn test_client_credit_portfolio() {
        let store = InMemoryStore::new();
        let time = SafeTimeProvider::new(TimeSource::Test(start()));
        let mut servicer = CreditServicer::new(&store, ServicingConfig::default(), &time).unwrap();

        let client = servicer.register_client(new_client("1", "Cliente 1", None)).unwrap();
        let first = servicer
            .originate_credit(new_credit(client.client_id, ProductType::EBike, 1_000_000, 10))
            .unwrap();
        let second = servicer
            .originate_credit(new_credit(client.client_id, ProductType::EMoped, 2_000_000, 20))
            .unwrap();
        servicer.update_credit_status(second.credit_id, CreditStatus::Cancelled).unwrap();

        let schedule = store.installments_by_credit(first.credit_id).unwrap();
        servicer.record_payment(pay(&schedule[0], 100_000)).unwrap();

        let portfolio = servicer.client_credit_portfolio(client.client_id).unwrap();
        assert_eq!(portfolio.credit_count, 2);
        assert_eq!(portfolio.active_count, 1);
        assert_eq!(portfolio.cancelled_count, 1);
        assert_eq!(portfolio.total_principal, Money::from_major(3_000_000));
        assert_eq!(portfolio.active_principal, Money::from_major(1_000_000));
        assert_eq!(portfolio.total_scheduled, Money::from_major(3_000_000));
        assert_eq!(portfolio.total_paid, Money::from_major(100_000));
        assert_eq!(portfolio.total_pending, Money::from_major(2_900_000));
    }

    #[test]
    fn test_portfolio_pending_matches_schedule_total() {
        let store = InMemoryStore::new();
        let time = SafeTimeProvider::new(TimeSource::Test(start()));
        let mut servicer = CreditServicer::new(&store, ServicingConfig::default(), &time).unwrap();

        let client = servicer.register_client(new_client("1", "Cliente 1", None)).unwrap();
        servicer
            .originate_credit(new_credit(client.client_id, ProductType::EBike, 2_500_000, 9))
            .unwrap();

        let schedule = servicer.client_schedule(client.client_id).unwrap();
        let portfolio = servicer.client_credit_portfolio(client.client_id).unwrap();
        assert_eq!(schedule.summary.total_amount, Money::from_major(2_500_020));
        assert_eq!(portfolio.total_pending, schedule.summary.total_amount);
        assert_eq!(portfolio.total_principal, Money::from_major(2_500_000));
    }

    #[test]
    fn test_empty_client_reports() {
        let store = InMemoryStore::new();
        let time = SafeTimeProvider::new(TimeSource::Test(start()));
        let mut servicer = CreditServicer::new(&store, ServicingConfig::default(), &time).unwrap();

        let client = servicer.register_client(new_client("1", "Cliente 1", None)).unwrap();

        let dashboard = servicer.client_schedule(client.client_id).unwrap();
        assert!(dashboard.installments.is_empty());
        assert_eq!(dashboard.summary, ScheduleSummary::default());

        let standing = servicer.client_payment_standing(client.client_id).unwrap();
        assert_eq!(standing.standing, PaymentStanding::UpToDate);
        assert!(standing.next_installment.is_none());

        let err = servicer.client_schedule(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ServicingError::NotFound { .. }));
    }
}
