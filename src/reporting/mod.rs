pub mod portfolio;
pub mod standing;
pub mod summary;

pub use portfolio::{CreditPortfolioSummary, LastPayment, MethodTotals, PaymentHistorySummary};
pub use standing::{
    standing_of, InstallmentRef, PaymentStandingReport, ScheduleTimeline, TimelineEntry,
};
pub use summary::ScheduleSummary;
