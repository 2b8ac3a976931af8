pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod interest;
pub mod model;
pub mod payments;
pub mod reporting;
pub mod schedule;
pub mod service;
pub mod store;
pub mod types;
pub mod views;

// re-export key types
pub use config::{CreditLimits, LedgerConfig, OverdueConfig, ScheduleConfig, ServicingConfig};
pub use decimal::{Money, Rate};
pub use errors::{EntityKind, ErrorKind, ErrorResponse, Result, ServicingError};
pub use events::{EventStore, ServicingEvent};
pub use interest::{OverdueInterest, OverdueInterestCalculator};
pub use model::{
    Client, ClientUpdate, Credit, CreditTerms, Installment, NewClient, NewCredit, NewPayment,
    Payment,
};
pub use payments::{PaymentLedger, PaymentReceipt};
pub use reporting::{
    CreditPortfolioSummary, PaymentHistorySummary, PaymentStandingReport, ScheduleSummary,
    ScheduleTimeline,
};
pub use schedule::{classify, generate_schedule, InstallmentPosition, ScheduleGenerator};
pub use service::CreditServicer;
pub use store::{ClientSearch, InMemoryStore, ServicingStore};
pub use types::{
    ClientId, CreditId, CreditStatus, DocumentType, InstallmentId, InstallmentStatus, PaymentId,
    PaymentMethod, PaymentStanding, ProductType,
};
pub use views::{ClientScheduleView, CreditScheduleView, CreditTermsSummary, InstallmentView};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
