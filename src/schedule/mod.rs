pub mod amortization;
pub mod status;

pub use amortization::{generate_schedule, ScheduleGenerator};
pub use status::{classify, days_overdue, is_overdue, InstallmentPosition};
