pub mod overdue;

pub use overdue::{OverdueInterest, OverdueInterestCalculator};
