pub mod ledger;

pub use ledger::{amount_paid_from, PaymentLedger, PaymentReceipt};
