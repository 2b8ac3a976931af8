use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::ServicingError;

/// unique identifier for a client
pub type ClientId = Uuid;

/// unique identifier for a credit
pub type CreditId = Uuid;

/// unique identifier for an installment (schedule entry)
pub type InstallmentId = Uuid;

/// unique identifier for a payment
pub type PaymentId = Uuid;

/// identity document types accepted at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    /// citizenship card
    CC,
    /// foreign id
    CE,
    /// identity card
    TI,
    /// passport
    PP,
}

/// financed product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    #[serde(rename = "e-bike")]
    EBike,
    #[serde(rename = "e-moped")]
    EMoped,
}

/// credit lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditStatus {
    /// disbursed and being repaid
    Active,
    /// closed
    Cancelled,
    /// written off as loss
    WrittenOff,
}

impl CreditStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CreditStatus::Active)
    }
}

/// installment status, always derived from the ledger and the current date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    Pending,
    Partial,
    Paid,
    Overdue,
}

impl InstallmentStatus {
    pub const ALL: [InstallmentStatus; 4] = [
        InstallmentStatus::Pending,
        InstallmentStatus::Partial,
        InstallmentStatus::Paid,
        InstallmentStatus::Overdue,
    ];
}

/// channel a payment was collected through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    App,
    Cash,
    Link,
    Transfer,
    Card,
}

/// overall repayment standing of a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStanding {
    UpToDate,
    InArrears,
}

macro_rules! str_enum {
    ($ty:ty, $label:literal, { $($text:literal => $variant:path),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ServicingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok($variant),)+
                    other => Err(ServicingError::validation(format!(
                        "unknown {}: {:?}", $label, other
                    ))),
                }
            }
        }
    };
}

str_enum!(DocumentType, "document type", {
    "CC" => DocumentType::CC,
    "CE" => DocumentType::CE,
    "TI" => DocumentType::TI,
    "PP" => DocumentType::PP,
});

str_enum!(ProductType, "product", {
    "e-bike" => ProductType::EBike,
    "e-moped" => ProductType::EMoped,
});

str_enum!(CreditStatus, "credit status", {
    "active" => CreditStatus::Active,
    "cancelled" => CreditStatus::Cancelled,
    "written_off" => CreditStatus::WrittenOff,
});

str_enum!(InstallmentStatus, "installment status", {
    "pending" => InstallmentStatus::Pending,
    "partial" => InstallmentStatus::Partial,
    "paid" => InstallmentStatus::Paid,
    "overdue" => InstallmentStatus::Overdue,
});

str_enum!(PaymentMethod, "payment method", {
    "app" => PaymentMethod::App,
    "cash" => PaymentMethod::Cash,
    "link" => PaymentMethod::Link,
    "transfer" => PaymentMethod::Transfer,
    "card" => PaymentMethod::Card,
});
