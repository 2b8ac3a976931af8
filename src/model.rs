use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::CreditLimits;
use crate::decimal::{round_to_multiple, Money, Rate};
use crate::errors::{Result, ServicingError};
use crate::types::{
    ClientId, CreditId, CreditStatus, DocumentType, InstallmentId, PaymentId, PaymentMethod,
    ProductType,
};

const MAX_NAME_LEN: usize = 100;
const MAX_DOCUMENT_LEN: usize = 20;
const MAX_CITY_LEN: usize = 50;

/// registered borrower
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub client_id: ClientId,
    pub document_type: DocumentType,
    pub document_number: String,
    pub name: String,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Client {
    /// document type and number, e.g. "CC 10000001"
    pub fn full_document(&self) -> String {
        format!("{} {}", self.document_type, self.document_number)
    }
}

/// client registration request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClient {
    pub document_type: DocumentType,
    pub document_number: String,
    pub name: String,
    pub city: Option<String>,
}

impl NewClient {
    pub fn validate(&self) -> Result<()> {
        validate_document_number(&self.document_number)?;
        validate_name(&self.name)?;
        validate_city(self.city.as_deref())
    }

    pub fn into_client(self, created_at: DateTime<Utc>) -> Client {
        Client {
            client_id: Uuid::new_v4(),
            document_type: self.document_type,
            document_number: self.document_number.trim().to_string(),
            name: self.name.trim().to_string(),
            city: normalize_city(self.city),
            created_at,
        }
    }
}

/// changes to the non-key fields of a client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientUpdate {
    pub name: Option<String>,
    /// `Some(None)` clears the city
    pub city: Option<Option<String>>,
}

impl ClientUpdate {
    pub fn apply(self, client: &mut Client) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(city) = &self.city {
            validate_city(city.as_deref())?;
        }

        if let Some(name) = self.name {
            client.name = name.trim().to_string();
        }
        if let Some(city) = self.city {
            client.city = normalize_city(city);
        }
        Ok(())
    }
}

pub(crate) fn validate_document_number(number: &str) -> Result<()> {
    let number = number.trim();
    if number.is_empty() {
        return Err(ServicingError::validation("document number is required"));
    }
    if number.chars().count() > MAX_DOCUMENT_LEN {
        return Err(ServicingError::validation(format!(
            "document number longer than {} characters",
            MAX_DOCUMENT_LEN
        )));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServicingError::validation("client name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ServicingError::validation(format!(
            "client name longer than {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

fn validate_city(city: Option<&str>) -> Result<()> {
    match city {
        Some(city) if city.trim().chars().count() > MAX_CITY_LEN => Err(ServicingError::validation(
            format!("city longer than {} characters", MAX_CITY_LEN),
        )),
        _ => Ok(()),
    }
}

fn normalize_city(city: Option<String>) -> Option<String> {
    city.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())
}

/// terms a credit is originated with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditTerms {
    pub product: ProductType,
    pub principal: Money,
    pub installment_count: u32,
    pub annual_rate: Rate,
    pub disbursement_date: NaiveDate,
    pub first_payment_date: NaiveDate,
}

impl CreditTerms {
    /// check terms against the configured bounds
    pub fn validate(&self, limits: &CreditLimits) -> Result<()> {
        if self.installment_count < limits.min_installments
            || self.installment_count > limits.max_installments
        {
            return Err(ServicingError::validation(format!(
                "installment count {} outside [{}, {}]",
                self.installment_count, limits.min_installments, limits.max_installments
            )));
        }

        if self.principal < limits.minimum_principal {
            return Err(ServicingError::validation(format!(
                "principal {} below minimum {}",
                self.principal, limits.minimum_principal
            )));
        }

        if self.principal > limits.maximum_principal {
            return Err(ServicingError::validation(format!(
                "principal {} above maximum {}",
                self.principal, limits.maximum_principal
            )));
        }

        if self.annual_rate < limits.min_annual_rate || self.annual_rate > limits.max_annual_rate {
            return Err(ServicingError::validation(format!(
                "annual rate {} outside [{}, {}]",
                self.annual_rate, limits.min_annual_rate, limits.max_annual_rate
            )));
        }

        Ok(())
    }

    /// uniform installment value: principal / count rounded to the nearest `rounding_unit`
    pub fn installment_value(&self, rounding_unit: u32) -> Money {
        if self.installment_count == 0 {
            return Money::ZERO;
        }
        let raw = self.principal.as_decimal() / Decimal::from(self.installment_count);
        Money::from_decimal(round_to_multiple(raw, rounding_unit))
    }
}

/// credit origination request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCredit {
    pub client_id: ClientId,
    pub terms: CreditTerms,
}

/// micro-credit extended to a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credit {
    pub credit_id: CreditId,
    pub client_id: ClientId,
    pub terms: CreditTerms,
    pub status: CreditStatus,
    pub created_at: DateTime<Utc>,
}

impl Credit {
    pub fn originate(request: NewCredit, created_at: DateTime<Utc>) -> Self {
        Self {
            credit_id: Uuid::new_v4(),
            client_id: request.client_id,
            terms: request.terms,
            status: CreditStatus::Active,
            created_at,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CreditStatus::Active
    }

    pub fn product(&self) -> ProductType {
        self.terms.product
    }

    pub fn principal(&self) -> Money {
        self.terms.principal
    }
}

/// one scheduled due amount of a credit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub installment_id: InstallmentId,
    pub credit_id: CreditId,
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub installment_amount: Money,
}

/// money applied to one installment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: PaymentId,
    pub installment_id: InstallmentId,
    pub credit_id: CreditId,
    pub paid_at: DateTime<Utc>,
    pub amount: Money,
    pub method: PaymentMethod,
}

/// payment request as received from a collection channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub installment_id: InstallmentId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub paid_at: DateTime<Utc>,
}

impl NewPayment {
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(ServicingError::validation(format!(
                "payment amount must be positive, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}
