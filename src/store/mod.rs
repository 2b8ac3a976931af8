pub mod memory;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::decimal::Money;
use crate::errors::Result;
use crate::model::{Client, Credit, Installment, Payment};
use crate::types::{
    ClientId, CreditId, CreditStatus, DocumentType, InstallmentId, ProductType,
};

pub use memory::InMemoryStore;

/// client search criteria. text fields match case-insensitive substrings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientSearch {
    pub document_type: Option<DocumentType>,
    pub document_number: Option<String>,
    pub name: Option<String>,
    pub city: Option<String>,
}

impl ClientSearch {
    pub fn is_empty(&self) -> bool {
        self.document_type.is_none()
            && self.document_number.is_none()
            && self.name.is_none()
            && self.city.is_none()
    }

    pub fn matches(&self, client: &Client) -> bool {
        if let Some(document_type) = self.document_type {
            if client.document_type != document_type {
                return false;
            }
        }
        if !contains_ignore_case(Some(&client.document_number), self.document_number.as_deref()) {
            return false;
        }
        if !contains_ignore_case(Some(&client.name), self.name.as_deref()) {
            return false;
        }
        contains_ignore_case(client.city.as_ref(), self.city.as_deref())
    }
}

fn contains_ignore_case(value: Option<&String>, needle: Option<&str>) -> bool {
    match needle.map(str::trim) {
        None | Some("") => true,
        Some(needle) => value
            .map(|v| v.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
    }
}

/// repository over clients, credits, installments and the payment ledger.
///
/// lookups return `Ok(None)` for unknown ids; callers decide whether that is a not-found
/// error. each write is atomic for the rows it touches.
pub trait ServicingStore: Send + Sync {
    // clients
    fn insert_client(&self, client: Client) -> Result<Client>;
    fn update_client(&self, client: Client) -> Result<Client>;
    fn client(&self, client_id: ClientId) -> Result<Option<Client>>;
    fn client_by_document(
        &self,
        document_type: DocumentType,
        document_number: &str,
    ) -> Result<Option<Client>>;
    /// matching clients ordered by name
    fn search_clients(&self, criteria: &ClientSearch) -> Result<Vec<Client>>;
    fn clients(&self) -> Result<Vec<Client>>;

    // credits
    fn insert_credit(&self, credit: Credit) -> Result<Credit>;
    fn update_credit(&self, credit: Credit) -> Result<Credit>;
    fn credit(&self, credit_id: CreditId) -> Result<Option<Credit>>;
    fn credits_by_client(&self, client_id: ClientId) -> Result<Vec<Credit>>;
    fn credits_by_status(&self, status: CreditStatus) -> Result<Vec<Credit>>;
    fn credits_by_product(&self, product: ProductType) -> Result<Vec<Credit>>;
    /// credits disbursed within `[start, end]`
    fn credits_disbursed_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Credit>>;

    // installments
    /// store a credit's whole schedule. fails when the credit already has one
    fn insert_installments(&self, credit_id: CreditId, installments: Vec<Installment>) -> Result<()>;
    fn installment(&self, installment_id: InstallmentId) -> Result<Option<Installment>>;
    /// ordered by installment number
    fn installments_by_credit(&self, credit_id: CreditId) -> Result<Vec<Installment>>;
    fn installments(&self) -> Result<Vec<Installment>>;

    // payments
    /// append to the ledger. fails when the installment is unknown
    fn insert_payment(&self, payment: Payment) -> Result<Payment>;
    fn payments_by_installment(&self, installment_id: InstallmentId) -> Result<Vec<Payment>>;
    fn payments_by_credit(&self, credit_id: CreditId) -> Result<Vec<Payment>>;

    /// installments of every credit of a client, by credit then number
    fn installments_by_client(&self, client_id: ClientId) -> Result<Vec<Installment>> {
        let mut installments = Vec::new();
        for credit in self.credits_by_client(client_id)? {
            installments.extend(self.installments_by_credit(credit.credit_id)?);
        }
        Ok(installments)
    }

    fn payments_by_client(&self, client_id: ClientId) -> Result<Vec<Payment>> {
        let mut payments = Vec::new();
        for credit in self.credits_by_client(client_id)? {
            payments.extend(self.payments_by_credit(credit.credit_id)?);
        }
        Ok(payments)
    }

    /// fresh sum over the ledger
    fn amount_paid(&self, installment_id: InstallmentId) -> Result<Money> {
        Ok(self
            .payments_by_installment(installment_id)?
            .iter()
            .map(|p| p.amount)
            .sum())
    }

    /// paid totals per installment of a credit. installments without payments are absent
    fn amounts_paid_by_credit(&self, credit_id: CreditId) -> Result<HashMap<InstallmentId, Money>> {
        let mut totals: HashMap<InstallmentId, Money> = HashMap::new();
        for payment in self.payments_by_credit(credit_id)? {
            *totals.entry(payment.installment_id).or_insert(Money::ZERO) += payment.amount;
        }
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn client(name: &str, city: Option<&str>) -> Client {
        Client {
            client_id: Uuid::new_v4(),
            document_type: DocumentType::CC,
            document_number: "10000001".to_string(),
            name: name.to_string(),
            city: city.map(str::to_string),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_search_matches_substrings_ignoring_case() {
        let bogota = client("Maria Lopez", Some("Bogota"));

        let by_name = ClientSearch { name: Some("LOPEZ".to_string()), ..Default::default() };
        assert!(by_name.matches(&bogota));

        let by_city = ClientSearch { city: Some("bog".to_string()), ..Default::default() };
        assert!(by_city.matches(&bogota));
        assert!(!by_city.matches(&client("Maria Lopez", None)));

        let by_type = ClientSearch { document_type: Some(DocumentType::PP), ..Default::default() };
        assert!(!by_type.matches(&bogota));

        assert!(ClientSearch::default().is_empty());
        assert!(ClientSearch::default().matches(&bogota));
    }
}
