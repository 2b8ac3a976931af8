use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::errors::{EntityKind, Result, ServicingError};
use crate::model::{Client, Credit, Installment, Payment};
use crate::store::{ClientSearch, ServicingStore};
use crate::types::{
    ClientId, CreditId, CreditStatus, DocumentType, InstallmentId, ProductType,
};

#[derive(Debug, Default)]
struct Tables {
    clients: Vec<Client>,
    client_index: HashMap<ClientId, usize>,
    documents: HashMap<(DocumentType, String), ClientId>,

    credits: Vec<Credit>,
    credit_index: HashMap<CreditId, usize>,

    installments: Vec<Installment>,
    installment_index: HashMap<InstallmentId, usize>,
    schedules: HashMap<CreditId, Vec<usize>>,

    payments: Vec<Payment>,
    ledger: HashMap<InstallmentId, Vec<usize>>,
}

/// in-process store: append-only tables with id indexes behind one lock
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn payment_count(&self) -> usize {
        self.tables.read().payments.len()
    }
}

impl ServicingStore for InMemoryStore {
    fn insert_client(&self, client: Client) -> Result<Client> {
        let mut tables = self.tables.write();
        let key = (client.document_type, client.document_number.clone());

        if tables.documents.contains_key(&key) {
            return Err(ServicingError::domain_state(format!(
                "a client with document {} already exists",
                client.full_document()
            )));
        }
        if tables.client_index.contains_key(&client.client_id) {
            return Err(ServicingError::store(format!("duplicate client id {}", client.client_id)));
        }

        let row = tables.clients.len();
        tables.client_index.insert(client.client_id, row);
        tables.documents.insert(key, client.client_id);
        tables.clients.push(client.clone());
        Ok(client)
    }

    fn update_client(&self, client: Client) -> Result<Client> {
        let mut tables = self.tables.write();
        let row = *tables
            .client_index
            .get(&client.client_id)
            .ok_or_else(|| ServicingError::not_found(EntityKind::Client, client.client_id))?;

        let stored = &mut tables.clients[row];
        if stored.document_type != client.document_type
            || stored.document_number != client.document_number
        {
            return Err(ServicingError::domain_state("client document cannot be changed"));
        }
        *stored = client.clone();
        Ok(client)
    }

    fn client(&self, client_id: ClientId) -> Result<Option<Client>> {
        let tables = self.tables.read();
        Ok(tables.client_index.get(&client_id).map(|&row| tables.clients[row].clone()))
    }

    fn client_by_document(
        &self,
        document_type: DocumentType,
        document_number: &str,
    ) -> Result<Option<Client>> {
        let tables = self.tables.read();
        let key = (document_type, document_number.trim().to_string());
        Ok(tables
            .documents
            .get(&key)
            .and_then(|id| tables.client_index.get(id))
            .map(|&row| tables.clients[row].clone()))
    }

    fn search_clients(&self, criteria: &ClientSearch) -> Result<Vec<Client>> {
        let tables = self.tables.read();
        let mut found: Vec<Client> = tables
            .clients
            .iter()
            .filter(|c| criteria.matches(c))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    fn clients(&self) -> Result<Vec<Client>> {
        Ok(self.tables.read().clients.clone())
    }

    fn insert_credit(&self, credit: Credit) -> Result<Credit> {
        let mut tables = self.tables.write();
        if !tables.client_index.contains_key(&credit.client_id) {
            return Err(ServicingError::not_found(EntityKind::Client, credit.client_id));
        }
        if tables.credit_index.contains_key(&credit.credit_id) {
            return Err(ServicingError::store(format!("duplicate credit id {}", credit.credit_id)));
        }

        let row = tables.credits.len();
        tables.credit_index.insert(credit.credit_id, row);
        tables.credits.push(credit.clone());
        Ok(credit)
    }

    fn update_credit(&self, credit: Credit) -> Result<Credit> {
        let mut tables = self.tables.write();
        let row = *tables
            .credit_index
            .get(&credit.credit_id)
            .ok_or_else(|| ServicingError::not_found(EntityKind::Credit, credit.credit_id))?;
        tables.credits[row] = credit.clone();
        Ok(credit)
    }

    fn credit(&self, credit_id: CreditId) -> Result<Option<Credit>> {
        let tables = self.tables.read();
        Ok(tables.credit_index.get(&credit_id).map(|&row| tables.credits[row].clone()))
    }

    fn credits_by_client(&self, client_id: ClientId) -> Result<Vec<Credit>> {
        Ok(self.filter_credits(|c| c.client_id == client_id))
    }

    fn credits_by_status(&self, status: CreditStatus) -> Result<Vec<Credit>> {
        Ok(self.filter_credits(|c| c.status == status))
    }

    fn credits_by_product(&self, product: ProductType) -> Result<Vec<Credit>> {
        Ok(self.filter_credits(|c| c.product() == product))
    }

    fn credits_disbursed_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Credit>> {
        Ok(self.filter_credits(|c| {
            let disbursed = c.terms.disbursement_date;
            disbursed >= start && disbursed <= end
        }))
    }

    fn insert_installments(&self, credit_id: CreditId, installments: Vec<Installment>) -> Result<()> {
        let mut tables = self.tables.write();
        if !tables.credit_index.contains_key(&credit_id) {
            return Err(ServicingError::not_found(EntityKind::Credit, credit_id));
        }
        if tables.schedules.get(&credit_id).map_or(false, |rows| !rows.is_empty()) {
            return Err(ServicingError::domain_state(format!(
                "credit {} already has a payment schedule",
                credit_id
            )));
        }
        if let Some(foreign) = installments.iter().find(|i| i.credit_id != credit_id) {
            return Err(ServicingError::validation(format!(
                "installment {} belongs to credit {}",
                foreign.installment_id, foreign.credit_id
            )));
        }

        let mut rows = Vec::with_capacity(installments.len());
        for installment in installments {
            let row = tables.installments.len();
            tables.installment_index.insert(installment.installment_id, row);
            tables.installments.push(installment);
            rows.push(row);
        }
        tables.schedules.insert(credit_id, rows);
        Ok(())
    }

    fn installment(&self, installment_id: InstallmentId) -> Result<Option<Installment>> {
        let tables = self.tables.read();
        Ok(tables
            .installment_index
            .get(&installment_id)
            .map(|&row| tables.installments[row].clone()))
    }

    fn installments_by_credit(&self, credit_id: CreditId) -> Result<Vec<Installment>> {
        let tables = self.tables.read();
        let mut schedule: Vec<Installment> = tables
            .schedules
            .get(&credit_id)
            .map(|rows| rows.iter().map(|&row| tables.installments[row].clone()).collect())
            .unwrap_or_default();
        schedule.sort_by_key(|i| i.installment_number);
        Ok(schedule)
    }

    fn installments(&self) -> Result<Vec<Installment>> {
        Ok(self.tables.read().installments.clone())
    }

    fn insert_payment(&self, payment: Payment) -> Result<Payment> {
        let mut tables = self.tables.write();
        if !tables.installment_index.contains_key(&payment.installment_id) {
            return Err(ServicingError::not_found(EntityKind::Installment, payment.installment_id));
        }

        let row = tables.payments.len();
        tables.ledger.entry(payment.installment_id).or_default().push(row);
        tables.payments.push(payment.clone());
        Ok(payment)
    }

    fn payments_by_installment(&self, installment_id: InstallmentId) -> Result<Vec<Payment>> {
        let tables = self.tables.read();
        Ok(tables
            .ledger
            .get(&installment_id)
            .map(|rows| rows.iter().map(|&row| tables.payments[row].clone()).collect())
            .unwrap_or_default())
    }

    fn payments_by_credit(&self, credit_id: CreditId) -> Result<Vec<Payment>> {
        let tables = self.tables.read();
        Ok(tables
            .payments
            .iter()
            .filter(|p| p.credit_id == credit_id)
            .cloned()
            .collect())
    }
}

impl InMemoryStore {
    fn filter_credits(&self, predicate: impl Fn(&Credit) -> bool) -> Vec<Credit> {
        self.tables
            .read()
            .credits
            .iter()
            .filter(|c| predicate(c))
            .cloned()
            .collect()
    }
}
