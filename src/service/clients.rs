use tracing::{info, warn};

use crate::errors::{EntityKind, Result, ServicingError};
use crate::events::ServicingEvent;
use crate::model::{validate_document_number, Client, ClientUpdate, NewClient};
use crate::store::{ClientSearch, ServicingStore};
use crate::types::{ClientId, DocumentType};

use super::CreditServicer;

impl<'a, S: ServicingStore + ?Sized> CreditServicer<'a, S> {
    /// register a client. the document pair must not be registered yet
    pub fn register_client(&mut self, request: NewClient) -> Result<Client> {
        request.validate()?;

        if self
            .store
            .client_by_document(request.document_type, &request.document_number)?
            .is_some()
        {
            warn!(
                document_type = %request.document_type,
                document_number = request.document_number.trim(),
                "duplicate client registration rejected"
            );
            return Err(ServicingError::domain_state(format!(
                "a client with document {} {} already exists",
                request.document_type,
                request.document_number.trim()
            )));
        }

        let now = self.now();
        let client = self.store.insert_client(request.into_client(now))?;

        info!(client_id = %client.client_id, document = %client.full_document(), "client registered");
        self.events.emit(ServicingEvent::ClientRegistered {
            client_id: client.client_id,
            document_type: client.document_type,
            document_number: client.document_number.clone(),
            timestamp: now,
        });

        Ok(client)
    }

    /// change the name or city of a client
    pub fn update_client(&mut self, client_id: ClientId, update: ClientUpdate) -> Result<Client> {
        let mut client = self.require_client(client_id)?;
        update.apply(&mut client)?;
        let client = self.store.update_client(client)?;

        info!(client_id = %client_id, "client updated");
        self.events.emit(ServicingEvent::ClientUpdated {
            client_id,
            timestamp: self.now(),
        });

        Ok(client)
    }

    pub fn client(&self, client_id: ClientId) -> Result<Client> {
        self.require_client(client_id)
    }

    pub fn find_client_by_document(&self, document_type: DocumentType, document_number: &str) -> Result<Client> {
        if document_number.trim().is_empty() {
            return Err(ServicingError::validation("missing required filter parameter: document_number"));
        }
        validate_document_number(document_number)?;

        self.store
            .client_by_document(document_type, document_number)?
            .ok_or_else(|| {
                ServicingError::not_found(
                    EntityKind::Client,
                    format!("{} {}", document_type, document_number.trim()),
                )
            })
    }

    /// clients matching every given criterion, ordered by name
    pub fn search_clients(&self, criteria: &ClientSearch) -> Result<Vec<Client>> {
        self.store.search_clients(criteria)
    }

    /// clients with at least one installment overdue today
    pub fn clients_with_overdue(&self) -> Result<Vec<Client>> {
        let mut found = Vec::new();
        for client in self.store.clients()? {
            let installments = self.store.installments_by_client(client.client_id)?;
            if self.positions(&installments)?.iter().any(|p| p.is_overdue) {
                found.push(client);
            }
        }
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }
}
