use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{
    ClientId, CreditId, CreditStatus, DocumentType, InstallmentId, PaymentId, PaymentMethod,
    ProductType,
};

/// all events that can be emitted while servicing credits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServicingEvent {
    // client events
    ClientRegistered {
        client_id: ClientId,
        document_type: DocumentType,
        document_number: String,
        timestamp: DateTime<Utc>,
    },
    ClientUpdated {
        client_id: ClientId,
        timestamp: DateTime<Utc>,
    },

    // credit events
    CreditOriginated {
        credit_id: CreditId,
        client_id: ClientId,
        product: ProductType,
        principal: Money,
        installment_count: u32,
        timestamp: DateTime<Utc>,
    },
    ScheduleGenerated {
        credit_id: CreditId,
        installment_count: u32,
        installment_amount: Money,
        first_due_date: NaiveDate,
        last_due_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    CreditStatusChanged {
        credit_id: CreditId,
        old_status: CreditStatus,
        new_status: CreditStatus,
        timestamp: DateTime<Utc>,
    },

    // payment events
    PaymentRecorded {
        payment_id: PaymentId,
        installment_id: InstallmentId,
        credit_id: CreditId,
        amount: Money,
        method: PaymentMethod,
        amount_paid: Money,
        pending_balance: Money,
        timestamp: DateTime<Utc>,
    },
    OverpaymentAccepted {
        installment_id: InstallmentId,
        credit_id: CreditId,
        excess: Money,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<ServicingEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: ServicingEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<ServicingEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[ServicingEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
