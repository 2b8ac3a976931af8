/// quick start - register a client, originate a credit and take a payment
use emobility_credit_servicing::{
    CreditServicer, CreditTerms, DocumentType, InMemoryStore, Money, NewClient, NewCredit,
    NewPayment, PaymentMethod, ProductType, Rate, SafeTimeProvider, ServicingConfig, TimeSource,
};
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let store = InMemoryStore::new();
    let time = SafeTimeProvider::new(TimeSource::System);
    let mut servicer = CreditServicer::new(&store, ServicingConfig::default(), &time)?;

    let client = servicer.register_client(NewClient {
        document_type: DocumentType::CC,
        document_number: "10000001".to_string(),
        name: "Cliente 1".to_string(),
        city: Some("Medellin".to_string()),
    })?;

    let today = Utc::now().date_naive();
    let credit = servicer.originate_credit(NewCredit {
        client_id: client.client_id,
        terms: CreditTerms {
            product: ProductType::EBike,
            principal: Money::from_major(3_000_000),
            installment_count: 12,
            annual_rate: Rate::from_decimal(dec!(0.28)),
            disbursement_date: today,
            first_payment_date: today + Duration::days(30),
        },
    })?;

    let schedule = servicer.credit_schedule(credit.credit_id)?;
    let first = &schedule.installments[0];

    servicer.record_payment(NewPayment {
        installment_id: first.installment_id,
        amount: Money::from_major(100_000),
        method: PaymentMethod::App,
        paid_at: Utc::now(),
    })?;

    // print current state
    println!("{}", servicer.credit_schedule(credit.credit_id)?.to_json_pretty()?);

    Ok(())
}
