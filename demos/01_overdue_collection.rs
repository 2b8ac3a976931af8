/// overdue collection - controlled time, late installments and overdue interest
use emobility_credit_servicing::{
    CreditServicer, CreditTerms, DocumentType, InMemoryStore, Money, NewClient, NewCredit,
    NewPayment, PaymentMethod, ProductType, Rate, SafeTimeProvider, ServicingConfig, TimeSource,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== overdue collection example ===\n");

    // create controlled time
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();

    let store = InMemoryStore::new();
    let mut servicer = CreditServicer::new(&store, ServicingConfig::default(), &time)?;

    let client = servicer.register_client(NewClient {
        document_type: DocumentType::CE,
        document_number: "E-4471".to_string(),
        name: "Cliente Moto".to_string(),
        city: Some("Cali".to_string()),
    })?;

    let credit = servicer.originate_credit(NewCredit {
        client_id: client.client_id,
        terms: CreditTerms {
            product: ProductType::EMoped,
            principal: Money::from_major(1_000_000),
            installment_count: 10,
            annual_rate: Rate::from_decimal(dec!(0.32)),
            disbursement_date: NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?,
            first_payment_date: NaiveDate::from_ymd_opt(2024, 1, 31).ok_or("bad date")?,
        },
    })?;
    println!("credit {} originated", credit.credit_id);

    // partial payment on the first installment
    let first = servicer.credit_schedule(credit.credit_id)?.installments[0].clone();
    servicer.record_payment(NewPayment {
        installment_id: first.installment_id,
        amount: Money::from_major(40_000),
        method: PaymentMethod::Cash,
        paid_at: time.now(),
    })?;

    // move ten days past the first due date
    controller.advance(Duration::days(40));
    println!("today: {}", servicer.today());

    for position in servicer.overdue_installments(Some(client.client_id))? {
        let interest = servicer.overdue_interest(position.installment.installment_id, None)?;
        println!(
            "installment {} is {} days late: pending {}, interest {}, total {}",
            interest.installment_number,
            interest.days_overdue,
            interest.pending_balance,
            interest.overdue_interest,
            interest.total_with_overdue
        );
    }

    let standing = servicer.client_payment_standing(client.client_id)?;
    println!("\nstanding: {:?}", standing.standing);

    let timeline = servicer.client_schedule_timeline(client.client_id)?;
    println!("paid so far: {}%", timeline.summary.payment_percentage.round_dp(2));

    println!("\nclients with overdue installments:");
    for late in servicer.clients_with_overdue()? {
        println!("  {} ({})", late.name, late.full_document());
    }

    Ok(())
}
