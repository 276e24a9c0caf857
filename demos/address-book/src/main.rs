use tracing::info;
use tracing_subscriber::EnvFilter;
use wire::Message;

#[allow(dead_code)]
mod squareup;

use squareup::person::{PhoneNumber, PhoneType};
use squareup::{AddressBook, Person};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Build a Person through the generated builder
    let person = Person::builder()
        .name("John Doe")
        .id(12345)
        .email("john@example.com")
        .phones(vec![
            PhoneNumber::builder()
                .number("555-4321")
                .r#type(PhoneType::Mobile)
                .build()?,
            PhoneNumber::builder().number("555-1234").build()?,
        ])
        .lucky_numbers(vec![7, -3, 42])
        .build()?;

    let book = AddressBook::builder().people(vec![person.clone()]).build()?;

    let bytes = book.encode();
    info!(len = bytes.len(), "encoded address book");

    let decoded = AddressBook::decode(&bytes)?;
    assert_eq!(decoded, book);
    assert_eq!(decoded.hash_code(), book.hash_code());

    for entry in decoded.people() {
        println!("Person ID: {}", entry.id().unwrap_or(Person::DEFAULT_ID));
        println!("Person name: {}", entry.name().unwrap_or(Person::DEFAULT_NAME));
        for phone in entry.phones() {
            let phone_type = phone.r#type().unwrap_or(PhoneNumber::DEFAULT_TYPE);
            println!("  {} ({})", phone.number().unwrap_or_default(), phone_type.name());
        }
    }

    // Missing required fields are reported together
    if let Err(err) = Person::builder().email("nobody@example.com").build() {
        println!("Rejected: {err}");
    }

    // Copy, modify, rebuild: the original is untouched
    let renamed = person.to_builder().name("Johnny Doe").build()?;
    assert_ne!(renamed, person);
    assert_eq!(person.name(), Some("John Doe"));

    println!("Owner option: {:?}", AddressBook::MESSAGE_OPTIONS);
    println!("Successfully round-tripped {} bytes with Wire!", bytes.len());
    Ok(())
}
