use std::io;

use spryng::{SmsRequest, SpryngClient};
use tracing_subscriber::EnvFilter;

fn required_env(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = SpryngClient::with_password(
        required_env("SPRYNG_USERNAME")?,
        required_env("SPRYNG_PASSWORD")?,
    )?;

    let destinations = required_env("SPRYNG_DESTINATION")?;
    let sender = required_env("SPRYNG_SENDER")?;
    let body = std::env::var("SPRYNG_BODY")
        .unwrap_or_else(|_| "Hello from the spryng demo.".to_owned());

    let request = SmsRequest::new(destinations.split(','), sender, body);

    // The blocking API needs no runtime of its own.
    let client = client.blocking();
    println!("Available credits: {}", client.credit_amount()?);
    client.send_sms(&request)?;
    println!("SMS has been sent.");

    Ok(())
}
