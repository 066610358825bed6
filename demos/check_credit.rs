use std::io;

use spryng::{Credentials, SpryngClient};
use tracing_subscriber::EnvFilter;

fn required_env(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let username = required_env("SPRYNG_USERNAME")?;
    let credentials = match std::env::var("SPRYNG_API_KEY") {
        Ok(key) => Credentials::api_key(username, key)?,
        Err(_) => Credentials::password(username, required_env("SPRYNG_PASSWORD")?)?,
    };

    let client = SpryngClient::new(credentials);
    println!("Available credits: {}", client.credit_amount().await?);

    Ok(())
}
