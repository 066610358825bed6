//! Typed Rust client for the Spryng HTTP SMS gateway.
//!
//! The crate is split into a domain layer of strong types and request validation, a
//! transport layer for the gateway's wire-format quirks (its own percent-encoding and
//! ISO-8859-1 bodies), and a small client layer orchestrating requests.
//!
//! ```rust,no_run
//! use spryng::{Route, SmsRequest, SpryngClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), spryng::SpryngError> {
//!     let client = SpryngClient::with_password("username", "password")?;
//!     println!("credits: {}", client.credit_amount().await?);
//!
//!     let request = SmsRequest {
//!         route: Route::ECONOMY,
//!         ..SmsRequest::new(["31612345678"], "Spryng", "hello")
//!     };
//!     client.send_sms(&request).await?;
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{
    AuthMode, BlockingClient, Credentials, SpryngClient, SpryngClientBuilder, SpryngError,
};
pub use domain::{
    ApiKey, FieldMap, Msisdn, Password, Route, SenderKind, SmsRequest, StatusCode, Username,
    ValidationError,
};
pub use transport::custom_url_encode;
