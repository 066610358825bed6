//! Transport layer: wire-format details (body serialization, response parsing).

mod form;
mod response;

pub use form::{custom_url_encode, encode_form_body};
pub use response::{decode_credit_response, decode_send_response};
