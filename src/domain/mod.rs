//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod validation;
mod value;

pub use request::{
    BODY_MAX_LEN, BODY_MAX_LONG_LEN, FieldMap, SEND_SMS_MAX_DESTINATIONS,
    SENDER_MAX_ALPHANUMERIC_LEN, SENDER_MAX_NUMERIC_LEN, SmsRequest,
};
pub use validation::{SenderKind, ValidationError};
pub use value::{ApiKey, Msisdn, Password, Route, StatusCode, Username};
