use std::num::{ParseFloatError, ParseIntError};

use crate::domain::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid credit amount {body:?}: {source}")]
    Credit {
        body: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("credit amount {body:?} is not a finite number")]
    NonFiniteCredit { body: String },

    #[error("invalid status code {body:?}: {source}")]
    Status {
        body: String,
        #[source]
        source: ParseIntError,
    },
}

/// Parse a `check.php` body: a decimal credit amount with a period separator.
///
/// `NaN` and the infinities parse as `f64` but are rejected like any other non-number.
pub fn decode_credit_response(body: &str) -> Result<f64, TransportError> {
    let credits = body
        .trim()
        .parse::<f64>()
        .map_err(|source| TransportError::Credit {
            body: body.to_owned(),
            source,
        })?;
    if !credits.is_finite() {
        return Err(TransportError::NonFiniteCredit {
            body: body.to_owned(),
        });
    }
    Ok(credits)
}

/// Parse a `send.php` body: a bare integer status code.
pub fn decode_send_response(body: &str) -> Result<StatusCode, TransportError> {
    body.trim()
        .parse::<i32>()
        .map(StatusCode::new)
        .map_err(|source| TransportError::Status {
            body: body.to_owned(),
            source,
        })
}
