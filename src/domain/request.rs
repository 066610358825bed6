use crate::domain::validation::{SenderKind, ValidationError};
use crate::domain::value::{Msisdn, Route};

pub const SEND_SMS_MAX_DESTINATIONS: usize = 100;
pub const SENDER_MAX_NUMERIC_LEN: usize = 14;
pub const SENDER_MAX_ALPHANUMERIC_LEN: usize = 11;
pub const BODY_MAX_LEN: usize = 160;
pub const BODY_MAX_LONG_LEN: usize = 612;

const SENDER_FIELD: &str = "SENDER";
const SERVICE_FIELD: &str = "SERVICE";
const BODY_FIELD: &str = "BODY";
const REFERENCE_FIELD: &str = "REFERENCE";
const RAW_ENCODING_FIELD: &str = "RAWENCODING";
const UNICODE_FIELD: &str = "UNICODE";
const ALLOW_LONG_FIELD: &str = "ALLOWLONG";

/// Ordered protocol fields for one gateway call.
///
/// Insertion order is the wire order. A `FieldMap` can only be obtained from
/// [`SmsRequest::validate`] (or built internally by the client), so a map that failed
/// validation is never observable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    fields: Vec<(&'static str, String)>,
    raw_encoding: bool,
}

impl FieldMap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, key: &'static str, value: impl Into<String>) {
        self.fields.push((key, value.into()));
    }

    /// Append all fields of `other`, keeping its raw-encoding marker.
    pub(crate) fn extend(&mut self, other: FieldMap) {
        self.raw_encoding |= other.raw_encoding;
        self.fields.extend(other.fields);
    }

    /// Value of the first field named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(k, _)| *k)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether the POST body must be sent as UTF-8 instead of ISO-8859-1.
    pub fn uses_raw_encoding(&self) -> bool {
        self.raw_encoding
    }
}

/// An SMS send request as supplied by the caller.
///
/// Fields are kept raw; [`SmsRequest::validate`] checks them all before anything is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmsRequest {
    /// 1 to 100 MSISDN-numeric destinations (international format without `00` or `+`).
    pub destinations: Vec<String>,
    /// Numeric (max 14) or alphanumeric (max 11) originator, counted in `char`s.
    pub sender: String,
    /// Message text: max 160 characters, or 612 with `allow_long`.
    ///
    /// Length is counted in `char`s (Unicode scalar values), not UTF-16 code units, so a
    /// character outside the Basic Multilingual Plane (most emoji) counts once.
    pub body: String,
    /// Let the gateway split the body into concatenated segments.
    pub allow_long: bool,
    pub enable_unicode: bool,
    pub enable_raw_encoding: bool,
    /// Reference for delivery reports.
    pub reference: Option<String>,
    /// Tag used to filter statistics.
    pub service: Option<String>,
    pub route: Route,
}

impl SmsRequest {
    /// Request with the given destinations, sender and body; everything else defaulted.
    pub fn new(
        destinations: impl IntoIterator<Item = impl Into<String>>,
        sender: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            destinations: destinations.into_iter().map(Into::into).collect(),
            sender: sender.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    /// Check every rule and convert the request into protocol fields.
    ///
    /// Rules are applied in order and the first failure is returned:
    /// destinations, sender, body length. The route is passed through unchecked.
    pub fn validate(&self) -> Result<FieldMap, ValidationError> {
        let destination = validate_destinations(&self.destinations)?;
        validate_sender(&self.sender)?;
        validate_body(&self.body, self.allow_long)?;

        let mut fields = FieldMap::new();
        fields.push(Msisdn::FIELD, destination);
        fields.push(SENDER_FIELD, self.sender.as_str());
        if let Some(service) = non_empty(self.service.as_deref()) {
            fields.push(SERVICE_FIELD, service);
        }
        fields.push(Route::FIELD, self.route.as_str());
        fields.push(BODY_FIELD, self.body.as_str());
        if let Some(reference) = non_empty(self.reference.as_deref()) {
            fields.push(REFERENCE_FIELD, reference);
        }
        if self.enable_unicode || self.enable_raw_encoding {
            fields.push(RAW_ENCODING_FIELD, "1");
            fields.raw_encoding = true;
        }
        if self.enable_unicode {
            fields.push(UNICODE_FIELD, "1");
        }
        fields.push(ALLOW_LONG_FIELD, if self.allow_long { "1" } else { "0" });

        Ok(fields)
    }
}

fn validate_destinations(destinations: &[String]) -> Result<String, ValidationError> {
    if destinations.is_empty() || destinations.len() > SEND_SMS_MAX_DESTINATIONS {
        return Err(ValidationError::DestinationCount {
            max: SEND_SMS_MAX_DESTINATIONS,
            actual: destinations.len(),
        });
    }
    if let Some(bad) = destinations.iter().find(|d| !Msisdn::is_compliant(d)) {
        return Err(ValidationError::InvalidMsisdn { input: bad.clone() });
    }
    Ok(destinations.join(","))
}

fn validate_sender(sender: &str) -> Result<(), ValidationError> {
    if sender.is_empty() {
        return Err(ValidationError::Empty {
            field: SENDER_FIELD,
        });
    }

    let (kind, max) = if sender.bytes().all(|b| b.is_ascii_digit()) {
        (SenderKind::Numeric, SENDER_MAX_NUMERIC_LEN)
    } else {
        (SenderKind::Alphanumeric, SENDER_MAX_ALPHANUMERIC_LEN)
    };
    let actual = sender.chars().count();
    if actual > max {
        return Err(ValidationError::SenderTooLong { kind, max, actual });
    }
    Ok(())
}

fn validate_body(body: &str, allow_long: bool) -> Result<(), ValidationError> {
    if body.is_empty() {
        return Err(ValidationError::Empty { field: BODY_FIELD });
    }

    let max = if allow_long {
        BODY_MAX_LONG_LEN
    } else {
        BODY_MAX_LEN
    };
    let actual = body.chars().count();
    if actual > max {
        return Err(ValidationError::BodyTooLong {
            allow_long,
            max,
            actual,
        });
    }
    Ok(())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
