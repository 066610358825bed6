use std::borrow::Cow;
use std::fmt;

use phonenumber::country;

use crate::domain::validation::ValidationError;

fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if !(min..=max).contains(&actual) {
        return Err(ValidationError::LengthOutOfRange {
            field,
            min,
            max,
            actual,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Spryng account username (`USERNAME`).
///
/// Invariant: `2..=32` characters.
pub struct Username(String);

impl Username {
    /// Form field name used by Spryng (`USERNAME`).
    pub const FIELD: &'static str = "USERNAME";

    pub const MIN_LEN: usize = 2;
    pub const MAX_LEN: usize = 32;

    /// Create a validated [`Username`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        check_length(Self::FIELD, &value, Self::MIN_LEN, Self::MAX_LEN)?;
        Ok(Self(value))
    }

    /// Borrow the username as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// Spryng account password (`PASSWORD`).
///
/// Invariant: `6..=32` characters. Whitespace is preserved. The value is redacted from
/// `Debug` output.
pub struct Password(String);

impl Password {
    /// Form field name used by Spryng (`PASSWORD`).
    pub const FIELD: &'static str = "PASSWORD";

    pub const MIN_LEN: usize = 6;
    pub const MAX_LEN: usize = 32;

    /// Create a validated [`Password`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        check_length(Self::FIELD, &value, Self::MIN_LEN, Self::MAX_LEN)?;
        Ok(Self(value))
    }

    /// Borrow the password as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// Spryng API key, sent as `SECRET`.
///
/// The key is opaque: no length or format check is applied.
pub struct ApiKey(String);

impl ApiKey {
    /// Form field name used by Spryng (`SECRET`).
    pub const FIELD: &'static str = "SECRET";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Destination number in MSISDN-numeric form (`DESTINATION`).
///
/// International format without a leading `00` or `+`: a digit `1-9` followed by
/// 3 to 14 more digits.
pub struct Msisdn(String);

impl Msisdn {
    /// Form field name used by Spryng (`DESTINATION`).
    pub const FIELD: &'static str = "DESTINATION";

    pub const MIN_LEN: usize = 4;
    pub const MAX_LEN: usize = 15;

    /// Create a validated [`Msisdn`]. The input is taken verbatim (no trimming).
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if !Self::is_compliant(&value) {
            return Err(ValidationError::InvalidMsisdn { input: value });
        }
        Ok(Self(value))
    }

    /// Parse human phone input (spaces, dashes, `+` prefix) into MSISDN form.
    ///
    /// `default_region` is used when the input does not contain an explicit country prefix.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let parsed = phonenumber::parse(default_region, raw).map_err(|_| {
            ValidationError::InvalidMsisdn {
                input: raw.to_owned(),
            }
        })?;
        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Self::new(e164.trim_start_matches('+'))
    }

    /// Returns `true` if `value` matches `^[1-9][0-9]{3,14}$`.
    pub fn is_compliant(value: &str) -> bool {
        let bytes = value.as_bytes();
        (Self::MIN_LEN..=Self::MAX_LEN).contains(&bytes.len())
            && matches!(bytes[0], b'1'..=b'9')
            && bytes[1..].iter().all(u8::is_ascii_digit)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Msisdn> for String {
    fn from(value: Msisdn) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Spryng delivery route (`ROUTE`).
///
/// The gateway knows `BUSINESS`, `ECONOMY` and the user-specific routes `0`..`9`.
/// Any other string is still accepted and passed through; the gateway answers unknown
/// routes with status 201.
pub struct Route(Cow<'static, str>);

impl Route {
    /// Form field name used by Spryng (`ROUTE`).
    pub const FIELD: &'static str = "ROUTE";

    pub const BUSINESS: Route = Route(Cow::Borrowed("BUSINESS"));
    pub const ECONOMY: Route = Route(Cow::Borrowed("ECONOMY"));

    const CUSTOM: [&'static str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

    /// Every route the gateway accepts.
    pub const KNOWN: [Route; 12] = [
        Self::BUSINESS,
        Self::ECONOMY,
        Route(Cow::Borrowed("0")),
        Route(Cow::Borrowed("1")),
        Route(Cow::Borrowed("2")),
        Route(Cow::Borrowed("3")),
        Route(Cow::Borrowed("4")),
        Route(Cow::Borrowed("5")),
        Route(Cow::Borrowed("6")),
        Route(Cow::Borrowed("7")),
        Route(Cow::Borrowed("8")),
        Route(Cow::Borrowed("9")),
    ];

    /// Create a route from an arbitrary string (no enumeration check).
    pub fn new(value: impl Into<String>) -> Self {
        Self(Cow::Owned(value.into()))
    }

    /// User-specific route `0..=9`.
    pub fn custom(index: u8) -> Result<Self, ValidationError> {
        Self::CUSTOM
            .get(usize::from(index))
            .copied()
            .map(|route| Self(Cow::Borrowed(route)))
            .ok_or_else(|| ValidationError::UnknownRoute {
                input: index.to_string(),
            })
    }

    /// Returns `true` if this is one of [`Route::KNOWN`].
    pub fn is_known(&self) -> bool {
        Self::KNOWN.iter().any(|known| known == self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::BUSINESS
    }
}

/// Human-readable messages for the gateway's numeric status codes, ordered by code.
static STATUS_MESSAGES: &[(i32, &str)] = &[
    (-1, "Credit check authentication failure"),
    (100, "Missing parameter"),
    (101, "Username too short"),
    (102, "Username too long"),
    (103, "Password too short"),
    (104, "Password too long"),
    (105, "Destination too short"),
    (106, "Destination too long"),
    (107, "Sender too long"),
    (108, "Sender too short"),
    (109, "Body too short"),
    (110, "Body too long"),
    (200, "Security error"),
    (201, "Unknown route"),
    (202, "Route access violation"),
    (203, "Insufficient credits"),
    (800, "Technical error"),
];

const UNKNOWN_STATUS_MESSAGE: &str = "Unknown Spryng error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Numeric status code returned by the gateway.
///
/// This value is preserved as-is even when the code is unknown to this crate.
pub struct StatusCode(i32);

impl StatusCode {
    /// `send.php` accepted the message.
    pub const ACCEPTED: StatusCode = StatusCode(1);
    /// `check.php` rejected the credentials.
    pub const CREDIT_AUTH_FAILURE: StatusCode = StatusCode(-1);

    pub fn new(code: i32) -> Self {
        Self(code)
    }

    pub fn as_i32(self) -> i32 {
        self.0
    }

    /// Message from the gateway's documented code table, or a generic fallback.
    pub fn message(self) -> &'static str {
        STATUS_MESSAGES
            .iter()
            .find(|(code, _)| *code == self.0)
            .map_or(UNKNOWN_STATUS_MESSAGE, |(_, message)| *message)
    }

    /// Returns `true` if the code is listed in the gateway's code table.
    pub fn is_known(self) -> bool {
        STATUS_MESSAGES.iter().any(|(code, _)| *code == self.0)
    }

    /// Returns `true` if the code points at rejected credentials.
    pub fn is_auth_error(self) -> bool {
        matches!(self.0, -1 | 101..=104 | 200)
    }

    /// Returns `true` if the gateway reported a transient technical failure.
    pub fn is_retryable(self) -> bool {
        self.0 == 800
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
