use std::fmt;

/// Whether a sender id is purely numeric or alphanumeric.
///
/// The gateway applies different maximum lengths to each class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SenderKind {
    Numeric,
    Alphanumeric,
}

impl fmt::Display for SenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => f.write_str("numeric"),
            Self::Alphanumeric => f.write_str("alphanumeric"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty {
        field: &'static str,
    },
    LengthOutOfRange {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },
    DestinationCount {
        max: usize,
        actual: usize,
    },
    InvalidMsisdn {
        input: String,
    },
    SenderTooLong {
        kind: SenderKind,
        max: usize,
        actual: usize,
    },
    BodyTooLong {
        allow_long: bool,
        max: usize,
        actual: usize,
    },
    UnknownRoute {
        input: String,
    },
    InvalidUrl {
        input: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::LengthOutOfRange {
                field,
                min,
                max,
                actual,
            } => write!(
                f,
                "{field} length out of range: {actual} (expected {min}..={max})"
            ),
            Self::DestinationCount { max, actual } => {
                write!(f, "destination count must be 1..={max}, got {actual}")
            }
            Self::InvalidMsisdn { input } => {
                write!(f, "destination is not MSISDN-numeric compliant: {input}")
            }
            Self::SenderTooLong { kind, max, actual } => {
                write!(f, "{kind} sender too long: {actual} (max {max})")
            }
            Self::BodyTooLong {
                allow_long,
                max,
                actual,
            } => {
                if *allow_long {
                    write!(f, "body too long: {actual} (max {max})")
                } else {
                    write!(
                        f,
                        "body too long: {actual} (max {max} without ALLOWLONG)"
                    )
                }
            }
            Self::UnknownRoute { input } => write!(f, "unknown route: {input}"),
            Self::InvalidUrl { input } => write!(f, "invalid URL: {input}"),
        }
    }
}

impl std::error::Error for ValidationError {}
