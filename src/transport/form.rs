use crate::domain::FieldMap;

/// Characters the gateway expects percent-encoded. Everything else, including non-ASCII,
/// is sent as-is.
const SPECIAL_CHARACTERS: &[char] = &[
    '%', '$', '&', '+', ',', '/', ':', ';', '=', '?', '@', ' ', '<', '>', '#', '{', '}', '|',
    '\\', '^', '~', '[', ']', '`',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Latin1,
    Utf8,
}

impl Charset {
    pub fn for_fields(fields: &FieldMap) -> Self {
        if fields.uses_raw_encoding() {
            Self::Utf8
        } else {
            Self::Latin1
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Latin1 => "application/x-www-form-urlencoded; charset=ISO-8859-1",
            Self::Utf8 => "application/x-www-form-urlencoded; charset=utf-8",
        }
    }

    /// Characters outside ISO-8859-1 are replaced with `?`.
    fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
        }
    }
}

/// Percent-encode only [`SPECIAL_CHARACTERS`], using lowercase hex.
///
/// Single pass over the input, so an existing `%` is escaped once and already
/// produced escapes are never touched again.
pub fn custom_url_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for c in value.chars() {
        if SPECIAL_CHARACTERS.contains(&c) {
            encoded.push_str(&format!("%{:02x}", u32::from(c)));
        } else {
            encoded.push(c);
        }
    }
    encoded
}

/// Serialize `fields` as `key=value&...` in insertion order.
pub fn encode_form_body(fields: &FieldMap) -> (Vec<u8>, Charset) {
    let charset = Charset::for_fields(fields);
    let body = fields
        .iter()
        .map(|(key, value)| format!("{key}={}", custom_url_encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    (charset.encode(&body), charset)
}

#[cfg(test)]
mod tests {
    use crate::domain::SmsRequest;

    use super::*;

    #[test]
    fn encodes_space_and_percent() {
        assert_eq!(custom_url_encode("a b%c"), "a%20b%25c");
    }

    #[test]
    fn encodes_every_special_character_in_lowercase_hex() {
        assert_eq!(
            custom_url_encode("%$&+,/:;=?@ <>#{}|\\^~[]`"),
            "%25%24%26%2b%2c%2f%3a%3b%3d%3f%40%20%3c%3e%23%7b%7d%7c%5c%5e%7e%5b%5d%60"
        );
    }

    #[test]
    fn existing_escapes_are_not_double_encoded() {
        assert_eq!(custom_url_encode("%20"), "%2520");
        assert_eq!(custom_url_encode("%2b+"), "%252b%2b");
    }

    #[test]
    fn leaves_other_characters_untouched() {
        assert_eq!(custom_url_encode("Hello-World_1.!*'()"), "Hello-World_1.!*'()");
        assert_eq!(custom_url_encode("café €"), "café%20€");
    }

    #[test]
    fn body_is_latin1_by_default() {
        let fields = SmsRequest::new(["31610831401"], "Spryng", "café €")
            .validate()
            .unwrap();
        let (body, charset) = encode_form_body(&fields);

        assert_eq!(charset, Charset::Latin1);
        assert_eq!(
            charset.content_type(),
            "application/x-www-form-urlencoded; charset=ISO-8859-1"
        );

        let expected_prefix = b"DESTINATION=31610831401&SENDER=Spryng&ROUTE=BUSINESS&BODY=caf";
        assert!(body.starts_with(expected_prefix));
        let rest = &body[expected_prefix.len()..];
        assert_eq!(rest, b"\xe9%20?&ALLOWLONG=0");
    }

    #[test]
    fn body_is_utf8_when_raw_encoding_is_requested() {
        let fields = SmsRequest {
            enable_unicode: true,
            ..SmsRequest::new(["31610831401"], "Spryng", "café €")
        }
        .validate()
        .unwrap();
        let (body, charset) = encode_form_body(&fields);

        assert_eq!(charset, Charset::Utf8);
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "DESTINATION=31610831401&SENDER=Spryng&ROUTE=BUSINESS&BODY=café%20€\
             &RAWENCODING=1&UNICODE=1&ALLOWLONG=0"
        );
    }

    #[test]
    fn form_decoder_recovers_every_special_character() {
        let text = "100% sure: a+b=c & d/e? <f> #g {h} |i| \\j ^k ~l [m] `n` $o, @p; ünï";
        let fields = SmsRequest {
            enable_raw_encoding: true,
            ..SmsRequest::new(["31610831401"], "Spryng", text)
        }
        .validate()
        .unwrap();
        let (body, _) = encode_form_body(&fields);

        let decoded = url::form_urlencoded::parse(&body)
            .find(|(key, _)| key == "BODY")
            .map(|(_, value)| value.into_owned());
        assert_eq!(decoded.as_deref(), Some(text));
    }
}
