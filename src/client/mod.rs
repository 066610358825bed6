//! Client layer: orchestrates transport calls and maps transport ↔ domain.

mod blocking;

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::domain::{
    ApiKey, FieldMap, Password, SmsRequest, StatusCode, Username, ValidationError,
};

pub use blocking::BlockingClient;

const DEFAULT_BASE_URL: &str = "https://api.spryngsms.com/api/";
const CHECK_PATH: &str = "check.php";
const SEND_PATH: &str = "send.php";

const OPERATION_FIELD: &str = "OPERATION";
const SEND_OPERATION: &str = "send";

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    /// POST `body` to `path` resolved against `base_url`.
    fn post<'a>(
        &'a self,
        base_url: &'a str,
        path: &'a str,
        body: Vec<u8>,
        content_type: &'static str,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post<'a>(
        &'a self,
        base_url: &'a str,
        path: &'a str,
        body: Vec<u8>,
        content_type: &'static str,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let url = Url::parse(base_url)?.join(path)?;
            let response = self
                .client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(body)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

/// Which secret accompanies the username.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Password,
    ApiKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Authentication credentials for Spryng API calls.
///
/// Use [`Credentials::password`] for a username/password pair, or [`Credentials::api_key`]
/// if you authenticate with an API key (sent as `SECRET`).
pub enum Credentials {
    Password { username: Username, password: Password },
    ApiKey { username: Username, key: ApiKey },
}

impl Credentials {
    /// Validate `username` (2..=32 chars) and, in [`AuthMode::Password`], `secret`
    /// (6..=32 chars). API keys are not checked.
    pub fn new(
        username: impl Into<String>,
        secret: impl Into<String>,
        mode: AuthMode,
    ) -> Result<Self, ValidationError> {
        let username = Username::new(username)?;
        Ok(match mode {
            AuthMode::Password => Self::Password {
                username,
                password: Password::new(secret)?,
            },
            AuthMode::ApiKey => Self::ApiKey {
                username,
                key: ApiKey::new(secret),
            },
        })
    }

    pub fn password(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(username, password, AuthMode::Password)
    }

    pub fn api_key(
        username: impl Into<String>,
        key: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(username, key, AuthMode::ApiKey)
    }

    pub fn username(&self) -> &Username {
        match self {
            Self::Password { username, .. } | Self::ApiKey { username, .. } => username,
        }
    }

    pub fn mode(&self) -> AuthMode {
        match self {
            Self::Password { .. } => AuthMode::Password,
            Self::ApiKey { .. } => AuthMode::ApiKey,
        }
    }

    fn push_form_fields(&self, fields: &mut FieldMap) {
        match self {
            Self::Password { username, password } => {
                fields.push(Username::FIELD, username.as_str());
                fields.push(Password::FIELD, password.as_str());
            }
            Self::ApiKey { username, key } => {
                fields.push(Username::FIELD, username.as_str());
                fields.push(ApiKey::FIELD, key.as_str());
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`SpryngClient`] and [`BlockingClient`].
pub enum SpryngError {
    /// Credentials or client settings were rejected at construction.
    #[error("configuration error: {0}")]
    Configuration(#[source] ValidationError),

    /// The SMS request broke a validation rule; nothing was sent.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The gateway answered with a non-success status code.
    #[error("gateway error {status_code}: {message}")]
    Gateway {
        status_code: StatusCode,
        message: &'static str,
    },

    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status code returned by the server.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// Response body is not the expected number.
    #[error("parse error: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),

    /// The blocking wrapper could not start a runtime.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl SpryngError {
    fn gateway(status_code: StatusCode) -> Self {
        Self::Gateway {
            status_code,
            message: status_code.message(),
        }
    }

    /// Gateway status code, if this is a [`SpryngError::Gateway`].
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Gateway { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
/// Builder for [`SpryngClient`].
///
/// Use this when you need to customize the base URL, timeout, or user-agent.
pub struct SpryngClientBuilder {
    credentials: Credentials,
    base_url: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl SpryngClientBuilder {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: None,
            user_agent: None,
        }
    }

    /// Override the base URL that `check.php` and `send.php` are resolved against.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`SpryngClient`].
    ///
    /// A missing trailing `/` is added to the base URL so the endpoint paths are appended
    /// rather than replacing its last segment.
    pub fn build(self) -> Result<SpryngClient, SpryngError> {
        let mut base_url = self.base_url;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        if Url::parse(&base_url).is_err() {
            return Err(SpryngError::Configuration(ValidationError::InvalidUrl {
                input: base_url,
            }));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| SpryngError::Transport(Box::new(err)))?;

        Ok(SpryngClient {
            credentials: self.credentials,
            base_url,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// High-level Spryng client.
///
/// Orchestrates request validation, body encoding, and response parsing. By default it
/// talks to `https://api.spryngsms.com/api/`. The client holds no per-call state and can
/// be shared between tasks.
pub struct SpryngClient {
    credentials: Credentials,
    base_url: String,
    http: Arc<dyn HttpTransport>,
}

impl SpryngClient {
    /// Create a client using the default base URL.
    ///
    /// For more customization, use [`SpryngClient::builder`].
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_owned(),
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
        }
    }

    /// Create a client authenticating with a username and password.
    pub fn with_password(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, SpryngError> {
        Credentials::password(username, password)
            .map(Self::new)
            .map_err(SpryngError::Configuration)
    }

    /// Create a client authenticating with a username and API key.
    pub fn with_api_key(
        username: impl Into<String>,
        key: impl Into<String>,
    ) -> Result<Self, SpryngError> {
        Credentials::api_key(username, key)
            .map(Self::new)
            .map_err(SpryngError::Configuration)
    }

    /// Start building a client with custom settings.
    pub fn builder(credentials: Credentials) -> SpryngClientBuilder {
        SpryngClientBuilder::new(credentials)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Synchronous view of this client for non-async callers.
    pub fn blocking(&self) -> BlockingClient<'_> {
        BlockingClient::new(self)
    }

    /// Remaining credits of the authenticated account.
    ///
    /// Errors:
    /// - [`SpryngError::Gateway`] with code `-1` when the gateway rejects the credentials,
    /// - [`SpryngError::Parse`] when the body is not a finite decimal number,
    /// - [`SpryngError::HttpStatus`] for any non-2xx response, even one carrying a numeric
    ///   body; the body is only parsed on success.
    pub async fn credit_amount(&self) -> Result<f64, SpryngError> {
        let mut fields = FieldMap::new();
        self.credentials.push_form_fields(&mut fields);

        let body = self.post(CHECK_PATH, &fields).await?;
        let credits = crate::transport::decode_credit_response(&body)
            .map_err(|err| SpryngError::Parse(Box::new(err)))?;

        if credits == f64::from(StatusCode::CREDIT_AUTH_FAILURE.as_i32()) {
            tracing::warn!(
                username = self.credentials.username().as_str(),
                "credit check rejected by gateway"
            );
            return Err(SpryngError::gateway(StatusCode::CREDIT_AUTH_FAILURE));
        }

        Ok(credits)
    }

    /// Validate and send an SMS.
    ///
    /// Errors:
    /// - [`SpryngError::Validation`] for invalid requests (nothing is sent),
    /// - [`SpryngError::Gateway`] when the gateway answers with any code other than `1`,
    /// - [`SpryngError::Parse`] when the body is not an integer,
    /// - [`SpryngError::HttpStatus`] for any non-2xx response, even one carrying a numeric
    ///   vendor code; the body is only parsed on success.
    pub async fn send_sms(&self, request: &SmsRequest) -> Result<(), SpryngError> {
        let request_fields = request.validate()?;

        let mut fields = FieldMap::new();
        fields.push(OPERATION_FIELD, SEND_OPERATION);
        self.credentials.push_form_fields(&mut fields);
        fields.extend(request_fields);

        let body = self.post(SEND_PATH, &fields).await?;
        let status_code = crate::transport::decode_send_response(&body)
            .map_err(|err| SpryngError::Parse(Box::new(err)))?;

        if status_code != StatusCode::ACCEPTED {
            tracing::warn!(
                status_code = status_code.as_i32(),
                message = status_code.message(),
                "SMS rejected by gateway"
            );
            return Err(SpryngError::gateway(status_code));
        }

        tracing::debug!(
            destinations = request.destinations.len(),
            "SMS accepted by gateway"
        );
        Ok(())
    }

    async fn post(&self, path: &'static str, fields: &FieldMap) -> Result<String, SpryngError> {
        let (body, charset) = crate::transport::encode_form_body(fields);
        tracing::debug!(
            path,
            fields = fields.len(),
            charset = ?charset,
            "posting to Spryng gateway"
        );

        let response = self
            .http
            .post(&self.base_url, path, body, charset.content_type())
            .await
            .map_err(SpryngError::Transport)?;

        if !(200..=299).contains(&response.status) {
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            return Err(SpryngError::HttpStatus {
                status: response.status,
                body,
            });
        }

        Ok(response.body)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use crate::domain::Route;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) struct RecordedRequest {
        pub(crate) base_url: String,
        pub(crate) path: String,
        pub(crate) body: Vec<u8>,
        pub(crate) content_type: &'static str,
    }

    #[derive(Debug, Clone)]
    pub(crate) struct FakeTransport {
        state: Arc<Mutex<FakeTransportState>>,
    }

    #[derive(Debug)]
    struct FakeTransportState {
        requests: Vec<RecordedRequest>,
        response: Result<(u16, String), String>,
    }

    impl FakeTransport {
        pub(crate) fn new(response_status: u16, response_body: impl Into<String>) -> Self {
            Self::with_response(Ok((response_status, response_body.into())))
        }

        pub(crate) fn failing(message: impl Into<String>) -> Self {
            Self::with_response(Err(message.into()))
        }

        fn with_response(response: Result<(u16, String), String>) -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeTransportState {
                    requests: Vec::new(),
                    response,
                })),
            }
        }

        pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
            self.state.lock().unwrap().requests.clone()
        }

        pub(crate) fn last_request(&self) -> RecordedRequest {
            self.requests().pop().expect("no request was made")
        }
    }

    impl HttpTransport for FakeTransport {
        fn post<'a>(
            &'a self,
            base_url: &'a str,
            path: &'a str,
            body: Vec<u8>,
            content_type: &'static str,
        ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
            Box::pin(async move {
                let response = {
                    let mut state = self.state.lock().unwrap();
                    state.requests.push(RecordedRequest {
                        base_url: base_url.to_owned(),
                        path: path.to_owned(),
                        body,
                        content_type,
                    });
                    state.response.clone()
                };
                match response {
                    Ok((status, body)) => Ok(HttpResponse { status, body }),
                    Err(message) => Err(Box::<dyn StdError + Send + Sync>::from(message)),
                }
            })
        }
    }

    pub(crate) fn make_client(credentials: Credentials, transport: FakeTransport) -> SpryngClient {
        SpryngClient {
            credentials,
            base_url: "https://example.invalid/api/".to_owned(),
            http: Arc::new(transport),
        }
    }

    pub(crate) fn password_credentials() -> Credentials {
        Credentials::password("user", "secret1").unwrap()
    }

    pub(crate) fn sms_request() -> SmsRequest {
        SmsRequest::new(["31610831401"], "Spryng", "hello world")
    }

    fn body_text(request: &RecordedRequest) -> String {
        String::from_utf8(request.body.clone()).unwrap()
    }

    #[tokio::test]
    async fn credit_amount_posts_password_auth_to_check_endpoint() {
        let transport = FakeTransport::new(200, "1234.50");
        let client = make_client(password_credentials(), transport.clone());

        let credits = client.credit_amount().await.unwrap();
        assert_eq!(credits, 1234.5);

        let request = transport.last_request();
        assert_eq!(request.base_url, "https://example.invalid/api/");
        assert_eq!(request.path, "check.php");
        assert_eq!(body_text(&request), "USERNAME=user&PASSWORD=secret1");
        assert_eq!(
            request.content_type,
            "application/x-www-form-urlencoded; charset=ISO-8859-1"
        );
    }

    #[tokio::test]
    async fn credit_amount_uses_secret_field_for_api_key() {
        let transport = FakeTransport::new(200, "10");
        let client = make_client(
            Credentials::api_key("user", "k&y").unwrap(),
            transport.clone(),
        );

        client.credit_amount().await.unwrap();
        assert_eq!(
            body_text(&transport.last_request()),
            "USERNAME=user&SECRET=k%26y"
        );
    }

    #[tokio::test]
    async fn credit_amount_minus_one_is_gateway_error() {
        let transport = FakeTransport::new(200, "-1");
        let client = make_client(password_credentials(), transport);

        let err = client.credit_amount().await.unwrap_err();
        match err {
            SpryngError::Gateway {
                status_code,
                message,
            } => {
                assert_eq!(status_code.as_i32(), -1);
                assert_eq!(message, "Credit check authentication failure");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn credit_amount_maps_non_numeric_body_to_parse_error() {
        let transport = FakeTransport::new(200, "Invalid request");
        let client = make_client(password_credentials(), transport);

        let err = client.credit_amount().await.unwrap_err();
        assert!(matches!(err, SpryngError::Parse(_)));
    }

    #[tokio::test]
    async fn send_sms_posts_operation_auth_and_request_fields() {
        let transport = FakeTransport::new(200, "1");
        let client = make_client(password_credentials(), transport.clone());

        let request = SmsRequest {
            reference: Some("order/42".to_owned()),
            route: Route::ECONOMY,
            ..sms_request()
        };
        client.send_sms(&request).await.unwrap();

        let recorded = transport.last_request();
        assert_eq!(recorded.path, "send.php");
        assert_eq!(
            body_text(&recorded),
            "OPERATION=send&USERNAME=user&PASSWORD=secret1&DESTINATION=31610831401\
             &SENDER=Spryng&ROUTE=ECONOMY&BODY=hello%20world&REFERENCE=order%2f42&ALLOWLONG=0"
        );
    }

    #[tokio::test]
    async fn send_sms_uses_utf8_for_unicode_requests() {
        let transport = FakeTransport::new(200, "1\n");
        let client = make_client(password_credentials(), transport.clone());

        let request = SmsRequest {
            body: "Привет".to_owned(),
            enable_unicode: true,
            ..sms_request()
        };
        client.send_sms(&request).await.unwrap();

        let recorded = transport.last_request();
        assert_eq!(
            recorded.content_type,
            "application/x-www-form-urlencoded; charset=utf-8"
        );
        assert!(body_text(&recorded).contains("&BODY=Привет&RAWENCODING=1&UNICODE=1&"));
    }

    #[tokio::test]
    async fn send_sms_maps_status_code_to_gateway_error() {
        let transport = FakeTransport::new(200, "203");
        let client = make_client(password_credentials(), transport);

        let err = client.send_sms(&sms_request()).await.unwrap_err();
        assert_eq!(err.status_code(), Some(StatusCode::new(203)));
        match err {
            SpryngError::Gateway { message, .. } => assert_eq!(message, "Insufficient credits"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_sms_unknown_code_uses_fallback_message() {
        let transport = FakeTransport::new(200, "999");
        let client = make_client(password_credentials(), transport);

        let err = client.send_sms(&sms_request()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "gateway error 999: Unknown Spryng error"
        );
    }

    #[tokio::test]
    async fn send_sms_rejects_invalid_request_without_network_call() {
        let transport = FakeTransport::new(200, "1");
        let client = make_client(password_credentials(), transport.clone());

        let request = SmsRequest {
            destinations: vec!["+31610831401".to_owned()],
            ..sms_request()
        };
        let err = client.send_sms(&request).await.unwrap_err();
        assert!(matches!(
            err,
            SpryngError::Validation(ValidationError::InvalidMsisdn { .. })
        ));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn send_sms_maps_non_integer_body_to_parse_error() {
        let transport = FakeTransport::new(200, "OK");
        let client = make_client(password_credentials(), transport);

        let err = client.send_sms(&sms_request()).await.unwrap_err();
        assert!(matches!(err, SpryngError::Parse(_)));
    }

    #[tokio::test]
    async fn send_sms_maps_non_success_http_status() {
        let transport = FakeTransport::new(500, "oops");
        let client = make_client(password_credentials(), transport);

        let err = client.send_sms(&sms_request()).await.unwrap_err();
        assert!(matches!(
            err,
            SpryngError::HttpStatus {
                status: 500,
                body: Some(_)
            }
        ));
    }

    #[tokio::test]
    async fn numeric_body_with_error_status_is_not_parsed() {
        let transport = FakeTransport::new(400, "100");
        let client = make_client(password_credentials(), transport);

        let err = client.send_sms(&sms_request()).await.unwrap_err();
        assert_eq!(err.status_code(), None);
        match err {
            SpryngError::HttpStatus { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body.as_deref(), Some("100"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn credit_amount_rejects_non_finite_body() {
        for body in ["NaN", "inf"] {
            let transport = FakeTransport::new(200, body);
            let client = make_client(password_credentials(), transport);

            let err = client.credit_amount().await.unwrap_err();
            assert!(matches!(err, SpryngError::Parse(_)), "{body}: {err:?}");
        }
    }

    #[tokio::test]
    async fn blank_http_error_body_maps_to_none() {
        let transport = FakeTransport::new(503, "   ");
        let client = make_client(password_credentials(), transport);

        let err = client.credit_amount().await.unwrap_err();
        assert!(matches!(
            err,
            SpryngError::HttpStatus {
                status: 503,
                body: None
            }
        ));
    }

    #[tokio::test]
    async fn transport_failures_are_surfaced_unchanged() {
        let transport = FakeTransport::failing("connection reset");
        let client = make_client(password_credentials(), transport);

        let err = client.send_sms(&sms_request()).await.unwrap_err();
        match err {
            SpryngError::Transport(source) => assert_eq!(source.to_string(), "connection reset"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn credentials_validate_lengths_per_mode() {
        assert!(Credentials::password("u", "secret1").is_err());
        assert!(Credentials::password("user", "short").is_err());
        assert!(Credentials::password("user", "p".repeat(33)).is_err());
        assert!(Credentials::api_key("u", "key").is_err());

        let key = Credentials::api_key("user", "").unwrap();
        assert_eq!(key.mode(), AuthMode::ApiKey);
        assert_eq!(key.username().as_str(), "user");

        let password = Credentials::new("user", "secret1", AuthMode::Password).unwrap();
        assert_eq!(password.mode(), AuthMode::Password);
    }

    #[test]
    fn constructors_report_configuration_errors() {
        assert!(matches!(
            SpryngClient::with_password("user", "short"),
            Err(SpryngError::Configuration(
                ValidationError::LengthOutOfRange {
                    field: "PASSWORD",
                    ..
                }
            ))
        ));
        assert!(matches!(
            SpryngClient::with_api_key("x", "key"),
            Err(SpryngError::Configuration(_))
        ));
        assert!(SpryngClient::with_api_key("user", "key").is_ok());
    }

    #[test]
    fn builder_normalizes_and_validates_base_url() {
        let client = SpryngClient::builder(password_credentials())
            .base_url("https://example.invalid/api")
            .timeout(Duration::from_secs(5))
            .user_agent("spryng-tests")
            .build()
            .unwrap();
        assert_eq!(client.base_url, "https://example.invalid/api/");

        let err = SpryngClient::builder(password_credentials())
            .base_url("not a url")
            .build()
            .err()
            .unwrap();
        assert!(matches!(
            err,
            SpryngError::Configuration(ValidationError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn default_client_targets_spryng_api() {
        let client = SpryngClient::new(password_credentials());
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }
}
