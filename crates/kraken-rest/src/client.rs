//! Request submission pipeline

use kraken_auth::{AuthError, Credentials};
use kraken_types::{ApiError, Location};
use serde::de::DeserializeOwned;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::{debug, info, instrument, warn};

use crate::error::{RestError, RestResult, StructureError};
use crate::hooks::{Hooks, RequestContext};
use crate::query::{build_query, build_url, expand_path, to_pairs, value_text};
use crate::request::{verify_structure, Request};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Transport};

/// Default API host
pub const DEFAULT_BASE_URL: &str = "https://api.kraken.com";

/// Default request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const DEFAULT_USER_AGENT: &str = concat!("kraken-rest/", env!("CARGO_PKG_VERSION"));

/// HTTP statuses treated as success
const SUCCESS_STATUSES: [u16; 4] = [200, 201, 202, 301];

/// Configuration for the REST client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Custom user agent
    pub user_agent: Option<String>,
    /// Credentials used by [`ApiClient::execute`]
    pub credentials: Option<Credentials>,
    /// Answer every request from its factory response
    pub use_mock: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            credentials: None,
            use_mock: false,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_mock(mut self, use_mock: bool) -> Self {
        self.use_mock = use_mock;
        self
    }
}

/// How the authentication headers get signed
enum Signing<'a> {
    /// Explicit key pair as passed to [`ApiClient::submit`]
    Secret { api_key: &'a str, secret: &'a str },
    /// Configured credentials
    Credentials(&'a Credentials),
    /// Nothing configured
    Unavailable,
}

impl Signing<'_> {
    fn sign(
        &self,
        path: &str,
        nonce: &str,
        body: &[(String, String)],
    ) -> RestResult<(String, String)> {
        match self {
            Self::Secret { api_key, secret } => Ok((
                api_key.to_string(),
                kraken_auth::sign(Some(*secret), path, nonce, body)?,
            )),
            Self::Credentials(creds) => Ok((
                creds.api_key().to_string(),
                creds.sign(path, nonce, body)?,
            )),
            Self::Unavailable => Err(AuthError::MissingSecret.into()),
        }
    }
}

/// Kraken REST API client
///
/// Turns [`Request`] models into HTTP calls: partitions fields by location,
/// injects the nonce, runs hooks, signs, dispatches and interprets the
/// response envelope.
///
/// # Example
///
/// ```
/// use kraken_rest::{ApiClient, ClientConfig};
/// use kraken_rest::endpoints::TickerShowRequest;
///
/// let client = ApiClient::with_config(ClientConfig::default().with_mock(true)).unwrap();
/// let request = TickerShowRequest::new().with_pair("XBTUSD").unwrap();
///
/// let result = client.execute(&request).unwrap();
/// assert!(result.get("XXBTZUSD").is_some());
/// ```
pub struct ApiClient {
    config: ClientConfig,
    transport: Box<dyn Transport>,
    hooks: Hooks,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("hooks", &self.hooks)
            .finish()
    }
}

impl ApiClient {
    /// Create a client with default configuration
    pub fn new() -> RestResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with credentials for private endpoints
    pub fn with_credentials(credentials: Credentials) -> RestResult<Self> {
        Self::with_config(ClientConfig::default().with_credentials(credentials))
    }

    /// Create a client over the blocking HTTP transport
    pub fn with_config(config: ClientConfig) -> RestResult<Self> {
        let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let transport = HttpTransport::new(config.timeout_secs, user_agent)
            .map_err(|e| RestError::Transport(e.to_string()))?;

        info!(base_url = %config.base_url, "Created Kraken REST client");
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client over a custom transport
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config,
            transport: Box::new(transport),
            hooks: Hooks::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Replace the hook registry
    pub fn set_hooks(&mut self, hooks: Hooks) {
        self.hooks = hooks;
    }

    /// Register a hook run before every request is signed and sent
    pub fn add_pre_request_hook<F>(&mut self, hook: F)
    where
        F: Fn(&RequestContext) + Send + Sync + 'static,
    {
        self.hooks.add_pre_request(hook);
    }

    /// Register a hook run with every response before it is interpreted
    pub fn add_post_request_hook<F>(&mut self, hook: F)
    where
        F: Fn(&HttpResponse, &RequestContext) + Send + Sync + 'static,
    {
        self.hooks.add_post_request(hook);
    }

    /// Full URL for a path and query
    pub fn url(&self, path: &str, query: &JsonMap<String, JsonValue>) -> String {
        build_url(&self.config.base_url, path, query)
    }

    /// Submit a request with an explicit nonce and key pair
    ///
    /// `secret_key` must be base64 with a length that is a multiple of 4.
    /// With `use_mock` the request's factory response is returned instead of
    /// performing network I/O.
    #[instrument(skip_all, fields(request = request.type_name()))]
    pub fn submit<R: Request + ?Sized>(
        &self,
        request: &R,
        nonce: &str,
        api_key: &str,
        secret_key: &str,
        use_mock: bool,
    ) -> RestResult<JsonValue> {
        if secret_key.len() % 4 != 0 {
            return Err(RestError::InvalidArgument(format!(
                "secret key length {} is not a multiple of 4",
                secret_key.len()
            )));
        }

        let signing = Signing::Secret {
            api_key,
            secret: secret_key,
        };
        self.dispatch(request, nonce, &signing, use_mock)
    }

    /// Submit a request with the configured credentials, a fresh nonce and
    /// the configured mock flag
    #[instrument(skip_all, fields(request = request.type_name()))]
    pub fn execute<R: Request + ?Sized>(&self, request: &R) -> RestResult<JsonValue> {
        let signing = match &self.config.credentials {
            Some(creds) => Signing::Credentials(creds),
            None => Signing::Unavailable,
        };
        let nonce = Credentials::generate_nonce();
        self.dispatch(request, &nonce, &signing, self.config.use_mock)
    }

    /// Execute and deserialize the result into `T`
    pub fn submit_as<T, R>(&self, request: &R) -> RestResult<T>
    where
        T: DeserializeOwned,
        R: Request + ?Sized,
    {
        let value = self.execute(request)?;
        Ok(serde_json::from_value(value)?)
    }

    fn dispatch<R: Request + ?Sized>(
        &self,
        request: &R,
        nonce: &str,
        signing: &Signing<'_>,
        use_mock: bool,
    ) -> RestResult<JsonValue> {
        verify_structure(request)?;

        let name = request.type_name();
        let method = request
            .method()
            .ok_or(StructureError::MethodNotImplemented(name))?;
        let template = request
            .path()
            .ok_or(StructureError::PathNotImplemented(name))?;

        let path = expand_path(template, &request.properties_in(Location::Path));
        let query = request.properties_in(Location::Query);
        let mut body = request.properties_in(Location::Body);
        let headers = to_pairs(&request.properties_in(Location::Header));
        let files: Vec<JsonValue> = request
            .properties_in(Location::Files)
            .into_iter()
            .map(|(_, v)| v)
            .collect();

        if !body.contains_key("nonce") {
            body.insert("nonce".to_string(), JsonValue::String(nonce.to_string()));
        }

        let mut ctx = RequestContext {
            method,
            path,
            body,
            query,
            headers,
            files,
            authenticate: request.authenticate(),
        };

        self.hooks.run_pre_request(&ctx);

        let already_keyed = ctx
            .headers
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case("api-key"));
        if ctx.authenticate && !already_keyed {
            let (api_key, signature) = signing.sign(&ctx.path, nonce, &to_pairs(&ctx.body))?;
            ctx.headers.push(("API-Key".to_string(), api_key));
            ctx.headers.push(("API-Sign".to_string(), signature));
        }

        let response = if use_mock {
            let payload = request
                .factory_response()
                .ok_or(StructureError::FactoryResponseNotImplemented(name))?;
            debug!(%method, path = %ctx.path, "Using mock factory response");
            HttpResponse::new(200, payload)
        } else {
            self.send(&ctx)?
        };

        debug!(%method, path = %ctx.path, status = response.status, "Request completed");
        self.hooks.run_post_request(&response, &ctx);

        interpret_response(&ctx, &response)
    }

    fn send(&self, ctx: &RequestContext) -> RestResult<HttpResponse> {
        let mut http = HttpRequest::new(ctx.method, self.url(&ctx.path, &ctx.query));
        http.headers = ctx.headers.clone();
        if ctx.method.carries_body() {
            http.body = Some(kraken_auth::encode_body(&to_pairs(&ctx.body))?);
        }

        match self.transport.send(&http) {
            Ok(response) => Ok(response),
            Err(err) => err.into_response().map_err(|err| {
                warn!(path = %ctx.path, error = %err, "Transport failed");
                RestError::Transport(err.to_string())
            }),
        }
    }
}

/// Interpret a raw response envelope
///
/// A non-empty `error` list is classified and returned as [`RestError::Api`].
/// Otherwise a success status yields `result` (or the whole body when there
/// is no `result` key), and any other status is a [`RestError::RequestFailed`].
/// A success status with a body that is not JSON is a [`RestError::Parse`].
pub fn interpret_response(ctx: &RequestContext, response: &HttpResponse) -> RestResult<JsonValue> {
    let success = SUCCESS_STATUSES.contains(&response.status);

    let parsed: JsonValue = match serde_json::from_str(&response.body) {
        Ok(parsed) => parsed,
        Err(err) if success => {
            warn!(path = %ctx.path, status = response.status, "Undecodable response body");
            return Err(RestError::Parse(format!(
                "{} {} returned {} with a body that is not JSON: {}",
                ctx.method, ctx.path, response.status, err
            )));
        }
        Err(_) => return Err(request_failed(ctx, response)),
    };

    if let Some(first) = parsed
        .get("error")
        .and_then(JsonValue::as_array)
        .and_then(|errors| errors.first())
    {
        let raw = value_text(first);
        let error = ApiError::classify(&raw);
        warn!(path = %ctx.path, error = %raw, kind = ?error.kind(), "Kraken API error");
        return Err(error.into());
    }

    if !success {
        return Err(request_failed(ctx, response));
    }

    match parsed {
        JsonValue::Object(mut envelope) if envelope.contains_key("result") => {
            Ok(envelope.remove("result").unwrap_or(JsonValue::Null))
        }
        other => Ok(other),
    }
}

fn request_failed(ctx: &RequestContext, response: &HttpResponse) -> RestError {
    RestError::RequestFailed {
        method: ctx.method.to_string(),
        path: ctx.path.clone(),
        status: response.status,
        headers: ctx
            .headers
            .iter()
            .filter(|(k, _)| !k.eq_ignore_ascii_case("api-sign"))
            .cloned()
            .collect(),
        query: build_query(&ctx.query),
        body: kraken_auth::encode_body(&to_pairs(&ctx.body)).unwrap_or_default(),
        response: response.body.clone(),
    }
}
