use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderValue;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use scraper::{Html, Selector};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::data_models::{AuthOutcome, SearchQuery, SearchResponse};
use crate::forms::{LoginForm, RegistrationForm};

pub const SEARCH_PATH: &str = "api/search";
pub const LOGIN_PATH: &str = "api/login";
pub const LOGOUT_PATH: &str = "api/logout";
pub const REGISTER_PATH: &str = "api/register";

pub const CSRF_HEADER: &str = "X-CSRF-TOKEN";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid backend url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned status {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Supplies the anti-forgery token, if the page has one. Read once per
/// request; `None` means the request goes out without it.
pub trait TokenSource: Send + Sync {
    fn csrf_token(&self) -> Option<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoToken;

impl TokenSource for NoToken {
    fn csrf_token(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl TokenSource for StaticToken {
    fn csrf_token(&self) -> Option<String> {
        Some(self.0.clone()).filter(|t| !t.is_empty())
    }
}

/// Reads `<meta name="csrf-token" content="...">` out of a rendered page.
#[derive(Debug, Clone)]
pub struct MetaTagToken {
    html: String,
}

impl MetaTagToken {
    pub fn new(html: impl Into<String>) -> MetaTagToken {
        MetaTagToken { html: html.into() }
    }
}

impl TokenSource for MetaTagToken {
    fn csrf_token(&self) -> Option<String> {
        let selector = Selector::parse(r#"meta[name="csrf-token"]"#).ok()?;
        let document = Html::parse_document(&self.html);
        document
            .select(&selector)
            .next()
            .and_then(|meta| meta.value().attr("content"))
            .map(str::to_string)
            .filter(|t| !t.is_empty())
    }
}

/// Anything that can answer a [`SearchQuery`]. Implementations never fail;
/// problems come back as an empty response.
pub trait SearchTransport {
    fn send(&self, query: &SearchQuery) -> impl Future<Output = SearchResponse>;
}

impl<T: SearchTransport + ?Sized> SearchTransport for &T {
    fn send(&self, query: &SearchQuery) -> impl Future<Output = SearchResponse> {
        (**self).send(query)
    }
}

pub struct ApiClientBuilder {
    base_url: String,
    tokens: Arc<dyn TokenSource>,
    timeout: Duration,
    use_cookies: bool,
}

impl ApiClientBuilder {
    pub fn token_source(mut self, tokens: impl TokenSource + 'static) -> Self {
        self.tokens = Arc::new(tokens);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Keep session cookies between requests.
    pub fn cookies(mut self, enabled: bool) -> Self {
        self.use_cookies = enabled;
        self
    }

    pub fn build(self) -> Result<ApiClient, ClientError> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw).map_err(|e| ClientError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                url: self.base_url,
                reason: "not a base url".to_string(),
            });
        }

        let http = Client::builder()
            .timeout(self.timeout)
            .cookie_store(self.use_cookies)
            .build()?;

        Ok(ApiClient {
            http,
            base_url,
            tokens: self.tokens,
        })
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    tokens: Arc<dyn TokenSource>,
}

impl ApiClient {
    pub fn builder(base_url: &str) -> ApiClientBuilder {
        ApiClientBuilder {
            base_url: base_url.to_string(),
            tokens: Arc::new(NoToken),
            timeout: Duration::from_secs(10),
            use_cookies: true,
        }
    }

    pub fn from_config(config: &Config) -> Result<ApiClient, ClientError> {
        let builder = ApiClient::builder(&config.backend_url)
            .timeout(config.request_timeout)
            .cookies(config.use_cookies);
        match &config.csrf_token {
            Some(token) => builder.token_source(StaticToken(token.clone())).build(),
            None => builder.build(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
                reason: e.to_string(),
            })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let Some(token) = self.tokens.csrf_token() else {
            debug!("no csrf token available, sending request without it");
            return request;
        };
        match HeaderValue::from_str(&token) {
            Ok(value) => request.header(CSRF_HEADER, value),
            Err(e) => {
                warn!("ignoring unusable csrf token: {e}");
                request
            }
        }
    }

    /// Searches the backend. Never fails: any problem is logged and an
    /// empty response is returned instead.
    pub async fn search(&self, query: &str, language: &str) -> SearchResponse {
        match self.try_search(query, language).await {
            Ok(response) => response,
            Err(e) => {
                warn!(%query, %language, "search failed, returning no results: {e}");
                SearchResponse::empty()
            }
        }
    }

    /// One GET to the search endpoint, with the failure kept.
    pub async fn try_search(
        &self,
        query: &str,
        language: &str,
    ) -> Result<SearchResponse, ClientError> {
        let url = self.endpoint(SEARCH_PATH)?;
        let request = self
            .http
            .get(url)
            .query(&[("q", query), ("language", language)]);
        let response = self.authorize(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                message: None,
            });
        }

        let body = response.bytes().await?;
        let parsed: SearchResponse = serde_json::from_slice(&body)?;
        debug!(
            %query,
            results = parsed.search_results.len(),
            "search completed"
        );
        Ok(parsed)
    }

    pub async fn login(&self, form: &LoginForm) -> AuthOutcome {
        info!(username = form.username(), "logging in");
        self.auth_call(Method::POST, LOGIN_PATH, Some(form), "Login failed")
            .await
    }

    pub async fn register(&self, form: &RegistrationForm) -> AuthOutcome {
        info!(username = form.username(), "registering");
        self.auth_call(Method::POST, REGISTER_PATH, Some(form), "Registration failed")
            .await
    }

    pub async fn logout(&self) -> AuthOutcome {
        self.auth_call(Method::GET, LOGOUT_PATH, None::<&()>, "Logout failed")
            .await
    }

    async fn auth_call<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        fallback: &str,
    ) -> AuthOutcome {
        match self.try_auth_call(method, path, body).await {
            Ok(outcome) => outcome,
            Err(ClientError::Status {
                status,
                message: Some(message),
            }) => {
                warn!(%status, "{path} rejected: {message}");
                AuthOutcome::failed(&message)
            }
            Err(e) => {
                warn!("{path} failed: {e}");
                AuthOutcome::failed(fallback)
            }
        }
    }

    async fn try_auth_call<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<AuthOutcome, ClientError> {
        let url = self.endpoint(path)?;
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.authorize(request).send().await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            let message = serde_json::from_slice::<AuthOutcome>(&bytes)
                .ok()
                .and_then(|o| o.error);
            return Err(ClientError::Status { status, message });
        }

        let mut outcome: AuthOutcome = if bytes.is_empty() {
            AuthOutcome::default()
        } else {
            serde_json::from_slice(&bytes)?
        };
        outcome.success = true;
        outcome.error = None;
        Ok(outcome)
    }
}

impl SearchTransport for ApiClient {
    fn send(&self, query: &SearchQuery) -> impl Future<Output = SearchResponse> {
        self.search(query.text(), query.language())
    }
}
