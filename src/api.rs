// Raw HTTP client module: a small blocking client for Graph endpoints the
// typed client does not cover. Outgoing requests pass through a list of
// interceptors before they are sent; `BearerAuth` is the one this sample
// installs.

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::AUTHORIZATION;
use std::sync::Arc;

use crate::auth::TokenSource;

/// Default Graph endpoint, overridable with `GRAPH_BASE_URL`.
pub const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Hook that decorates a request right before it is sent.
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, request: RequestBuilder) -> Result<RequestBuilder>;
}

/// Attaches `Authorization: Bearer <token>` using a token source.
pub struct BearerAuth<S> {
    tokens: S,
}

impl<S: TokenSource> BearerAuth<S> {
    pub fn new(tokens: S) -> Self {
        BearerAuth { tokens }
    }
}

impl<S: TokenSource> RequestInterceptor for BearerAuth<S> {
    fn intercept(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self
            .tokens
            .access_token()
            .context("Failed to acquire access token")?;
        Ok(request.header(AUTHORIZATION, format!("Bearer {}", token)))
    }
}

/// Blocking client that runs every interceptor on each outgoing request.
#[derive(Clone)]
pub struct AuthenticatedClient {
    client: Client,
    base_url: String,
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl AuthenticatedClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(AuthenticatedClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            interceptors: Vec::new(),
        })
    }

    /// Create a client for `GRAPH_BASE_URL` or the public Graph v1.0 endpoint.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("GRAPH_BASE_URL").unwrap_or_else(|_| GRAPH_BASE_URL.into());
        Self::new(base_url)
    }

    /// Append an interceptor. Interceptors run in insertion order.
    pub fn with_interceptor<I: RequestInterceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Absolute URL for a path relative to the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    /// Run every interceptor over `request` without sending it.
    pub fn prepare(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        self.interceptors
            .iter()
            .try_fold(request, |req, interceptor| interceptor.intercept(req))
    }

    /// Intercept, send, and turn a non-success status into an error that
    /// carries the response body.
    pub fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = self.prepare(request)?;
        let res = request.send().context("Failed to send Graph request")?;
        let status = res.status();
        tracing::debug!(url = %res.url(), %status, "graph response");
        if !status.is_success() {
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!("Graph request failed: {} - {}", status, txt);
        }
        Ok(res)
    }
}
