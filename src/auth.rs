// Authentication module: a confidential-client token provider that uses the
// OAuth2 client-credentials grant against the Microsoft identity platform.
// Both client styles share one provider through the `TokenSource` trait.

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::AppSettings;

/// Scope requested for every Graph call made by this sample.
pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Tokens are refreshed this long before the server-side expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Anything able to hand out a bearer token for an outgoing request.
pub trait TokenSource: Send + Sync {
    fn access_token(&self) -> Result<String>;
}

impl<T: TokenSource + ?Sized> TokenSource for Arc<T> {
    fn access_token(&self) -> Result<String> {
        (**self).access_token()
    }
}

/// A bearer token together with the instant it stops being usable.
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    expires_at: Instant,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>, expires_in: Duration, issued_at: Instant) -> Self {
        AccessToken {
            secret: secret.into(),
            expires_at: issued_at + expires_in,
        }
    }

    /// True while the token is outside the refresh margin.
    pub fn is_fresh(&self, now: Instant) -> bool {
        now + EXPIRY_MARGIN < self.expires_at
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

/// Token endpoint response for the client-credentials grant.
#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

/// Client-credentials provider for a fixed set of scopes.
pub struct ClientCredentialsProvider {
    client: Client,
    token_endpoint: String,
    client_id: String,
    client_secret: String,
    scopes: Vec<String>,
    cached: Mutex<Option<AccessToken>>,
}

impl ClientCredentialsProvider {
    /// Build a provider for the tenant and application in `settings`.
    pub fn new(settings: &AppSettings, scopes: &[&str]) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build token HTTP client")?;
        Ok(ClientCredentialsProvider {
            client,
            token_endpoint: settings.token_endpoint(),
            client_id: settings.application_id.clone(),
            client_secret: settings.application_secret.clone(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            cached: Mutex::new(None),
        })
    }

    /// Form fields posted to the token endpoint.
    fn token_form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("client_id", self.client_id.clone()),
            ("client_secret", self.client_secret.clone()),
            ("scope", self.scopes.join(" ")),
            ("grant_type", "client_credentials".to_string()),
        ]
    }

    /// Request a new token from the identity platform.
    fn acquire(&self) -> Result<AccessToken> {
        tracing::debug!(endpoint = %self.token_endpoint, "requesting access token");
        let issued_at = Instant::now();
        let res = self
            .client
            .post(&self.token_endpoint)
            .form(&self.token_form())
            .send()
            .context("Failed to send token request")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!("Token request failed: {} - {}", status, txt);
        }
        let body: TokenResponse = res.json().context("Parsing token response json")?;
        tracing::info!(expires_in = body.expires_in, "access token acquired");
        Ok(AccessToken::new(
            body.access_token,
            Duration::from_secs(body.expires_in),
            issued_at,
        ))
    }
}

impl TokenSource for ClientCredentialsProvider {
    fn access_token(&self) -> Result<String> {
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| anyhow!("token cache lock poisoned"))?;
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Instant::now()) {
                return Ok(token.secret().to_string());
            }
        }
        let token = self.acquire()?;
        let secret = token.secret().to_string();
        *cached = Some(token);
        Ok(secret)
    }
}
