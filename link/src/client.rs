//! Meridian client with builder pattern.
//!
//! Construct one [`LinkClient`] in the process entry point and pass it to
//! whatever needs it; the client is cheap to clone and shares its token
//! state between clones.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::Mutex;

use crate::auth::{self, Credentials, TokenPair};
use crate::error::{LinkError, Result};
use crate::models::{QueryOutcome, StatementRequest};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated session to a Meridian server.
///
/// # Examples
///
/// ```rust,no_run
/// use meridian_link::{Credentials, LinkClient};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = LinkClient::builder()
///     .base_url("http://127.0.0.1:5654")
///     .timeout(std::time::Duration::from_secs(30))
///     .credentials(Credentials::new("sys", "manager"))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LinkClient {
    base_url: String,
    http_client: reqwest::Client,
    credentials: Credentials,
    tokens: Arc<Mutex<Option<TokenPair>>>,
}

impl LinkClient {
    /// Create a new builder for configuring the client
    pub fn builder() -> LinkClientBuilder {
        LinkClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute one complete statement against the server.
    ///
    /// Logs in lazily on first use. When the server rejects the request as
    /// unauthorized, performs exactly one relogin and retries exactly once;
    /// any further failure propagates.
    pub async fn execute_statement(&self, statement: &str) -> Result<QueryOutcome> {
        let preview = if statement.len() > 80 {
            format!("{}...", &statement[..80])
        } else {
            statement.to_string()
        };
        debug!(
            "executing statement: \"{}\" (len={})",
            preview.replace('\n', " "),
            statement.len()
        );

        self.ensure_token().await?;

        match self.send_statement(statement).await {
            Err(err) if err.is_unauthorized() => {
                warn!("statement rejected as unauthorized, attempting relogin");
                self.refresh_session().await?;
                self.send_statement(statement).await
            }
            other => other,
        }
    }

    async fn ensure_token(&self) -> Result<()> {
        let mut tokens = self.tokens.lock().await;
        if tokens.is_none() {
            debug!("no access token, logging in as {}", self.credentials.user);
            *tokens =
                Some(auth::login(&self.http_client, &self.base_url, &self.credentials).await?);
        }
        Ok(())
    }

    async fn refresh_session(&self) -> Result<()> {
        let mut tokens = self.tokens.lock().await;
        let refresh = tokens
            .as_ref()
            .map(|pair| pair.refresh.clone())
            .ok_or_else(|| LinkError::Authentication("no refresh token available".into()))?;
        *tokens = Some(auth::relogin(&self.http_client, &self.base_url, &refresh).await?);
        Ok(())
    }

    async fn send_statement(&self, statement: &str) -> Result<QueryOutcome> {
        let access = self
            .tokens
            .lock()
            .await
            .as_ref()
            .map(|pair| pair.access.clone())
            .ok_or_else(|| LinkError::Authentication("no access token available".into()))?;

        let request = StatementRequest {
            statement: statement.to_string(),
        };
        let response = self
            .http_client
            .post(format!("{}/web/api/statement", self.base_url))
            .bearer_auth(access)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            let message = serde_json::from_str::<QueryOutcome>(&body)
                .ok()
                .and_then(|outcome| outcome.reason)
                .unwrap_or(body);
            warn!(
                "statement failed: status={} message=\"{}\"",
                status.as_u16(),
                message
            );
            return Err(LinkError::Server {
                status_code: status.as_u16(),
                message,
            });
        }

        let outcome: QueryOutcome = response.json().await?;
        debug!(
            "statement ok: {} columns, {} rows",
            outcome.columns.len(),
            outcome.row_count()
        );
        Ok(outcome)
    }
}

/// Builder for [`LinkClient`]
pub struct LinkClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    credentials: Option<Credentials>,
}

impl LinkClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            credentials: None,
        }
    }

    /// Server base URL, e.g. `http://127.0.0.1:5654`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    /// Request timeout applied to every call
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn build(self) -> Result<LinkClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| LinkError::Configuration("base_url is required".into()))?;
        let credentials = self
            .credentials
            .ok_or_else(|| LinkError::Configuration("credentials are required".into()))?;
        let http_client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| LinkError::Configuration(format!("failed to build http client: {}", e)))?;

        Ok(LinkClient {
            base_url,
            http_client,
            credentials,
            tokens: Arc::new(Mutex::new(None)),
        })
    }
}
