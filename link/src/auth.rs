//! Login and token handling for the Meridian HTTP session.
//!
//! The server issues an access/refresh token pair on login; an expired
//! access token is renewed through `/web/api/relogin` with the refresh
//! token. Token state lives inside each [`crate::LinkClient`] — there is no
//! process-wide session.

use crate::error::{LinkError, Result};
use crate::models::{LoginRequest, LoginResponse, ReloginRequest};

/// Operator identity used to establish the session.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

/// Access/refresh token pair issued by the server.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

pub(crate) async fn login(
    http: &reqwest::Client,
    base_url: &str,
    credentials: &Credentials,
) -> Result<TokenPair> {
    let request = LoginRequest {
        login_name: credentials.user.clone(),
        password: credentials.password.clone(),
    };
    let response = http
        .post(format!("{}/web/api/login", base_url))
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(LinkError::Authentication(format!(
            "login failed with status {}",
            status.as_u16()
        )));
    }

    let body: LoginResponse = response.json().await?;
    token_pair_from(body, "login")
}

pub(crate) async fn relogin(
    http: &reqwest::Client,
    base_url: &str,
    refresh_token: &str,
) -> Result<TokenPair> {
    let request = ReloginRequest {
        refresh_token: refresh_token.to_string(),
    };
    let response = http
        .post(format!("{}/web/api/relogin", base_url))
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(LinkError::Authentication(format!(
            "relogin failed with status {}",
            status.as_u16()
        )));
    }

    let body: LoginResponse = response.json().await?;
    token_pair_from(body, "relogin")
}

fn token_pair_from(body: LoginResponse, operation: &str) -> Result<TokenPair> {
    if !body.success {
        return Err(LinkError::Authentication(format!(
            "{} rejected: {}",
            operation,
            body.reason.unwrap_or_else(|| "unknown reason".to_string())
        )));
    }
    match (body.access_token, body.refresh_token) {
        (Some(access), Some(refresh)) => Ok(TokenPair { access, refresh }),
        _ => Err(LinkError::Authentication(format!(
            "{} response did not include a token pair",
            operation
        ))),
    }
}
