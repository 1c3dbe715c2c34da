// src/services/auth.rs

//! Session token acquisition.

use std::fmt;

use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::{Client, RequestBuilder};

use crate::error::{AppError, Result};
use crate::models::AuthConfig;

const CSRF_HEADER: &str = "x-csrf-token";

/// Credentials attached to every feed and moderation request.
#[derive(Clone)]
pub struct Token {
    credential: String,
    csrf: String,
}

impl Token {
    pub fn new(credential: impl Into<String>, csrf: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            csrf: csrf.into(),
        }
    }

    pub fn csrf(&self) -> &str {
        &self.csrf
    }

    /// Attach the session cookie and CSRF header to a request.
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(COOKIE, format!(".ROBLOSECURITY={}", self.credential))
            .header(CSRF_HEADER, &self.csrf)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("credential", &"<redacted>")
            .field("csrf", &self.csrf)
            .finish()
    }
}

/// Source of request credentials.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Obtain a fresh token. Fails with [`AppError::Auth`] when the
    /// credential is rejected.
    async fn acquire_token(&self) -> Result<Token>;
}

/// Exchanges the session cookie for a CSRF token.
///
/// The login endpoint answers an empty POST with 403 and a fresh
/// `x-csrf-token` header; both 200 and 403 are accepted as long as the header
/// is present.
pub struct CsrfTokenProvider {
    client: Client,
    auth_url: String,
    credential: String,
}

impl CsrfTokenProvider {
    pub fn new(client: Client, config: &AuthConfig) -> Self {
        Self {
            client,
            auth_url: config.auth_url.clone(),
            credential: config.credential.clone(),
        }
    }
}

#[async_trait]
impl AuthProvider for CsrfTokenProvider {
    async fn acquire_token(&self) -> Result<Token> {
        let response = self
            .client
            .post(&self.auth_url)
            .header(COOKIE, format!(".ROBLOSECURITY={}", self.credential))
            .send()
            .await?;

        let status = response.status();
        log::debug!("CSRF token response status: {}", status);

        let csrf = response
            .headers()
            .get(CSRF_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .filter(|value| !value.is_empty());

        match (status.as_u16(), csrf) {
            (200 | 403, Some(csrf)) => {
                log::info!("Obtained CSRF token");
                Ok(Token::new(self.credential.clone(), csrf))
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(AppError::auth(format!(
                    "failed to obtain CSRF token (status {}): {}",
                    status, body
                )))
            }
        }
    }
}
