use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use code_entry::CodeAuthority;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use shared::{
    error::ApiError,
    protocol::{ResendCodeRequest, VerifyCodeRequest, RESEND_CODE_PATH, VERIFY_CODE_PATH},
};
use tracing::{debug, warn};
use url::Url;

pub mod error;

pub use error::AuthorityError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Verifies and resends codes against the two-factor HTTP endpoints.
pub struct HttpCodeAuthority {
    http: Client,
    server_url: Url,
    destination: String,
    session_token: Option<String>,
}

impl HttpCodeAuthority {
    pub fn new(server_url: &str, destination: impl Into<String>) -> Result<Self, AuthorityError> {
        Self::with_timeout(server_url, destination, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        server_url: &str,
        destination: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AuthorityError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AuthorityError::Client)?;

        Ok(Self {
            http,
            server_url: parse_base_url(server_url)?,
            destination: destination.into(),
            session_token: None,
        })
    }

    /// Bearer token identifying the half-finished sign-in.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, AuthorityError> {
        self.server_url
            .join(path)
            .map_err(|source| AuthorityError::InvalidServerUrl {
                url: format!("{}{path}", self.server_url),
                source,
            })
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<(), AuthorityError> {
        let url = self.endpoint(path)?;
        let mut request = self.http.post(url).json(body);
        if let Some(token) = &self.session_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            debug!(path, %status, "two-factor request accepted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = rejection_message(status, &body);
        warn!(path, %status, "two-factor request rejected");
        Err(AuthorityError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl CodeAuthority for HttpCodeAuthority {
    async fn verify(&self, code: &str) -> Result<()> {
        self.post(
            VERIFY_CODE_PATH,
            &VerifyCodeRequest {
                code: code.to_string(),
            },
        )
        .await?;
        Ok(())
    }

    async fn resend(&self) -> Result<()> {
        self.post(
            RESEND_CODE_PATH,
            &ResendCodeRequest {
                destination: self.destination.clone(),
            },
        )
        .await?;
        Ok(())
    }
}

fn parse_base_url(raw: &str) -> Result<Url, AuthorityError> {
    let trimmed = raw.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };

    Url::parse(&normalized).map_err(|source| AuthorityError::InvalidServerUrl {
        url: raw.to_string(),
        source,
    })
}

// Client errors without a readable body stay empty so the widget shows its
// own default wording.
fn rejection_message(status: StatusCode, body: &str) -> String {
    if let Ok(api_error) = serde_json::from_str::<ApiError>(body) {
        return api_error.message;
    }

    if status.is_server_error() {
        format!("Verification service unavailable ({status})")
    } else {
        String::new()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
