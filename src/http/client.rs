//! HTTP client for the action endpoint.

use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Why a request did not yield a JSON document.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Connection, TLS or timeout failure.
    #[error("Failed to send request: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The body could not be parsed as JSON.
    #[error("Failed to parse JSON response: {source}")]
    InvalidJson {
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

impl HttpError {
    /// Raw response body, when one was received.
    pub fn body(&self) -> Option<&str> {
        match self {
            HttpError::Transport(_) => None,
            HttpError::Status { body, .. } | HttpError::InvalidJson { body, .. } => Some(body),
        }
    }
}

/// Thin wrapper over reqwest that posts forms and decodes JSON replies.
///
/// Requests are single shot; nothing is retried.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client sending `user_agent` on every request.
    pub fn with_user_agent(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::new(client))
    }

    /// POST `form` url-encoded and parse the reply as JSON.
    #[tracing::instrument(skip(self, form))]
    pub async fn post_form_json<F>(&self, url: &str, form: &F) -> Result<Value, HttpError>
    where
        F: Serialize + ?Sized,
    {
        debug!("POST form to {}...", url);

        let response = self.client.post(url).form(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!("{} answered {}: {}", url, status, body);
            return Err(HttpError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| HttpError::InvalidJson { body, source })
    }
}
