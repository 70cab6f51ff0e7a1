//! Update client for the package catalog.
//!
//! An [`UpdateClient`] speaks for one package installed on one host site. It
//! posts actions to the catalog endpoint and reports what comes back either
//! as raw JSON (for hosts that store it) or as an [`UpdateDecision`].

mod hooks;

use anyhow::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::http::{HttpClient, HttpError};

pub use hooks::{InfoRequest, UpdateHooks, UpdateTransient};

/// Error code carried by every [`ApiFailure`].
pub const FAILURE_CODE: &str = "content_api_failed";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Kind of content a package provides to its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Plugins,
    Themes,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Plugins => write!(f, "plugins"),
            ContentType::Themes => write!(f, "themes"),
        }
    }
}

impl FromStr for ContentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plugins" => Ok(ContentType::Plugins),
            "themes" => Ok(ContentType::Themes),
            _ => anyhow::bail!("Content type must be either 'plugins' or 'themes'"),
        }
    }
}

/// Identity of the site the client runs in.
#[derive(Debug, Clone, PartialEq)]
pub struct HostInfo {
    pub name: String,
    pub version: String,
    pub url: String,
}

impl HostInfo {
    pub fn user_agent(&self) -> String {
        format!("{}/{}; {}", self.name, self.version, self.url)
    }

    /// Identification tag sent as `api_key`.
    pub fn api_key(&self) -> String {
        api_key(&self.url)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Catalog action endpoint.
    pub api_url: String,
    pub content_type: ContentType,
    /// Package name without the content type prefix.
    pub slug: String,
    pub host: HostInfo,
    pub timeout: Duration,
}

/// Hex SHA-256 of the host URL.
///
/// Stable per site so the catalog can tell callers apart; it is not a secret.
pub fn api_key(site_url: &str) -> String {
    hex::encode(Sha256::digest(site_url.as_bytes()))
}

/// A request that produced no usable JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiFailure {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl From<HttpError> for ApiFailure {
    fn from(err: HttpError) -> Self {
        let message = match &err {
            HttpError::Transport(_) => {
                "An unexpected HTTP error occurred during the API request.".to_string()
            }
            HttpError::Status { status, .. } => {
                format!("The API request failed with HTTP {}.", status)
            }
            HttpError::InvalidJson { .. } => "An unknown error occurred.".to_string(),
        };
        let data = err
            .body()
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());

        ApiFailure {
            code: FAILURE_CODE.to_string(),
            message,
            data: Some(data),
        }
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Some(data) => write!(f, "{} ({})", self.message, data),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ApiFailure {}

/// What the catalog answered.
///
/// Transport and decoding problems are values, not errors, so host hooks can
/// inspect and ignore them.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    Failed(ApiFailure),
}

impl ApiResponse {
    /// The payload if it is a JSON object with at least one field.
    pub fn non_empty_object(&self) -> Option<&Map<String, Value>> {
        match self {
            ApiResponse::Json(Value::Object(map)) if !map.is_empty() => Some(map),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ApiResponse::Failed(_))
    }

    pub fn into_result(self) -> Result<Value, ApiFailure> {
        match self {
            ApiResponse::Json(value) => Ok(value),
            ApiResponse::Failed(failure) => Err(failure),
        }
    }
}

/// Whether a host should offer an update, derived from a `check` reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateDecision {
    pub slug: String,
    pub current_version: String,
    pub available_version: String,
    pub is_update_available: bool,
    pub download_location: String,
}

impl UpdateDecision {
    /// Interpret a `check` payload; `new_version` is present only when the
    /// catalog has something newer.
    pub fn from_check(slug: &str, current_version: &str, payload: &Value) -> Option<Self> {
        let field = |name: &str| payload.get(name).and_then(Value::as_str);

        let new_version = field("new_version");
        let available_version = new_version.or_else(|| field("version"))?;

        Some(Self {
            slug: slug.to_string(),
            current_version: current_version.to_string(),
            available_version: available_version.to_string(),
            is_update_available: new_version.is_some(),
            download_location: field("package").unwrap_or_default().to_string(),
        })
    }
}

pub struct UpdateClient {
    http: HttpClient,
    config: ClientConfig,
}

impl UpdateClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = HttpClient::with_user_agent(&config.host.user_agent(), config.timeout)?;
        Ok(Self::with_http_client(config, http))
    }

    pub fn with_http_client(config: ClientConfig, http: HttpClient) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The slug as the catalog knows it: `<type>/<slug>`.
    pub fn qualified_slug(&self) -> String {
        format!("{}/{}", self.config.content_type, self.config.slug)
    }

    /// Key of this package in the host's update state: `<slug>/<slug>.php`.
    pub fn transient_key(&self) -> String {
        format!("{}/{}.php", self.config.slug, self.config.slug)
    }

    /// Ask whether something newer than `current_version` exists.
    pub async fn check(&self, current_version: &str) -> ApiResponse {
        self.request("check", vec![("version", current_version.to_string())])
            .await
    }

    pub async fn latest(&self) -> ApiResponse {
        self.request("latest", Vec::new()).await
    }

    /// Fetch one version (or all versions when `version` is `None`).
    pub async fn show(
        &self,
        slug: &str,
        version: Option<&str>,
        per_page: Option<u32>,
    ) -> ApiResponse {
        let mut body = vec![("slug", slug.to_string())];
        if let Some(version) = version {
            body.push(("version", version.to_string()));
        }
        if let Some(per_page) = per_page {
            body.push(("per_page", per_page.to_string()));
        }
        self.request("show", body).await
    }

    /// Run `check` and reduce the reply to an [`UpdateDecision`].
    #[tracing::instrument(skip(self))]
    pub async fn decide(&self, current_version: &str) -> Result<UpdateDecision, ApiFailure> {
        let payload = self.check(current_version).await.into_result()?;
        UpdateDecision::from_check(&self.qualified_slug(), current_version, &payload).ok_or_else(
            || ApiFailure {
                code: FAILURE_CODE.to_string(),
                message: "The check response carried no version.".to_string(),
                data: Some(payload.to_string()),
            },
        )
    }

    /// Post `action` with the identifying defaults; entries in `body`
    /// replace defaults of the same name.
    #[tracing::instrument(skip(self, body))]
    async fn request(&self, action: &str, body: Vec<(&str, String)>) -> ApiResponse {
        let mut form: Vec<(&str, String)> = vec![
            ("action", action.to_string()),
            ("slug", self.qualified_slug()),
            ("api_key", self.config.host.api_key()),
        ];
        for (key, value) in body {
            match form.iter_mut().find(|(k, _)| *k == key) {
                Some(existing) => existing.1 = value,
                None => form.push((key, value)),
            }
        }

        match self.http.post_form_json(&self.config.api_url, &form).await {
            Ok(value) => {
                debug!("{} {} answered {}", self.qualified_slug(), action, value);
                ApiResponse::Json(value)
            }
            Err(e) => {
                warn!("{} request for {} failed: {}", action, self.qualified_slug(), e);
                ApiResponse::Failed(ApiFailure::from(e))
            }
        }
    }
}
