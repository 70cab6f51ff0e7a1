//! Callbacks a host update manager invokes on the client.

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{ApiResponse, ContentType, UpdateClient};

/// Installed version assumed when the host has not recorded one.
const UNKNOWN_VERSION: &str = "0";

/// Update state owned by the host and threaded through the hooks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTransient {
    /// Installed versions, keyed like `foo/foo.php`.
    #[serde(default)]
    pub checked: BTreeMap<String, String>,
    /// Update offers attached by clients, same keys as `checked`.
    #[serde(default)]
    pub response: BTreeMap<String, Value>,
}

/// Arguments of a host "package information" request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfoRequest {
    pub slug: String,
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// Hooks the host calls at times of its choosing.
#[async_trait]
pub trait UpdateHooks: Send + Sync {
    /// Attach this package's update offer to `transient`, if there is one.
    ///
    /// The transient is only ever augmented, never replaced.
    async fn check_for_update(&self, transient: UpdateTransient) -> UpdateTransient;

    /// Answer a package information request, or pass `default` through
    /// when the request is for some other package.
    async fn resolve_package_info(
        &self,
        default: ApiResponse,
        action: &str,
        args: &InfoRequest,
        transient: &UpdateTransient,
    ) -> ApiResponse;
}

#[async_trait]
impl UpdateHooks for UpdateClient {
    #[tracing::instrument(skip(self, transient))]
    async fn check_for_update(&self, mut transient: UpdateTransient) -> UpdateTransient {
        if transient.checked.is_empty() {
            return transient;
        }

        let key = self.transient_key();
        let current_version = transient
            .checked
            .get(&key)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_VERSION)
            .to_string();

        let response = self.check(&current_version).await;
        match response.non_empty_object() {
            Some(payload) => {
                transient
                    .response
                    .insert(key, Value::Object(payload.clone()));
            }
            None => debug!("No usable check response for {}", key),
        }

        transient
    }

    #[tracing::instrument(skip(self, default, transient))]
    async fn resolve_package_info(
        &self,
        default: ApiResponse,
        action: &str,
        args: &InfoRequest,
        transient: &UpdateTransient,
    ) -> ApiResponse {
        if self.config.content_type != ContentType::Plugins || args.slug != self.qualified_slug() {
            return default;
        }

        let current_version = transient
            .checked
            .get(&self.transient_key())
            .map(String::as_str)
            .unwrap_or(UNKNOWN_VERSION);

        self.show(&args.slug, Some(current_version), args.per_page)
            .await
    }
}
