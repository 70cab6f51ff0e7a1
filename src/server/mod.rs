//! HTTP action endpoint for the catalog.
//!
//! A single route accepts `GET` and `POST /`, merges query-string and body
//! parameters and dispatches on `action` to the catalog queries. Successful
//! answers are JSON; failures are a bare text message with the matching
//! status.

mod action;

use anyhow::{Context, anyhow};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{RawQuery, State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use log::{debug, info};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};
use crate::runtime::Runtime;

pub use action::{Action, ActionParams};

/// Default listen address of `pkgapi serve`.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = match &self {
            CatalogError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Build the router serving `catalog`.
pub fn router<R: Runtime + 'static>(catalog: Arc<Catalog<R>>) -> Router {
    Router::new()
        .route("/", get(handle_action::<R>).post(handle_action::<R>))
        .layer(TraceLayer::new_for_http())
        .with_state(catalog)
}

/// Serve `catalog` on `bind` until Ctrl-C.
pub async fn serve<R: Runtime + 'static>(catalog: Catalog<R>, bind: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!(
        "Serving packages from {:?} on http://{}",
        catalog.config().downloads_root_path,
        listener.local_addr()?
    );

    axum::serve(listener, router(Arc::new(catalog)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

async fn handle_action<R: Runtime + 'static>(
    State(catalog): State<Arc<Catalog<R>>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    let params = body
        .map_err(|e| CatalogError::invalid_argument(e.body_text()))
        .and_then(|body| {
            let content_type = headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            ActionParams::from_request(query.as_deref(), content_type, &body)
        });

    let result = match params {
        Ok(params) => dispatch(catalog, params).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            debug!("Request failed: {}", e);
            e.into_response()
        }
    }
}

/// Parse the action and run the query on the blocking pool.
async fn dispatch<R: Runtime + 'static>(
    catalog: Arc<Catalog<R>>,
    params: ActionParams,
) -> Result<Value> {
    let action = params.action()?;
    if let Some(key) = params.api_key.as_deref() {
        debug!("{} request from {}", action, key);
    }

    tokio::task::spawn_blocking(move || action.run(&catalog, &params))
        .await
        .map_err(|e| CatalogError::Unexpected(anyhow!("Query task failed: {}", e)))?
}

#[cfg(test)]
mod tests;
