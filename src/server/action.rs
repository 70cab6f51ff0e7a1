use log::debug;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};
use crate::runtime::Runtime;

/// Request parameters, merged from the query string and the body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionParams {
    pub action: Option<String>,
    pub slug: Option<String>,
    pub version: Option<String>,
    /// Accepted for compatibility with package information requests; the
    /// catalog does not paginate.
    pub per_page: Option<String>,
    pub api_key: Option<String>,
}

impl ActionParams {
    /// Collect parameters from the query string, then from the body.
    ///
    /// Body values override query values and a repeated key keeps its last
    /// value. Form and JSON bodies are read; other body types are ignored.
    pub fn from_request(
        query: Option<&str>,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<Self> {
        let mut params = Self::default();
        if let Some(query) = query {
            params.extend(decode_form(query.as_bytes())?);
        }
        if body.is_empty() {
            return Ok(params);
        }

        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(str::trim)
            .unwrap_or_default();
        if mime.is_empty() || mime.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
            params.extend(decode_form(body)?);
        } else if mime.eq_ignore_ascii_case("application/json") {
            params.extend(decode_json(body)?);
        } else {
            debug!("Ignoring {} request body", mime);
        }
        Ok(params)
    }

    fn extend(&mut self, pairs: Vec<(String, String)>) {
        for (key, value) in pairs {
            let field = match key.as_str() {
                "action" => &mut self.action,
                "slug" => &mut self.slug,
                "version" => &mut self.version,
                "per_page" => &mut self.per_page,
                "api_key" => &mut self.api_key,
                _ => continue,
            };
            *field = Some(value);
        }
    }

    pub fn action(&self) -> Result<Action> {
        self.action
            .as_deref()
            .ok_or_else(|| CatalogError::invalid_argument("No action provided"))?
            .parse()
    }

    fn slug(&self) -> &str {
        self.slug.as_deref().unwrap_or_default()
    }
}

fn decode_form(bytes: &[u8]) -> Result<Vec<(String, String)>> {
    serde_urlencoded::from_bytes(bytes).map_err(|e| {
        CatalogError::invalid_argument(format!("Malformed request parameters: {}", e))
    })
}

/// Top-level scalar members of a JSON object; nested values are skipped.
fn decode_json(bytes: &[u8]) -> Result<Vec<(String, String)>> {
    let object: serde_json::Map<String, Value> = serde_json::from_slice(bytes).map_err(|e| {
        CatalogError::invalid_argument(format!("Malformed request body: {}", e))
    })?;

    Ok(object
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            Value::Number(n) => Some((key, n.to_string())),
            Value::Bool(b) => Some((key, b.to_string())),
            _ => None,
        })
        .collect())
}

/// Queries exposed by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Index,
    Show,
    Latest,
    Check,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Index => write!(f, "index"),
            Action::Show => write!(f, "show"),
            Action::Latest => write!(f, "latest"),
            Action::Check => write!(f, "check"),
        }
    }
}

impl FromStr for Action {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "index" => Ok(Action::Index),
            "show" => Ok(Action::Show),
            "latest" => Ok(Action::Latest),
            "check" => Ok(Action::Check),
            other => Err(CatalogError::invalid_argument(format!(
                "Invalid action: {}",
                other
            ))),
        }
    }
}

impl Action {
    /// Run the query and render its JSON body.
    pub fn run<R: Runtime>(self, catalog: &Catalog<R>, params: &ActionParams) -> Result<Value> {
        let value = match self {
            Action::Index => serde_json::to_value(catalog.list_packages()?),
            Action::Show => {
                serde_json::to_value(catalog.show(params.slug(), params.version.as_deref())?)
            }
            Action::Latest => serde_json::to_value(catalog.latest(params.slug())?),
            Action::Check => {
                serde_json::to_value(catalog.check(params.slug(), params.version.as_deref())?)
            }
        };
        value.map_err(|e| CatalogError::Unexpected(e.into()))
    }
}
