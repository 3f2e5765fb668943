//! HTTP document source for a Frappe site.
//!
//! Uses the REST resource API: `GET /api/resource/<DocType>` with JSON-encoded
//! `fields` and `filters` query parameters and token authentication.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::source::{DocumentSource, ListQuery};

const USER_AGENT: &str = concat!("frappe-report/", env!("CARGO_PKG_VERSION"));
const MAX_ERROR_BODY: usize = 512;

/// Backend location and API token pair, resolved once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub url: String,
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    pub fn authorization(&self) -> String {
        format!("token {}:{}", self.api_key, self.api_secret)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .finish()
    }
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Vec<Value>,
}

pub struct FrappeClient {
    http: Client,
    base_url: Url,
    authorization: String,
}

impl FrappeClient {
    pub fn new(credentials: &Credentials, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(credentials.url.trim()).map_err(|err| {
            Error::InvalidConfig(format!("backend url '{}': {err}", credentials.url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidConfig(format!(
                "backend url '{}' cannot be used as a base",
                credentials.url
            )));
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url,
            authorization: credentials.authorization(),
        })
    }

    pub fn resource_url(&self, doctype: &str) -> Url {
        resource_url(&self.base_url, doctype)
    }
}

impl DocumentSource for FrappeClient {
    fn list(&self, doctype: &str, query: &ListQuery) -> Result<Vec<Value>> {
        let url = self.resource_url(doctype);
        tracing::debug!(
            doctype,
            start = query.start,
            limit = query.limit,
            filters = query.filters.len(),
            "GET {url}"
        );

        let response = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&query_params(query))
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(Error::Backend {
                doctype: doctype.to_string(),
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        let parsed: ListResponse = serde_json::from_str(&body).map_err(|source| Error::Decode {
            doctype: doctype.to_string(),
            source,
        })?;
        Ok(parsed.data)
    }
}

fn resource_url(base: &Url, doctype: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().extend(["api", "resource", doctype]);
    }
    url
}

/// Query-string parameters for a list request.
pub fn query_params(query: &ListQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();

    let fields: Vec<Value> = query
        .fields
        .iter()
        .map(|f| Value::String(f.clone()))
        .collect();
    if !fields.is_empty() {
        params.push(("fields", Value::Array(fields).to_string()));
    }

    if !query.filters.is_empty() {
        let filters: Vec<Value> = query.filters.iter().map(|f| f.to_json()).collect();
        params.push(("filters", Value::Array(filters).to_string()));
    }

    if let Some(order) = &query.order_by {
        params.push(("order_by", format!("{} {}", order.field, order.order.as_str())));
    }

    params.push(("limit_start", query.start.to_string()));
    params.push(("limit_page_length", query.limit.to_string()));
    params
}

fn truncate(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
