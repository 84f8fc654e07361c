use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::PriceError;
use crate::traits::graphql_transport::GraphqlTransport;
use crate::utils::helper::truncate_string;

/// HTTP method used to send queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpMethod {
    /// `?query=` in the URL, cacheable by CDNs
    #[default]
    Get,
    Post,
}

impl FromStr for HttpMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            other => Err(anyhow::anyhow!("Unsupported GraphQL method {}", other)),
        }
    }
}

/// Endpoint settings for [`HttpGraphqlTransport`]
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub endpoint: String,
    /// Sent as the `Store` header
    pub store_view: Option<String>,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
}

impl TransportConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            store_view: None,
            method: HttpMethod::default(),
            headers: Vec::new(),
        }
    }

    /// Read settings from `COMMERCE_GRAPHQL_*` environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let endpoint = std::env::var("COMMERCE_GRAPHQL_ENDPOINT")
            .context("COMMERCE_GRAPHQL_ENDPOINT is not set")?;

        let store_view = std::env::var("COMMERCE_STORE_VIEW")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let method = match std::env::var("COMMERCE_GRAPHQL_METHOD") {
            Ok(m) => m.parse()?,
            Err(_) => HttpMethod::default(),
        };

        let headers = match std::env::var("COMMERCE_GRAPHQL_HEADERS") {
            Ok(raw) => parse_headers(&raw)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            endpoint,
            store_view,
            method,
            headers,
        })
    }
}

/// Parse `Name: value; Other: value` into header pairs
pub fn parse_headers(raw: &str) -> anyhow::Result<Vec<(String, String)>> {
    raw.split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair
                .split_once(':')
                .ok_or_else(|| anyhow::anyhow!("Invalid header {}, expected Name: value", pair))?;
            Ok((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// GraphQL transport over HTTP
#[derive(Clone)]
pub struct HttpGraphqlTransport {
    client: Client,
    config: TransportConfig,
}

impl HttpGraphqlTransport {
    /// Create a new transport for the given endpoint settings
    pub fn new(config: TransportConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::new(TransportConfig::from_env()?))
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

#[async_trait]
impl GraphqlTransport for HttpGraphqlTransport {
    async fn run_query(&self, query: &str) -> Result<Value, PriceError> {
        let endpoint = self.config.endpoint.as_str();

        let mut request = match self.config.method {
            HttpMethod::Get => self.client.get(endpoint).query(&[("query", query)]),
            HttpMethod::Post => self.client.post(endpoint).json(&json!({ "query": query })),
        };

        if let Some(store_view) = &self.config.store_view {
            request = request.header("Store", store_view.as_str());
        }
        for (name, value) in &self.config.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        debug!(
            "Sending GraphQL {:?} to {}: {}",
            self.config.method,
            endpoint,
            truncate_string(query, 120)
        );

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("GraphQL request to {} failed: {}", endpoint, e);
                return Err(e.into());
            }
        };

        let status = response.status();
        let body = response.text().await?;
        parse_graphql_response(status.as_u16(), &body)
    }
}

/// Turn a raw HTTP status and body into a GraphQL result
pub fn parse_graphql_response(status: u16, body: &str) -> Result<Value, PriceError> {
    if !(200..300).contains(&status) {
        warn!("GraphQL endpoint error: Status {}", status);
        return Err(PriceError::Http {
            status,
            body: body.to_string(),
        });
    }

    let value: Value = serde_json::from_str(body)?;

    match value.get("errors") {
        Some(Value::Array(errors)) if errors.is_empty() => Ok(value),
        Some(Value::Null) | None => Ok(value),
        Some(errors) => {
            warn!("GraphQL response carried errors: {}", errors);
            Err(PriceError::Graphql(errors.to_string()))
        }
    }
}
