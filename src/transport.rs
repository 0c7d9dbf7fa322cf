use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::query::SearchRequest;

/// Network-level failure: nothing usable came back from the server.
#[derive(Debug, Error)]
#[error("network error: {0}")]
pub struct TransportError(pub String);

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Sends one search request. Implementations must report any non-HTTP
/// failure as `TransportError`; HTTP error statuses are a normal response.
pub trait SearchTransport {
    fn send(&self, request: &SearchRequest) -> Result<TransportResponse, TransportError>;
}

pub struct HttpTransport {
    client: Client,
    search_url: Url,
    username: String,
    password: String,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        if config.insecure {
            warn!(
                action = "configure",
                component = "http_transport",
                "TLS certificate verification disabled"
            );
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .pool_max_idle_per_host(0)
            .build()
            .context("Failed to create HTTP client")?;

        let search_url = config.search_url()?;
        debug!(
            action = "configure",
            component = "http_transport",
            url = %search_url,
            "Search endpoint resolved"
        );

        Ok(Self {
            client,
            search_url,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

impl SearchTransport for HttpTransport {
    fn send(&self, request: &SearchRequest) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(self.search_url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(TransportResponse { status, body })
    }
}

