// JSON transport: the `JsonFetcher` capability and its reqwest implementation.
//
// The statistics engine only ever sees "JSON obtained" or "fetch failed" per
// URL. Retries across relays are handled here, never above.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ProxyRoute, TransportConfig};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode JSON from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("no transport routes configured")]
    NoRoutes,
}

// ---------------------------------------------------------------------------
// Capability trait
// ---------------------------------------------------------------------------

/// Retrieves a URL and returns its parsed JSON body.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError>;
}

#[async_trait]
impl<T: JsonFetcher + ?Sized> JsonFetcher for Arc<T> {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        (**self).fetch_json(url).await
    }
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// One way of reaching a target URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Direct,
    Proxy(ProxyRoute),
}

impl Route {
    /// The URL actually requested when fetching `target` through this route.
    pub fn url_for(&self, target: &str) -> Result<reqwest::Url, FetchError> {
        match self {
            Route::Direct => reqwest::Url::parse(target).map_err(|e| FetchError::InvalidUrl {
                url: target.to_string(),
                message: e.to_string(),
            }),
            Route::Proxy(proxy) => {
                reqwest::Url::parse_with_params(&proxy.base_url, &[(proxy.param.as_str(), target)])
                    .map_err(|e| FetchError::InvalidUrl {
                        url: proxy.base_url.clone(),
                        message: e.to_string(),
                    })
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Direct => f.write_str("direct"),
            Route::Proxy(proxy) => write!(f, "proxy {}", proxy.base_url),
        }
    }
}

/// Build the ordered route list from the transport config.
pub fn routes_from_config(config: &TransportConfig) -> Vec<Route> {
    let mut routes = Vec::with_capacity(config.proxies.len() + 1);
    if config.direct {
        routes.push(Route::Direct);
    }
    routes.extend(config.proxies.iter().cloned().map(Route::Proxy));
    routes
}

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

/// reqwest-backed fetcher that walks its routes in order until one succeeds.
pub struct HttpFetcher {
    http: reqwest::Client,
    routes: Vec<Route>,
}

impl HttpFetcher {
    pub fn new(http: reqwest::Client, routes: Vec<Route>) -> Self {
        Self { http, routes }
    }

    pub fn from_config(config: &TransportConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self::new(http, routes_from_config(config)))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    async fn fetch_via(&self, route: &Route, target: &str) -> Result<Value, FetchError> {
        let url = route.url_for(target)?;
        let url_str = url.to_string();

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: url_str.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url_str,
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| FetchError::Decode {
            url: url_str,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let mut last_err = FetchError::NoRoutes;
        for route in &self.routes {
            match self.fetch_via(route, url).await {
                Ok(json) => {
                    debug!(%route, url, "fetched JSON");
                    return Ok(json);
                }
                Err(e) => {
                    warn!(%route, url, "fetch failed: {e}");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
