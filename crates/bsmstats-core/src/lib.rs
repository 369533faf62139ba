// Shared infrastructure: configuration and the JSON transport.

pub mod config;
pub mod fetch;

pub use config::{Config, ConfigError, ProxyRoute, SourceConfig, TransportConfig};
pub use fetch::{FetchError, HttpFetcher, JsonFetcher, Route};
