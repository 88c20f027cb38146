pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use config::{Config, ConfigError};
pub use errors::ProxyError;
pub use models::{AppState, CacheEntry, ProxyRequest, RateLimitInfo, RateLimitStatus, RateWindow};
pub use routes::routes;
