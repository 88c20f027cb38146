pub mod auth;
pub mod cache;
pub mod janitor;
pub mod rate_limit;
pub mod upstream;

pub use auth::is_authenticated;
pub use cache::CacheStore;
pub use janitor::spawn_expiry_sweep;
pub use rate_limit::RateLimiter;
pub use upstream::UpstreamClient;
