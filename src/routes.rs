use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::HeaderMap;
use warp::{Filter, Rejection, Reply};

use crate::errors::ProxyError;
use crate::handlers::{self, handle_rejection};
use crate::models::{AppState, RateLimitInfo, RateLimitStatus};
use crate::services::{is_authenticated, RateLimiter};

/// The full filter chain: `GET /proxy` behind auth and the rate limiter,
/// with every rejection turned into a plain-text response.
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let proxy = warp::path("proxy")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_auth(state.config.expected_authorization()))
        .and(with_rate_limit(state.rate_limiter.clone()))
        .and(warp::method())
        .and(warp::path::full())
        .and(warp::query::raw().or_else(|_| async { Ok::<(String,), Infallible>((String::new(),)) }))
        .and(with_state(state))
        .and_then(handlers::proxy);

    proxy
        .recover(handle_rejection)
        .with(warp::trace::request())
}

pub fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// Passes through untouched on an exact `Authorization` match, otherwise
/// rejects before any limiter or cache state is touched.
pub fn with_auth(expected: String) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    let expected = Arc::new(expected);
    warp::header::headers_cloned()
        .and_then(move |headers: HeaderMap| {
            let expected = expected.clone();
            async move {
                if is_authenticated(&headers, &expected) {
                    Ok(())
                } else {
                    tracing::warn!("rejecting request with missing or invalid credentials");
                    Err(warp::reject::custom(ProxyError::Unauthorized))
                }
            }
        })
        .untuple_one()
}

/// Counts the request against the caller's window. Extracts the limiter
/// outcome and the client identity for the handler.
pub fn with_rate_limit(
    limiter: Arc<RateLimiter>,
) -> impl Filter<Extract = (RateLimitInfo, String), Error = Rejection> + Clone {
    warp::addr::remote()
        .and_then(move |addr: Option<SocketAddr>| {
            let limiter = limiter.clone();
            async move {
                let client = client_identity(addr);
                let info = limiter.check(&client).await;
                match info.status {
                    RateLimitStatus::WithinLimit => Ok((info, client)),
                    RateLimitStatus::Exceeded => {
                        tracing::warn!(client = %client, rate_limit = %info.status, "rate limit exceeded");
                        Err(warp::reject::custom(ProxyError::RateLimited(info)))
                    }
                }
            }
        })
        .untuple_one()
}

pub fn client_identity(addr: Option<SocketAddr>) -> String {
    addr.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
