use std::convert::Infallible;
use std::time::Instant;

use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Method, StatusCode};
use serde_json::Value;
use warp::path::FullPath;
use warp::reply::Response;

use crate::errors::{text_response, ProxyError};
use crate::middleware::add_rate_limit_headers;
use crate::models::{AppState, ProxyRequest, RateLimitInfo};

#[cfg(test)]
mod tests;

pub async fn handle_rejection(err: warp::Rejection) -> Result<Response, Infallible> {
    let response = if err.is_not_found() {
        text_response(StatusCode::NOT_FOUND, "Not Found")
    } else if let Some(e) = err.find::<ProxyError>() {
        e.to_response()
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
    } else {
        tracing::error!("unhandled rejection: {:?}", err);
        text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    };

    Ok(response)
}

/// `GET /proxy`: cache lookup, upstream fetch on miss, response shaping.
/// Runs only after the auth and rate-limit stages have let the request through.
pub async fn proxy(
    rate_limit: RateLimitInfo,
    client: String,
    method: Method,
    full_path: FullPath,
    raw_query: String,
    state: AppState,
) -> Result<Response, Infallible> {
    let start_time = Instant::now();

    let (result, cache_hit) = match ProxyRequest::resolve(
        &raw_query,
        client,
        &state.config.upstream_base,
        &state.config.weather_api_key,
    ) {
        Ok(request) => fetch_through_cache(&state, &request).await,
        Err(e) => (Err(e), false),
    };

    let mut response = match result.and_then(|value| json_response(&value)) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Error fetching from external API");
            e.to_response()
        }
    };
    add_rate_limit_headers(response.headers_mut(), &rate_limit);

    let size = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    tracing::info!(
        method = %method,
        path = full_path.as_str(),
        status = response.status().as_u16(),
        latency_ms = start_time.elapsed().as_millis() as u64,
        size = %size,
        cache = if cache_hit { "hit" } else { "miss" },
        rate_limit = %rate_limit.status,
        "proxy request served"
    );

    Ok(response)
}

async fn fetch_through_cache(state: &AppState, request: &ProxyRequest) -> (Result<Value, ProxyError>, bool) {
    let cache_key = request.upstream_url.as_str();
    if let Some(value) = state.cache.get(cache_key).await {
        return (Ok(value), true);
    }

    // Spawned so a client disconnect does not cancel the in-flight call.
    let upstream = state.upstream.clone();
    let url = request.upstream_url.clone();
    let fetched = match tokio::spawn(async move { upstream.fetch(&url).await }).await {
        Ok(result) => result,
        Err(e) => Err(ProxyError::ClientFault(format!("upstream task failed: {}", e))),
    };

    if let Ok(value) = &fetched {
        state.cache.set(cache_key, value.clone()).await;
    }
    (fetched, false)
}

fn json_response(value: &Value) -> Result<Response, ProxyError> {
    let body = serde_json::to_vec(value)
        .map_err(|e| ProxyError::ClientFault(format!("error encoding response body: {}", e)))?;
    let length = HeaderValue::from(body.len());
    let mut response = Response::new(body.into());
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_LENGTH, length);
    Ok(response)
}
