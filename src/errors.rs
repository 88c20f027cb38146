use http::StatusCode;
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use warp::reply::Response;

use crate::middleware::add_rate_limit_headers;
use crate::models::RateLimitInfo;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Rate limit exceeded")]
    RateLimited(RateLimitInfo),
    #[error("Upstream responded with {0}")]
    Upstream(StatusCode),
    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),
    #[error("Client fault: {0}")]
    ClientFault(String),
}

impl warp::reject::Reject for ProxyError {}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream(status) => *status,
            Self::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            Self::ClientFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing body. Never carries internal details.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::RateLimited(_) => "Too many requests. Please try again later.",
            Self::Upstream(_) => "Error fetching from external API",
            Self::UpstreamUnreachable(_) => "Bad Gateway",
            Self::ClientFault(_) => "Internal Server Error",
        }
    }

    pub fn to_response(&self) -> Response {
        let mut response = text_response(self.status(), self.message());
        if let Self::RateLimited(info) = self {
            add_rate_limit_headers(response.headers_mut(), info);
        }
        response
    }
}

pub fn text_response(status: StatusCode, message: &'static str) -> Response {
    let mut response = Response::new(message.into());
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(message.len()));
    response
}
