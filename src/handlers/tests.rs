#[cfg(test)]
mod tests {
    use std::time::Duration;

    use warp::http::StatusCode;

    use crate::handlers::handle_rejection;
    use crate::models::{ProxyRequest, RateLimitInfo, RateLimitStatus};
    use crate::ProxyError;

    const BASE: &str = "http://api.weatherstack.com/current";

    async fn body_of(response: warp::reply::Response) -> String {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_handle_not_found_rejection() {
        let rejection = warp::reject::not_found();
        let response = handle_rejection(rejection).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_handle_rate_limit_rejection() {
        let info = RateLimitInfo {
            status: RateLimitStatus::Exceeded,
            limit: 5,
            remaining: 0,
            reset_after: Duration::from_secs(12),
            legacy_headers: false,
        };
        let rejection = warp::reject::custom(ProxyError::RateLimited(info));
        let response = handle_rejection(rejection).await.unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("ratelimit-status").unwrap(), "exceeded");
        assert_eq!(response.headers().get("ratelimit-remaining").unwrap(), "0");
        assert_eq!(response.headers().get("retry-after").unwrap(), "12");
        assert_eq!(body_of(response).await, "Too many requests. Please try again later.");
    }

    #[tokio::test]
    async fn test_handle_unauthorized_rejection() {
        let rejection = warp::reject::custom(ProxyError::Unauthorized);
        let response = handle_rejection(rejection).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_of(response).await, "Unauthorized");
    }

    #[tokio::test]
    async fn test_upstream_failures_hide_details() {
        let cases = [
            (
                ProxyError::Upstream(StatusCode::NOT_FOUND),
                StatusCode::NOT_FOUND,
                "Error fetching from external API",
            ),
            (
                ProxyError::UpstreamUnreachable("connection refused".to_string()),
                StatusCode::BAD_GATEWAY,
                "Bad Gateway",
            ),
            (
                ProxyError::ClientFault("invalid uri".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
            ),
        ];

        for (err, status, message) in cases {
            let response = err.to_response();
            assert_eq!(response.status(), status);
            assert_eq!(
                response.headers().get("content-length").unwrap(),
                &message.len().to_string()
            );
            assert_eq!(body_of(response).await, message);
        }
    }

    #[test]
    fn test_resolve_defaults_query() {
        let request = ProxyRequest::resolve("", "127.0.0.1".to_string(), BASE, "key").unwrap();
        assert_eq!(request.query, "New Delhi");
        assert_eq!(
            request.upstream_url,
            "http://api.weatherstack.com/current?access_key=key&query=New+Delhi"
        );

        let request = ProxyRequest::resolve("query=", "127.0.0.1".to_string(), BASE, "key").unwrap();
        assert_eq!(request.query, "New Delhi");
    }

    #[test]
    fn test_resolve_encodes_query() {
        let request = ProxyRequest::resolve(
            "query=S%C3%A3o%20Paulo&units=m",
            "127.0.0.1".to_string(),
            BASE,
            "key",
        )
        .unwrap();
        assert_eq!(request.query, "São Paulo");
        assert_eq!(
            request.upstream_url,
            "http://api.weatherstack.com/current?access_key=key&query=S%C3%A3o+Paulo"
        );
        assert_eq!(request.client, "127.0.0.1");
    }

    #[test]
    fn test_resolve_rejects_bad_base() {
        let err = ProxyRequest::resolve("query=Paris", "127.0.0.1".to_string(), "not a url", "key")
            .unwrap_err();
        assert!(matches!(err, ProxyError::ClientFault(_)));
    }
}
