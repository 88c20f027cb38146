#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use crate::config::{
        Config, ConfigError, DEFAULT_CACHE_DURATION_SECS, DEFAULT_PORT,
        DEFAULT_RATE_LIMIT_REQUESTS, DEFAULT_UPSTREAM_BASE,
    };

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("WEATHERSTACK_API_KEY", "key"), ("AUTH_TOKEN", "secret")]).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.rate_limit_requests, DEFAULT_RATE_LIMIT_REQUESTS);
        assert_eq!(config.cache_duration_secs, DEFAULT_CACHE_DURATION_SECS);
        assert_eq!(config.upstream_base, DEFAULT_UPSTREAM_BASE);
        assert!(!config.rate_limit_legacy_headers);
        assert_eq!(config.addr().to_string(), "0.0.0.0:3000");
        assert_eq!(config.rate_limit_window(), Duration::from_secs(60));
        assert_eq!(config.cache_check_period(), Some(Duration::from_secs(600)));
        assert_eq!(config.expected_authorization(), "subscription_key secret");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("WEATHERSTACK_API_KEY", "key"),
            ("AUTH_TOKEN", "secret"),
            ("PORT", "8080"),
            ("RATE_LIMIT", "10"),
            ("CACHE_DURATION", "30"),
            ("CACHE_CHECK_PERIOD", "0"),
            ("RATE_LIMIT_LEGACY_HEADERS", "true"),
            ("WEATHERSTACK_BASE_URL", "http://127.0.0.1:9000/current"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.rate_limit_requests, 10);
        assert_eq!(config.cache_ttl(), Duration::from_secs(30));
        assert_eq!(config.cache_check_period(), None);
        assert!(config.rate_limit_legacy_headers);
        assert_eq!(config.upstream_base, "http://127.0.0.1:9000/current");
    }

    #[test]
    fn test_missing_credentials() {
        let err = load(&[("AUTH_TOKEN", "secret")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("WEATHERSTACK_API_KEY")));

        let err = load(&[("WEATHERSTACK_API_KEY", "key"), ("AUTH_TOKEN", "")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("AUTH_TOKEN")));
    }

    #[test]
    fn test_invalid_numbers() {
        let err = load(&[
            ("WEATHERSTACK_API_KEY", "key"),
            ("AUTH_TOKEN", "secret"),
            ("PORT", "not-a-port"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));

        let err = load(&[
            ("WEATHERSTACK_API_KEY", "key"),
            ("AUTH_TOKEN", "secret"),
            ("RATE_LIMIT", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "RATE_LIMIT", .. }));
    }

    #[test]
    fn test_invalid_upstream_base() {
        for base in ["not a url", "https://api.weatherstack.com/current", "file:///tmp/current"] {
            let err = load(&[
                ("WEATHERSTACK_API_KEY", "key"),
                ("AUTH_TOKEN", "secret"),
                ("WEATHERSTACK_BASE_URL", base),
            ])
            .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { name: "WEATHERSTACK_BASE_URL", ref value } if value == base),
                "{} should be rejected",
                base
            );
        }
    }
}
