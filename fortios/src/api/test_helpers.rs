//! Test helpers for the FortiOS API

pub fn create_test_client(url: &str) -> super::Client {
    let retry = super::RetryConfig {
        max_retries: 0,
        ..Default::default()
    };
    super::Client::with_config(url, "test-token", true, None, retry).unwrap()
}

#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_retry_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_backoff_ms, 100);
        assert_eq!(config.max_backoff_ms, 10000);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_api_query_params() {
        let params = ApiQueryParams::new()
            .add("datasource", 1)
            .vdom(Some("root"))
            .add_optional("none", None::<String>);

        let query = params.to_query_string();
        assert!(query.contains("datasource=1"));
        assert!(query.contains("vdom=root"));
        assert!(!query.contains("none="));
    }

    #[test]
    fn test_query_params_drop_empty_vdom() {
        assert_eq!(ApiQueryParams::new().vdom(Some("")).to_query_string(), "");
        assert_eq!(ApiQueryParams::new().vdom(None).to_query_string(), "");
    }

    #[test]
    fn test_response_mkey_rendering() {
        let response: FortiResponse =
            serde_json::from_str(r#"{"status":"success","http_status":200,"mkey":12}"#).unwrap();
        assert_eq!(response.mkey_string().as_deref(), Some("12"));

        let response: FortiResponse =
            serde_json::from_str(r#"{"status":"success","mkey":"web"}"#).unwrap();
        assert_eq!(response.mkey_string().as_deref(), Some("web"));
    }

    #[test]
    fn test_api_error_formatting() {
        let details = ApiErrorDetails {
            code: Some(-3),
            cli_error: None,
        };

        let error = ApiError::ApiError {
            status: 400,
            message: "Bad Request".to_string(),
            details: Some(Box::new(details)),
        };

        let error_str = error.to_string();
        assert!(error_str.contains("HTTP 400"));
        assert!(error_str.contains("Bad Request"));
    }
}
