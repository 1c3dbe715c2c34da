// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use url::Url;

use crate::error::Result;
use crate::models::FeedConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &FeedConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Join a base URL and a relative path, tolerating a trailing slash on the base.
pub fn endpoint(base: &str, path: &str) -> Result<Url> {
    let url = Url::parse(&format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_with_single_slash() {
        let a = endpoint("https://groups.roblox.com", "v2/groups/1/wall/posts").unwrap();
        let b = endpoint("https://groups.roblox.com/", "/v2/groups/1/wall/posts").unwrap();
        assert_eq!(a.as_str(), "https://groups.roblox.com/v2/groups/1/wall/posts");
        assert_eq!(a, b);
    }

    #[test]
    fn test_endpoint_rejects_garbage_base() {
        assert!(endpoint("not a url", "x").is_err());
    }

    #[test]
    fn test_client_builds_from_defaults() {
        assert!(create_async_client(&FeedConfig::default()).is_ok());
    }
}
