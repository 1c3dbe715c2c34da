// src/services/feed.rs

//! Group wall feed source.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::error::{FeedError, Result};
use crate::models::{Cursor, FeedConfig, Page, WallPostsResponse};
use crate::services::Token;
use crate::utils::http::endpoint;

/// Paginated source of feed items.
///
/// A single call performs a single request. Rate-limit handling is left to
/// the caller, which retries the same cursor.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_page(&self, cursor: Option<&Cursor>) -> std::result::Result<Page, FeedError>;
}

/// Reads a group wall, newest posts first.
pub struct GroupWallFeed {
    client: Client,
    endpoint: Url,
    batch_size: u32,
    token: Token,
}

impl GroupWallFeed {
    pub fn new(client: Client, config: &FeedConfig, token: Token) -> Result<Self> {
        let endpoint = endpoint(
            &config.feed_base_url,
            &format!("v2/groups/{}/wall/posts", config.group_id),
        )?;
        Ok(Self {
            client,
            endpoint,
            batch_size: config.batch_size,
            token,
        })
    }

    /// Listing URL for one page.
    pub fn page_url(&self, cursor: Option<&Cursor>) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("sortOrder", "Desc");
            query.append_pair("limit", &self.batch_size.to_string());
            if let Some(cursor) = cursor {
                query.append_pair("cursor", cursor.as_str());
            }
        }
        url
    }
}

#[async_trait]
impl FeedSource for GroupWallFeed {
    async fn fetch_page(&self, cursor: Option<&Cursor>) -> std::result::Result<Page, FeedError> {
        let response = self
            .token
            .apply(self.client.get(self.page_url(cursor)))
            .send()
            .await?;

        let status = response.status();
        log::debug!("Group wall posts response status: {}", status);

        match status {
            StatusCode::OK => {
                let body = response.text().await?;
                let parsed: WallPostsResponse =
                    serde_json::from_str(&body).map_err(FeedError::transient)?;
                Ok(parsed.into())
            }
            StatusCode::TOO_MANY_REQUESTS => Err(FeedError::RateLimited),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(FeedError::Auth {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(FeedError::Transient(format!(
                    "unexpected status {}: {}",
                    status, body
                )))
            }
        }
    }
}
