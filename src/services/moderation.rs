// src/services/moderation.rs

//! Post removal.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::error::{DeleteError, Result};
use crate::models::FeedConfig;
use crate::services::Token;
use crate::utils::http::endpoint;

/// Side-effecting removal of a flagged item.
#[async_trait]
pub trait ModerationAction: Send + Sync {
    async fn delete(&self, item_id: u64) -> std::result::Result<(), DeleteError>;
}

/// Deletes posts from a group wall.
pub struct GroupWallModerator {
    client: Client,
    base: String,
    token: Token,
}

impl GroupWallModerator {
    pub fn new(client: Client, config: &FeedConfig, token: Token) -> Result<Self> {
        let base = endpoint(
            &config.delete_base_url,
            &format!("v1/groups/{}/wall/posts", config.group_id),
        )?;
        Ok(Self {
            client,
            base: base.to_string(),
            token,
        })
    }

    pub fn post_url(&self, item_id: u64) -> String {
        format!("{}/{}", self.base, item_id)
    }
}

#[async_trait]
impl ModerationAction for GroupWallModerator {
    async fn delete(&self, item_id: u64) -> std::result::Result<(), DeleteError> {
        let response = self
            .token
            .apply(self.client.delete(self.post_url(item_id)))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }

        Err(DeleteError::Status {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }
}

/// Stands in for a real moderator when deletions are disabled.
#[derive(Debug, Default)]
pub struct DryRunModerator;

#[async_trait]
impl ModerationAction for DryRunModerator {
    async fn delete(&self, item_id: u64) -> std::result::Result<(), DeleteError> {
        log::info!("Dry run: would delete post ID {}", item_id);
        Ok(())
    }
}
