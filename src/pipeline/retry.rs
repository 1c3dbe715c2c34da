//! Rate-limit retry around page fetches.
//!
//! Policy: on a rate-limited response, wait a fixed delay and repeat the same
//! request. There is no retry cap; upstream decides when the request goes
//! through, and a stuck run is ended by stopping the process.

use std::time::Duration;

use crate::error::FeedError;
use crate::models::{Cursor, Page, RunCounters};
use crate::services::FeedSource;

/// Fetch one page, retrying rate-limited attempts with the identical cursor.
///
/// Only `counters.rate_limit_retries` is touched. Auth and transient errors
/// are returned to the caller untouched.
pub async fn fetch_with_retry(
    feed: &dyn FeedSource,
    cursor: Option<&Cursor>,
    delay: Duration,
    counters: &mut RunCounters,
) -> Result<Page, FeedError> {
    loop {
        match feed.fetch_page(cursor).await {
            Err(FeedError::RateLimited) => {
                counters.rate_limit_retries += 1;
                log::warn!(
                    "Rate limit hit. Waiting {:?} before retrying (retry #{})...",
                    delay,
                    counters.rate_limit_retries
                );
                tokio::time::sleep(delay).await;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeedItem;
    use crate::pipeline::testing::ScriptedFeed;

    #[tokio::test(start_paused = true)]
    async fn test_retries_same_cursor_after_fixed_delay() {
        let feed = ScriptedFeed::new(vec![
            Err(FeedError::RateLimited),
            Err(FeedError::RateLimited),
            Ok(Page::last(vec![FeedItem::new(1, "hi")])),
        ]);
        let cursor = Cursor::from("page-2");
        let mut counters = RunCounters::default();

        let started = tokio::time::Instant::now();
        let page = fetch_with_retry(&feed, Some(&cursor), Duration::from_secs(5), &mut counters)
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert!(started.elapsed() >= Duration::from_secs(10));
        assert_eq!(counters.rate_limit_retries, 2);
        assert_eq!(counters.pages_fetched, 0);
        assert_eq!(counters.items_processed, 0);
        assert_eq!(
            feed.requested_cursors(),
            vec![
                Some("page-2".to_string()),
                Some("page-2".to_string()),
                Some("page-2".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_auth_error_is_not_retried() {
        let feed = ScriptedFeed::new(vec![Err(FeedError::Auth {
            status: 401,
            body: String::new(),
        })]);
        let mut counters = RunCounters::default();

        let result = fetch_with_retry(&feed, None, Duration::ZERO, &mut counters).await;

        assert!(matches!(result, Err(FeedError::Auth { status: 401, .. })));
        assert_eq!(feed.requested_cursors(), vec![None]);
        assert_eq!(counters.rate_limit_retries, 0);
    }

    #[tokio::test]
    async fn test_transient_error_is_returned() {
        let feed = ScriptedFeed::new(vec![Err(FeedError::transient("boom"))]);
        let mut counters = RunCounters::default();

        let result = fetch_with_retry(&feed, None, Duration::ZERO, &mut counters).await;
        assert_eq!(result, Err(FeedError::Transient("boom".to_string())));
    }
}
