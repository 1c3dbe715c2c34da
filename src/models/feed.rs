//! Feed page data structures and their wire format.

use serde::Deserialize;

/// Opaque pagination token.
///
/// Handed out by the feed and passed back verbatim; the pipeline never
/// builds or inspects one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Cursor {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Cursor {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

/// A single wall post.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedItem {
    /// Post identifier, used for deletion
    pub id: u64,

    /// Post text. Absent or null bodies are treated as empty.
    #[serde(default)]
    pub body: Option<String>,
}

impl FeedItem {
    pub fn new(id: u64, body: impl Into<String>) -> Self {
        Self {
            id,
            body: Some(body.into()),
        }
    }

    /// Post text, or the empty string when the field was missing.
    pub fn text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

/// One page of the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Items in feed order
    pub items: Vec<FeedItem>,

    /// Token for the following page; `None` once traversal is complete
    pub next_cursor: Option<Cursor>,
}

impl Page {
    pub fn new(items: Vec<FeedItem>, next_cursor: Option<Cursor>) -> Self {
        Self { items, next_cursor }
    }

    /// Final page with no continuation.
    pub fn last(items: Vec<FeedItem>) -> Self {
        Self::new(items, None)
    }
}

/// Wall listing response body.
#[derive(Debug, Clone, Deserialize)]
pub struct WallPostsResponse {
    #[serde(default)]
    pub data: Vec<FeedItem>,

    #[serde(default, rename = "nextPageCursor")]
    pub next_page_cursor: Option<String>,
}

impl From<WallPostsResponse> for Page {
    fn from(response: WallPostsResponse) -> Self {
        // Upstream sometimes sends "" instead of null on the last page.
        let next_cursor = response
            .next_page_cursor
            .filter(|c| !c.is_empty())
            .map(Cursor::from);
        Page::new(response.data, next_cursor)
    }
}
