//! Feed collaborator: read-only access to public Bluesky content.
//!
//! [`ContentProvider`] is the seam the ingestion pipeline depends on; [`PublicApiClient`]
//! implements it against the unauthenticated AppView. Web links for display are produced
//! by [`generate_bluesky_web_url`], which never touches the network.

pub mod client;
pub mod identifiers;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use client::PublicApiClient;
pub use identifiers::{normalize_actor, validate_actor, AtUri, POST_COLLECTION};
pub use types::{
    AuthorFeedResponse, FeedFilter, FeedViewPost, Label, PostThread, PostView, ProfileViewBasic,
    ThreadNode,
};

/// Errors from the content provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The caller supplied an identifier the provider cannot accept.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The actor or post does not exist (or is not visible).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The provider answered with an error status.
    #[error("Provider returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The request never got a response (DNS, TLS, timeout, ...).
    #[error("Provider unreachable: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("Unexpected provider response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorFeedParams {
    pub actor: String,
    pub limit: u8,
    pub cursor: Option<String>,
    pub filter: FeedFilter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostThreadParams {
    pub uri: AtUri,
    pub depth: u16,
    pub parent_height: u16,
}

/// Source of external content.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn get_author_feed(
        &self,
        params: &AuthorFeedParams,
    ) -> Result<AuthorFeedResponse, ProviderError>;

    async fn get_post_thread(&self, params: &PostThreadParams) -> Result<PostThread, ProviderError>;
}

/// Builds the display link for a profile, or for one of its posts when `rkey` is given.
///
/// Pure string formatting: the same arguments always give the same URL.
pub fn generate_bluesky_web_url(base: &str, actor: &str, rkey: Option<&str>) -> String {
    let base = base.trim_end_matches('/');
    match rkey {
        Some(rkey) => format!("{}/profile/{}/post/{}", base, actor, rkey),
        None => format!("{}/profile/{}", base, actor),
    }
}

/// Display link for the record behind an `at://` URI.
pub fn web_url_for_post_uri(base: &str, uri: &AtUri) -> String {
    generate_bluesky_web_url(base, &uri.authority, Some(&uri.rkey))
}
