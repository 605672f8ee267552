//! External-content ingestion pipeline.
//!
//! One invocation runs strictly in order: fetch from the [`ContentProvider`], moderate the
//! fetched posts with a single [`ContentModerator`] call, build the canonical web URL, then
//! assemble [`IngestedContent`]. A failed fetch returns before moderation is attempted, and a
//! failed moderation returns no payload at all.

use serde::Serialize;
use std::sync::Arc;

use crate::bluesky::{
    generate_bluesky_web_url, normalize_actor, web_url_for_post_uri, AuthorFeedParams,
    AuthorFeedResponse, ContentProvider, PostThread, PostThreadParams, PostView, ProviderError,
};
use crate::error::AppError;
use crate::moderation::{ContentModerator, ModerationItem, ModerationVerdict};

/// What to fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentRequest {
    AuthorFeed(AuthorFeedParams),
    PostThread(PostThreadParams),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    Feed,
    Thread,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContentData {
    Feed(AuthorFeedResponse),
    Thread(PostThread),
}

/// Normalized response of the ingestion route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestedContent {
    pub mode: ContentMode,
    pub web_url: String,
    pub data: ContentData,
    pub moderation: ModerationVerdict,
}

pub struct ContentIngestor {
    provider: Arc<dyn ContentProvider>,
    moderator: Arc<dyn ContentModerator>,
    web_base_url: String,
}

impl ContentIngestor {
    pub fn new(
        provider: Arc<dyn ContentProvider>,
        moderator: Arc<dyn ContentModerator>,
        web_base_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            moderator,
            web_base_url: web_base_url.into(),
        }
    }

    pub async fn ingest(&self, request: &ContentRequest) -> Result<IngestedContent, AppError> {
        match request {
            ContentRequest::AuthorFeed(params) => {
                let feed = self.provider.get_author_feed(params).await?;
                let moderation = self.moderate(feed.feed.iter().map(|item| &item.post)).await?;
                let actor = normalize_actor(&params.actor);
                let web_url = generate_bluesky_web_url(&self.web_base_url, actor, None);

                log::info!(
                    "Ingested {} feed items for {} ({:?})",
                    feed.feed.len(),
                    params.actor,
                    moderation.status
                );
                Ok(IngestedContent {
                    mode: ContentMode::Feed,
                    web_url,
                    data: ContentData::Feed(feed),
                    moderation,
                })
            }
            ContentRequest::PostThread(params) => {
                let thread = self.provider.get_post_thread(params).await?;
                let posts = thread
                    .posts()
                    .map_err(|e| ProviderError::Decode(e.to_string()))?;
                let moderation = self.moderate(posts.iter()).await?;
                let web_url = web_url_for_post_uri(&self.web_base_url, &params.uri);

                log::info!("Ingested thread {} ({:?})", params.uri, moderation.status);
                Ok(IngestedContent {
                    mode: ContentMode::Thread,
                    web_url,
                    data: ContentData::Thread(thread),
                    moderation,
                })
            }
        }
    }

    /// Empty content is allowed without a moderation round trip.
    async fn moderate<'a>(
        &self,
        posts: impl Iterator<Item = &'a PostView>,
    ) -> Result<ModerationVerdict, AppError> {
        let items: Vec<ModerationItem> = posts.map(ModerationItem::from_post).collect();
        if items.is_empty() {
            return Ok(ModerationVerdict::allowed());
        }

        self.moderator.moderate_content(&items).await.map_err(|e| {
            log::error!("Moderation of {} items failed: {}", items.len(), e);
            AppError::from(e)
        })
    }
}
