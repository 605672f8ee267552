use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::identifiers::validate_actor;
use super::{
    AuthorFeedParams, AuthorFeedResponse, ContentProvider, PostThread, PostThreadParams,
    ProviderError,
};

const USER_AGENT: &str = concat!("skygate/", env!("CARGO_PKG_VERSION"));

pub const MAX_FEED_LIMIT: u8 = 100;
pub const MAX_THREAD_DEPTH: u16 = 1000;

/// Error body of a failed XRPC call.
#[derive(Debug, Default, Deserialize)]
struct XrpcErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the public (unauthenticated) Bluesky AppView.
#[derive(Debug, Clone)]
pub struct PublicApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl PublicApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, nsid: &str) -> String {
        format!("{}/xrpc/{}", self.base_url, nsid)
    }

    async fn query<T: DeserializeOwned>(
        &self,
        nsid: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        log::debug!("XRPC query {} {:?}", nsid, params);

        let response = self
            .http
            .get(self.endpoint(nsid))
            .query(params)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .bytes()
                .await
                .map_err(|e| ProviderError::Transport(e.to_string()))?;
            return decode(&body);
        }

        let body: XrpcErrorBody = response.json().await.unwrap_or_default();
        let error = classify_error(status.as_u16(), body);
        log::warn!("XRPC query {} failed: {}", nsid, error);
        Err(error)
    }
}

/// Decodes a response body without serde_json's nesting limit.
///
/// Threads requested with a large `depth` or `parentHeight` nest far deeper than the
/// default limit of 128, so the stack is grown on demand instead.
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ProviderError> {
    let mut de = serde_json::Deserializer::from_slice(body);
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))
        .map_err(|e| ProviderError::Decode(e.to_string()))?;
    de.end().map_err(|e| ProviderError::Decode(e.to_string()))?;
    Ok(value)
}

/// Maps an XRPC error response onto a [`ProviderError`].
///
/// The AppView reports missing actors and posts as `400` with an `InvalidRequest` or
/// `NotFound` error name, so the message is checked as well as the status.
fn classify_error(status: u16, body: XrpcErrorBody) -> ProviderError {
    let message = match body.message {
        Some(message) if !message.is_empty() => message,
        _ if !body.error.is_empty() => body.error.clone(),
        _ => format!("HTTP {}", status),
    };

    let not_found = status == 404
        || (status == 400
            && (body.error == "NotFound"
                || (body.error == "InvalidRequest"
                    && message.to_lowercase().contains("not found"))));

    if not_found {
        ProviderError::NotFound(message)
    } else if status == 400 && body.error == "InvalidRequest" {
        ProviderError::InvalidIdentifier(message)
    } else {
        ProviderError::Upstream { status, message }
    }
}

#[async_trait]
impl ContentProvider for PublicApiClient {
    async fn get_author_feed(
        &self,
        params: &AuthorFeedParams,
    ) -> Result<AuthorFeedResponse, ProviderError> {
        let actor = validate_actor(&params.actor)?;

        let mut query = vec![
            ("actor", actor.to_string()),
            ("limit", params.limit.clamp(1, MAX_FEED_LIMIT).to_string()),
            ("filter", params.filter.as_str().to_string()),
        ];
        if let Some(cursor) = &params.cursor {
            query.push(("cursor", cursor.clone()));
        }

        self.query("app.bsky.feed.getAuthorFeed", &query).await
    }

    async fn get_post_thread(
        &self,
        params: &PostThreadParams,
    ) -> Result<PostThread, ProviderError> {
        if !params.uri.is_post() {
            return Err(ProviderError::InvalidIdentifier(format!(
                "{} is not a post URI",
                params.uri
            )));
        }

        let query = [
            ("uri", params.uri.to_string()),
            ("depth", params.depth.min(MAX_THREAD_DEPTH).to_string()),
            (
                "parentHeight",
                params.parent_height.min(MAX_THREAD_DEPTH).to_string(),
            ),
        ];

        self.query("app.bsky.feed.getPostThread", &query).await
    }
}
