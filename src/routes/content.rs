use actix_web::{get, web, HttpResponse, Responder};
use serde::Deserialize;
use validator::Validate;

use crate::auth::AuthenticatedUserId;
use crate::bluesky::{AtUri, AuthorFeedParams, FeedFilter, PostThreadParams};
use crate::error::AppError;
use crate::ingestion::{ContentIngestor, ContentRequest};

pub const DEFAULT_FEED_LIMIT: u8 = 30;
pub const DEFAULT_THREAD_DEPTH: u16 = 6;
pub const DEFAULT_PARENT_HEIGHT: u16 = 80;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentModeParam {
    #[default]
    Feed,
    Thread,
}

/// Query parameters of `GET /api/content`.
#[derive(Debug, Deserialize, Validate)]
pub struct ContentQuery {
    #[serde(default)]
    pub mode: ContentModeParam,
    /// Handle or DID. Required in feed mode; in thread mode, combined with `post`.
    pub actor: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
    pub cursor: Option<String>,
    #[serde(default)]
    pub filter: FeedFilter,
    /// `at://` URI of the thread's anchor post.
    pub uri: Option<String>,
    /// Record key of the anchor post, used with `actor` when `uri` is absent.
    pub post: Option<String>,
    #[validate(range(max = 1000))]
    pub depth: Option<u32>,
    #[validate(range(max = 1000))]
    pub parent_height: Option<u32>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Narrows an already range-checked parameter, falling back to `default` when absent.
fn narrowed<T: TryFrom<u32>>(value: Option<u32>, default: T) -> T {
    value.and_then(|v| T::try_from(v).ok()).unwrap_or(default)
}

impl ContentQuery {
    /// Checks the request shape and turns it into a provider request.
    ///
    /// Identifier syntax is left to the provider, except that thread URIs must parse.
    pub fn into_request(self) -> Result<ContentRequest, AppError> {
        self.validate()?;

        match self.mode {
            ContentModeParam::Feed => {
                let actor = non_empty(self.actor)
                    .ok_or_else(|| AppError::BadRequest("actor is required in feed mode".into()))?;
                Ok(ContentRequest::AuthorFeed(AuthorFeedParams {
                    actor,
                    limit: narrowed(self.limit, DEFAULT_FEED_LIMIT),
                    cursor: non_empty(self.cursor),
                    filter: self.filter,
                }))
            }
            ContentModeParam::Thread => {
                let uri = match (non_empty(self.uri), non_empty(self.actor), non_empty(self.post)) {
                    (Some(uri), _, _) => uri.parse::<AtUri>()?,
                    (None, Some(actor), Some(post)) => AtUri::post(&actor, &post)?,
                    _ => {
                        return Err(AppError::BadRequest(
                            "thread mode needs either uri, or actor and post".into(),
                        ))
                    }
                };
                if !uri.is_post() {
                    return Err(AppError::BadRequest(format!("{} is not a post URI", uri)));
                }
                Ok(ContentRequest::PostThread(PostThreadParams {
                    uri,
                    depth: narrowed(self.depth, DEFAULT_THREAD_DEPTH),
                    parent_height: narrowed(self.parent_height, DEFAULT_PARENT_HEIGHT),
                }))
            }
        }
    }
}

/// Fetch and moderate external content
///
/// Fetches an author feed (`mode=feed`, the default) or a post thread (`mode=thread`)
/// from Bluesky, moderates it, and returns `{mode, web_url, data, moderation}`.
///
/// ## Responses:
/// - `200 OK`: the normalized payload; a flagged verdict is still a 200.
/// - `400 Bad Request`: missing parameters or malformed identifiers.
/// - `401 Unauthorized`: no valid session.
/// - `404 Not Found`: the actor or post does not exist.
/// - `422 Unprocessable Entity`: `limit`, `depth` or `parent_height` out of range.
/// - `502 Bad Gateway`: the content provider failed.
/// - `503 Service Unavailable`: the moderation service failed.
#[get("/content")]
pub async fn get_content(
    ingestor: web::Data<ContentIngestor>,
    query: web::Query<ContentQuery>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let request = query.into_inner().into_request()?;
    log::debug!("User {} requested {:?}", user.0, request);

    let content = ingestor.ingest(&request).await?;
    Ok(HttpResponse::Ok().json(content))
}
