use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use super::{ContentModerator, ModerationError, ModerationItem, ModerationVerdict};

#[derive(Serialize)]
struct ModerationRequest<'a> {
    items: &'a [ModerationItem],
}

/// Delegates moderation to an external service.
///
/// The service receives `{"items": [...]}` and answers with a `ModerationVerdict` body.
#[derive(Debug, Clone)]
pub struct HttpModerator {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpModerator {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ModerationError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModerationError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl ContentModerator for HttpModerator {
    async fn moderate_content(
        &self,
        items: &[ModerationItem],
    ) -> Result<ModerationVerdict, ModerationError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&ModerationRequest { items })
            .send()
            .await
            .map_err(|e| ModerationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Moderation service answered {}", status);
            return Err(ModerationError::Status(status.as_u16()));
        }

        response
            .json::<ModerationVerdict>()
            .await
            .map_err(|e| ModerationError::Decode(e.to_string()))
    }
}
