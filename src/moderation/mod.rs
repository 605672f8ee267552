//! Moderation collaborator.
//!
//! The ingestion pipeline hands every fetched post to a [`ContentModerator`] in one call
//! and gets back a single [`ModerationVerdict`]. Two implementations exist: local rules
//! ([`RuleModerator`]) and a remote moderation service ([`HttpModerator`]).

pub mod remote;
pub mod rules;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bluesky::PostView;

pub use remote::HttpModerator;
pub use rules::RuleModerator;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Moderation service unreachable: {0}")]
    Transport(String),

    #[error("Moderation service returned status {0}")]
    Status(u16),

    #[error("Unexpected moderation response: {0}")]
    Decode(String),
}

/// One piece of content to moderate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationItem {
    pub uri: String,
    pub author: String,
    pub text: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl ModerationItem {
    pub fn from_post(post: &PostView) -> Self {
        Self {
            uri: post.uri.clone(),
            author: post.author.handle.clone(),
            text: post.text().to_string(),
            labels: post.label_values(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    Allowed,
    Flagged,
}

/// Why a single item was flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedItem {
    pub uri: String,
    pub reason: String,
}

/// Outcome of moderating a batch of content.
///
/// `flagged` lists every offending item; `reason` summarises the first one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub status: VerdictStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub flagged: Vec<FlaggedItem>,
}

impl ModerationVerdict {
    pub fn allowed() -> Self {
        Self {
            status: VerdictStatus::Allowed,
            reason: None,
            flagged: Vec::new(),
        }
    }

    /// Builds the verdict for a batch from its per-item findings.
    pub fn from_flags(flagged: Vec<FlaggedItem>) -> Self {
        match flagged.first() {
            None => Self::allowed(),
            Some(first) => {
                let reason = if flagged.len() == 1 {
                    first.reason.clone()
                } else {
                    format!("{} (and {} more)", first.reason, flagged.len() - 1)
                };
                Self {
                    status: VerdictStatus::Flagged,
                    reason: Some(reason),
                    flagged,
                }
            }
        }
    }

    pub fn is_flagged(&self) -> bool {
        self.status == VerdictStatus::Flagged
    }
}

#[async_trait]
pub trait ContentModerator: Send + Sync {
    async fn moderate_content(
        &self,
        items: &[ModerationItem],
    ) -> Result<ModerationVerdict, ModerationError>;
}
