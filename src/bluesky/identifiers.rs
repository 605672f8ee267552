//! Syntax checks for AT Protocol identifiers and `at://` URIs.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

use super::ProviderError;

/// Collection NSID of Bluesky posts.
pub const POST_COLLECTION: &str = "app.bsky.feed.post";

const MAX_HANDLE_LEN: usize = 253;
const MAX_DID_LEN: usize = 2048;

lazy_static! {
    static ref HANDLE_REGEX: Regex = Regex::new(concat!(
        r"^([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+",
        r"[a-zA-Z]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$"
    ))
    .unwrap();
    static ref DID_REGEX: Regex =
        Regex::new(r"^did:[a-z]+:[a-zA-Z0-9._:%-]*[a-zA-Z0-9._-]$").unwrap();
    static ref NSID_REGEX: Regex = Regex::new(concat!(
        r"^[a-zA-Z]([a-zA-Z0-9-]*[a-zA-Z0-9])?",
        r"(\.[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?)+$"
    ))
    .unwrap();
    static ref RKEY_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9._:~-]{1,512}$").unwrap();
}

pub fn is_handle(value: &str) -> bool {
    value.len() <= MAX_HANDLE_LEN && HANDLE_REGEX.is_match(value)
}

pub fn is_did(value: &str) -> bool {
    value.len() <= MAX_DID_LEN && DID_REGEX.is_match(value)
}

pub fn is_record_key(value: &str) -> bool {
    value != "." && value != ".." && RKEY_REGEX.is_match(value)
}

/// Trims whitespace and a leading `@` from an actor identifier.
pub fn normalize_actor(actor: &str) -> &str {
    let actor = actor.trim();
    actor.strip_prefix('@').unwrap_or(actor)
}

/// Validates an actor identifier (handle or DID), returning it normalized.
pub fn validate_actor(actor: &str) -> Result<&str, ProviderError> {
    let actor = normalize_actor(actor);
    if is_handle(actor) || is_did(actor) {
        Ok(actor)
    } else {
        Err(ProviderError::InvalidIdentifier(format!(
            "'{}' is not a valid handle or DID",
            actor
        )))
    }
}

pub fn validate_record_key(rkey: &str) -> Result<&str, ProviderError> {
    let rkey = rkey.trim();
    if is_record_key(rkey) {
        Ok(rkey)
    } else {
        Err(ProviderError::InvalidIdentifier(format!(
            "'{}' is not a valid record key",
            rkey
        )))
    }
}

/// A parsed `at://<authority>/<collection>/<rkey>` record URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtUri {
    pub authority: String,
    pub collection: String,
    pub rkey: String,
}

impl AtUri {
    /// The URI of a post record owned by `actor`.
    pub fn post(actor: &str, rkey: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            authority: validate_actor(actor)?.to_string(),
            collection: POST_COLLECTION.to_string(),
            rkey: validate_record_key(rkey)?.to_string(),
        })
    }

    pub fn is_post(&self) -> bool {
        self.collection == POST_COLLECTION
    }
}

impl FromStr for AtUri {
    type Err = ProviderError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            ProviderError::InvalidIdentifier(format!("'{}' is not a valid at:// record URI", raw))
        };

        let rest = raw.trim().strip_prefix("at://").ok_or_else(invalid)?;
        let mut parts = rest.split('/');
        let (Some(authority), Some(collection), Some(rkey), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        if !(is_handle(authority) || is_did(authority))
            || !NSID_REGEX.is_match(collection)
            || !is_record_key(rkey)
        {
            return Err(invalid());
        }

        Ok(Self {
            authority: authority.to_string(),
            collection: collection.to_string(),
            rkey: rkey.to_string(),
        })
    }
}

impl fmt::Display for AtUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at://{}/{}/{}", self.authority, self.collection, self.rkey)
    }
}
