//! Response shapes of the `app.bsky.feed` read endpoints.
//!
//! Only the fields the application looks at are typed. Everything else is kept in a
//! flattened `extra` map, and `record`, `embed` and the other open unions stay as raw JSON,
//! so API callers get the provider's data back untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const THREAD_VIEW_POST: &str = "app.bsky.feed.defs#threadViewPost";
pub const NOT_FOUND_POST: &str = "app.bsky.feed.defs#notFoundPost";
pub const BLOCKED_POST: &str = "app.bsky.feed.defs#blockedPost";

/// A moderation label attached to a post or an account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub uri: String,
    pub val: String,
    /// A negation label removes an earlier label with the same value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neg: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Label {
    pub fn is_negation(&self) -> bool {
        self.neg.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileViewBasic {
    pub did: String,
    pub handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<Label>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub uri: String,
    pub cid: String,
    pub author: ProfileViewBasic,
    pub record: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repost_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_count: Option<u64>,
    pub indexed_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<Label>>,
    /// `viewer`, `threadgate` and any field added later.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PostView {
    /// The post's text, or an empty string for records without one.
    pub fn text(&self) -> &str {
        self.record
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Values of every active label on the post and its author.
    pub fn label_values(&self) -> Vec<String> {
        let mut values: Vec<String> = Vec::new();
        let post_labels = self.labels.iter().flatten();
        for label in post_labels.chain(self.author.labels.iter().flatten()) {
            if label.is_negation() {
                values.retain(|v| v != &label.val);
            } else if !values.contains(&label.val) {
                values.push(label.val.clone());
            }
        }
        values
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedViewPost {
    pub post: PostView,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `app.bsky.feed.getAuthorFeed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorFeedResponse {
    pub feed: Vec<FeedViewPost>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// Which posts `getAuthorFeed` includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedFilter {
    #[default]
    PostsWithReplies,
    PostsNoReplies,
    PostsWithMedia,
    PostsAndAuthorThreads,
}

impl FeedFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedFilter::PostsWithReplies => "posts_with_replies",
            FeedFilter::PostsNoReplies => "posts_no_replies",
            FeedFilter::PostsWithMedia => "posts_with_media",
            FeedFilter::PostsAndAuthorThreads => "posts_and_author_threads",
        }
    }
}

/// Response of `app.bsky.feed.getPostThread`.
///
/// The tree stays raw JSON. Node shapes are an open union and a thread can nest up to a
/// thousand levels each way, so nodes are classified one at a time with [`ThreadNode`]
/// and walked iteratively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostThread {
    pub thread: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threadgate: Option<Value>,
}

/// A borrowed view of one thread node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThreadNode<'a> {
    Post {
        post: &'a Value,
        parent: Option<&'a Value>,
        replies: &'a [Value],
    },
    NotFound {
        uri: &'a str,
    },
    Blocked {
        uri: &'a str,
    },
    Unknown,
}

impl<'a> ThreadNode<'a> {
    pub fn classify(node: &'a Value) -> Self {
        let uri = node.get("uri").and_then(Value::as_str).unwrap_or_default();
        match node.get("$type").and_then(Value::as_str) {
            Some(THREAD_VIEW_POST) => match node.get("post") {
                Some(post) => ThreadNode::Post {
                    post,
                    parent: node.get("parent"),
                    replies: node
                        .get("replies")
                        .and_then(Value::as_array)
                        .map(Vec::as_slice)
                        .unwrap_or_default(),
                },
                None => ThreadNode::Unknown,
            },
            Some(NOT_FOUND_POST) => ThreadNode::NotFound { uri },
            Some(BLOCKED_POST) => ThreadNode::Blocked { uri },
            _ => ThreadNode::Unknown,
        }
    }
}

impl PostThread {
    /// Every visible post in the thread: ancestors first, then the anchor, then replies
    /// depth-first. Placeholder nodes are skipped.
    pub fn posts(&self) -> Result<Vec<PostView>, serde_json::Error> {
        let ThreadNode::Post {
            post,
            parent,
            replies,
        } = ThreadNode::classify(&self.thread)
        else {
            return Ok(Vec::new());
        };

        let mut ancestors = Vec::new();
        let mut next = parent.map(ThreadNode::classify);
        while let Some(ThreadNode::Post { post, parent, .. }) = next {
            ancestors.push(post);
            next = parent.map(ThreadNode::classify);
        }

        let mut raw: Vec<&Value> = ancestors.into_iter().rev().collect();
        raw.push(post);

        let mut pending: Vec<&Value> = replies.iter().rev().collect();
        while let Some(node) = pending.pop() {
            if let ThreadNode::Post { post, replies, .. } = ThreadNode::classify(node) {
                raw.push(post);
                pending.extend(replies.iter().rev());
            }
        }

        raw.into_iter().map(PostView::deserialize).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post_json(uri: &str, text: &str) -> Value {
        json!({
            "uri": uri,
            "cid": "bafyreib",
            "author": { "did": "did:plc:abc", "handle": "alice.bsky.social" },
            "record": {
                "$type": "app.bsky.feed.post",
                "text": text,
                "createdAt": "2024-01-01T00:00:00Z"
            },
            "indexedAt": "2024-01-01T00:00:01Z",
            "likeCount": 3
        })
    }

    fn node(post: Value) -> Value {
        json!({ "$type": THREAD_VIEW_POST, "post": post })
    }

    #[test]
    fn test_author_feed_deserializes() {
        let raw = json!({
            "feed": [{ "post": post_json("at://did:plc:abc/app.bsky.feed.post/1", "hello") }],
            "cursor": "2024-01-01T00:00:00Z"
        });
        let feed: AuthorFeedResponse = serde_json::from_value(raw).unwrap();

        assert_eq!(feed.feed.len(), 1);
        assert_eq!(feed.feed[0].post.text(), "hello");
        assert_eq!(feed.feed[0].post.like_count, Some(3));
        assert_eq!(feed.cursor.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_feed_keeps_fields_it_does_not_type() {
        let mut post = post_json("at://did:plc:abc/app.bsky.feed.post/1", "hello");
        post["viewer"] = json!({ "like": "at://did:plc:me/app.bsky.feed.like/1" });
        post["threadgate"] = json!({ "uri": "at://did:plc:abc/app.bsky.feed.threadgate/1" });
        post["author"]["viewer"] = json!({ "muted": false });
        post["labels"] = json!([{
            "src": "did:plc:mod",
            "uri": "at://did:plc:abc/app.bsky.feed.post/1",
            "val": "!warn",
            "neg": false,
            "cts": "2024-01-01T00:00:00Z"
        }]);
        let raw = json!({
            "feed": [{
                "post": post,
                "reason": { "$type": "app.bsky.feed.defs#reasonRepost" },
                "feedContext": "ctx"
            }],
            "cursor": "next"
        });

        let feed: AuthorFeedResponse = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&feed).unwrap(), raw);
    }

    #[test]
    fn test_thread_posts_are_ordered_and_skip_placeholders() {
        let mut anchor = node(post_json("at://did:plc:abc/app.bsky.feed.post/anchor", "anchor"));
        anchor["parent"] = node(post_json("at://did:plc:abc/app.bsky.feed.post/root", "root"));
        let mut first = node(post_json("at://did:plc:abc/app.bsky.feed.post/r1", "reply one"));
        first["replies"] = json!([node(post_json(
            "at://did:plc:abc/app.bsky.feed.post/r1a",
            "nested"
        ))]);
        anchor["replies"] = json!([
            first,
            {
                "$type": BLOCKED_POST,
                "uri": "at://did:plc:x/app.bsky.feed.post/b",
                "blocked": true
            },
            { "$type": "app.bsky.feed.defs#somethingNew" },
            node(post_json("at://did:plc:abc/app.bsky.feed.post/r2", "reply two"))
        ]);

        let thread: PostThread = serde_json::from_value(json!({ "thread": anchor })).unwrap();
        let texts: Vec<String> = thread
            .posts()
            .unwrap()
            .iter()
            .map(|p| p.text().to_string())
            .collect();

        assert_eq!(texts, vec!["root", "anchor", "reply one", "nested", "reply two"]);
    }

    #[test]
    fn test_thread_placeholders_survive_serialization() {
        let raw = json!({
            "thread": {
                "$type": THREAD_VIEW_POST,
                "post": post_json("at://did:plc:abc/app.bsky.feed.post/anchor", "anchor"),
                "replies": [
                    {
                        "$type": BLOCKED_POST,
                        "uri": "at://did:plc:x/app.bsky.feed.post/b",
                        "blocked": true,
                        "author": { "did": "did:plc:x", "viewer": { "blockedBy": true } }
                    },
                    { "$type": "app.bsky.feed.defs#somethingNew", "foo": 1 }
                ]
            },
            "threadgate": { "uri": "at://did:plc:abc/app.bsky.feed.threadgate/anchor" }
        });

        let thread: PostThread = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&thread).unwrap(), raw);
        assert_eq!(
            ThreadNode::classify(&thread.thread["replies"][0]),
            ThreadNode::Blocked {
                uri: "at://did:plc:x/app.bsky.feed.post/b"
            }
        );
        assert_eq!(
            ThreadNode::classify(&thread.thread["replies"][1]),
            ThreadNode::Unknown
        );
    }

    #[test]
    fn test_not_found_thread_has_no_posts() {
        let raw = json!({
            "thread": {
                "$type": NOT_FOUND_POST,
                "uri": "at://x/app.bsky.feed.post/y",
                "notFound": true
            }
        });
        let thread: PostThread = serde_json::from_value(raw).unwrap();
        assert!(thread.posts().unwrap().is_empty());
    }

    #[test]
    fn test_deep_parent_chain_is_walked() {
        let mut thread = node(post_json("at://did:plc:abc/app.bsky.feed.post/0", "top"));
        for i in 1..=400 {
            let mut child = node(post_json(
                &format!("at://did:plc:abc/app.bsky.feed.post/{}", i),
                "reply",
            ));
            child["parent"] = thread;
            thread = child;
        }

        let posts = PostThread {
            thread,
            threadgate: None,
        }
        .posts()
        .unwrap();
        assert_eq!(posts.len(), 401);
        assert_eq!(posts[0].text(), "top");
    }

    #[test]
    fn test_label_values_apply_negation() {
        let mut post: PostView =
            serde_json::from_value(post_json("at://did:plc:abc/app.bsky.feed.post/1", "x"))
                .unwrap();
        post.labels = Some(vec![
            Label {
                val: "porn".into(),
                ..Label::default()
            },
            Label {
                val: "porn".into(),
                neg: Some(true),
                ..Label::default()
            },
        ]);
        post.author.labels = Some(vec![Label {
            src: "did:plc:mod".into(),
            uri: "did:plc:abc".into(),
            val: "!warn".into(),
            ..Label::default()
        }]);

        assert_eq!(post.label_values(), vec!["!warn".to_string()]);
    }
}
