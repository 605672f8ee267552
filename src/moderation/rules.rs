use async_trait::async_trait;
use regex::Regex;

use super::{ContentModerator, FlaggedItem, ModerationError, ModerationItem, ModerationVerdict};

/// Label values that hide content outright.
pub const HIDE_LABELS: [&str; 7] = [
    "!hide",
    "!takedown",
    "porn",
    "sexual",
    "nudity",
    "graphic-media",
    "gore",
];

/// Local moderation: hide-level labels and muted words.
#[derive(Debug, Clone)]
pub struct RuleModerator {
    muted: Vec<(String, Regex)>,
}

impl RuleModerator {
    /// Builds a moderator from a muted-word list. Matching is whole-word and
    /// case-insensitive; blank entries are ignored.
    pub fn new<I, S>(muted_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let muted = muted_words
            .into_iter()
            .filter_map(|word| {
                let word = word.as_ref().trim().to_lowercase();
                if word.is_empty() {
                    return None;
                }
                let pattern = format!(r"(?i)(^|\W){}($|\W)", regex::escape(&word));
                Regex::new(&pattern).ok().map(|re| (word, re))
            })
            .collect();
        Self { muted }
    }

    fn check(&self, item: &ModerationItem) -> Option<String> {
        if let Some(label) = item
            .labels
            .iter()
            .find(|label| HIDE_LABELS.contains(&label.as_str()))
        {
            return Some(format!("Content labeled: {}", label));
        }

        self.muted
            .iter()
            .find(|(_, re)| re.is_match(&item.text))
            .map(|(word, _)| format!("Contains muted word: {}", word))
    }
}

impl Default for RuleModerator {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

#[async_trait]
impl ContentModerator for RuleModerator {
    async fn moderate_content(
        &self,
        items: &[ModerationItem],
    ) -> Result<ModerationVerdict, ModerationError> {
        let flagged = items
            .iter()
            .filter_map(|item| {
                self.check(item).map(|reason| FlaggedItem {
                    uri: item.uri.clone(),
                    reason,
                })
            })
            .collect();
        Ok(ModerationVerdict::from_flags(flagged))
    }
}
