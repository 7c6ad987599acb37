//! Promotion of a suggestion or dialog line into a bookmark draft.
//! Persisting the draft is left to the bookmark store.

use crate::error::{Error, Result};
use crate::types::{DialogTurn, Suggestion};
use serde::{Deserialize, Serialize};

/// Longest text accepted for either side of a bookmark, in characters
pub const MAX_BOOKMARK_TEXT_CHARS: usize = 1000;

/// The two fields a bookmark store needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkDraft {
    pub english_text: String,
    pub japanese_text: String,
}

impl BookmarkDraft {
    pub fn new(english_text: impl Into<String>, japanese_text: impl Into<String>) -> Self {
        Self {
            english_text: english_text.into(),
            japanese_text: japanese_text.into(),
        }
    }

    /// Check the draft before handing it to the store
    pub fn validate(&self) -> Result<()> {
        if self.english_text.is_empty() || self.japanese_text.is_empty() {
            return Err(Error::InvalidBookmark(
                "English text and Japanese translation are both required".to_string(),
            ));
        }

        if self.english_text.chars().count() > MAX_BOOKMARK_TEXT_CHARS
            || self.japanese_text.chars().count() > MAX_BOOKMARK_TEXT_CHARS
        {
            return Err(Error::InvalidBookmark(format!(
                "Text must be at most {} characters",
                MAX_BOOKMARK_TEXT_CHARS
            )));
        }

        Ok(())
    }
}

impl From<&Suggestion> for BookmarkDraft {
    fn from(suggestion: &Suggestion) -> Self {
        Self::new(suggestion.english_text.clone(), suggestion.japanese_text.clone())
    }
}

impl From<&DialogTurn> for BookmarkDraft {
    fn from(turn: &DialogTurn) -> Self {
        Self::new(turn.english_text.clone(), turn.japanese_text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_draft() {
        let draft = BookmarkDraft::new("Nice to meet you", "はじめまして");
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_missing_field_rejected() {
        assert!(BookmarkDraft::new("", "はじめまして").validate().is_err());
        assert!(BookmarkDraft::new("Hello", "").validate().is_err());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 1000 multi-byte characters is still within the limit
        let japanese = "あ".repeat(MAX_BOOKMARK_TEXT_CHARS);
        assert!(BookmarkDraft::new("ok", japanese).validate().is_ok());

        let english = "a".repeat(MAX_BOOKMARK_TEXT_CHARS + 1);
        let err = BookmarkDraft::new(english, "ok").validate().unwrap_err();
        assert!(err.to_string().contains("at most"));
    }

    #[test]
    fn test_from_turn() {
        let turn = DialogTurn::new(crate::Role::A, "Good morning", "おはよう");
        let draft = BookmarkDraft::from(&turn);
        assert_eq!(draft.english_text, "Good morning");
        assert_eq!(draft.japanese_text, "おはよう");
    }
}
