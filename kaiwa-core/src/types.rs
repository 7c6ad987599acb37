use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Abstract speaker role inside a dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    A,
    B,
}

impl Role {
    /// Every role, in display order
    pub const ALL: [Role; 2] = [Role::A, Role::B];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::A => "A",
            Role::B => "B",
        }
    }

    /// Label shown to the learner ("Person A" / "Person B")
    pub fn label(&self) -> &'static str {
        match self {
            Role::A => "Person A",
            Role::B => "Person B",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Role {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Role::A),
            "B" | "b" => Ok(Role::B),
            other => Err(crate::Error::InvalidRole(other.to_string())),
        }
    }
}

/// One spoken line of a dialog.
///
/// Turns synthesized from a single suggestion carry no speaker; playback
/// then falls back to the runtime's default voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogTurn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<Role>,
    pub english_text: String,
    #[serde(default)]
    pub japanese_text: String,
}

impl DialogTurn {
    pub fn new(speaker: Role, english_text: impl Into<String>, japanese_text: impl Into<String>) -> Self {
        Self {
            speaker: Some(speaker),
            english_text: english_text.into(),
            japanese_text: japanese_text.into(),
        }
    }

    /// Turn without a speaker role
    pub fn unattributed(english_text: impl Into<String>, japanese_text: impl Into<String>) -> Self {
        Self {
            speaker: None,
            english_text: english_text.into(),
            japanese_text: japanese_text.into(),
        }
    }
}

impl From<&Suggestion> for DialogTurn {
    fn from(suggestion: &Suggestion) -> Self {
        DialogTurn::unattributed(suggestion.english_text.clone(), suggestion.japanese_text.clone())
    }
}

/// Example sentence pair extracted from one model response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// List key, unique within one extraction call only
    pub id: String,
    pub english_text: String,
    pub japanese_text: String,
    /// 1-based position within the batch
    pub index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::A.label(), "Person A");
        assert_eq!(Role::B.to_string(), "Person B");
        assert_eq!(Role::ALL.len(), 2);
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("A".parse::<Role>().unwrap(), Role::A);
        assert_eq!(" b ".parse::<Role>().unwrap(), Role::B);
        assert!("C".parse::<Role>().is_err());
    }

    #[test]
    fn test_dialog_turn_json_shape() {
        let json = r#"{"speaker":"B","englishText":"See you","japaneseText":"またね"}"#;
        let turn: DialogTurn = serde_json::from_str(json).unwrap();
        assert_eq!(turn.speaker, Some(Role::B));
        assert_eq!(turn.english_text, "See you");

        let unattributed = DialogTurn::unattributed("Hi", "");
        let encoded = serde_json::to_string(&unattributed).unwrap();
        assert!(!encoded.contains("speaker"));
    }

    #[test]
    fn test_turn_from_suggestion_has_no_speaker() {
        let suggestion = Suggestion {
            id: "suggestion-1-0".to_string(),
            english_text: "Hi".to_string(),
            japanese_text: "こんにちは".to_string(),
            index: 1,
        };
        let turn = DialogTurn::from(&suggestion);
        assert!(turn.speaker.is_none());
        assert_eq!(turn.japanese_text, "こんにちは");
    }
}
