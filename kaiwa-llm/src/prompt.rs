//! Suggestion prompt construction. Sending the prompt is the job of the
//! streaming transport.

use crate::config::SuggestionConfig;
use crate::error::{LlmError, Result};
use crate::extractor::{ENGLISH_FIELD, JAPANESE_FIELD};
use serde::Serialize;

/// Greeting shown before the learner's first request
pub const GREETING: &str = "こんにちは！今日はどんな英語を学びたいですか？";

/// Prompt pair for one suggestion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionPrompt {
    pub model: String,
    pub system: String,
    pub user: String,
}

impl SuggestionPrompt {
    /// Build the prompt for what the learner asked about
    pub fn build(user_input: &str, config: &SuggestionConfig) -> Result<Self> {
        config.validate().map_err(LlmError::Config)?;

        let topic = user_input.trim();
        if topic.is_empty() {
            return Err(LlmError::EmptyInput);
        }

        let count = config.suggestion_count;
        let system = format!(
            "You are an assistant helping Japanese speakers learn English. \
             Based on the learner's request, propose {count} practical English expressions. \
             Every proposal must be a JSON object of the form \
             {{\"{ENGLISH_FIELD}\": \"English sentence\", \"{JAPANESE_FIELD}\": \"Japanese translation\"}}. \
             Return the {count} proposals as a JSON array and nothing else."
        );

        let user = format!(
            "The learner wants to learn about \"{topic}\". Suggest {count} related English expressions.\n\n\
             Answer only with a JSON array shaped like this:\n{}\n\nDo not add any explanation outside the JSON.",
            example_array(count)
        );

        Ok(Self {
            model: config.model.clone(),
            system,
            user,
        })
    }

    /// Initial assistant message
    pub fn greeting() -> &'static str {
        GREETING
    }
}

/// Read the API key named by the config from the environment
pub fn require_api_key(config: &SuggestionConfig) -> Result<String> {
    match std::env::var(&config.api_key_env) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(LlmError::MissingApiKey(config.api_key_env.clone())),
    }
}

fn example_array(count: usize) -> String {
    let entries: Vec<String> = (1..=count)
        .map(|n| {
            format!(
                "  {{\n    \"{ENGLISH_FIELD}\": \"English sentence {n}\",\n    \"{JAPANESE_FIELD}\": \"Japanese translation {n}\"\n  }}"
            )
        })
        .collect();
    format!("[\n{}\n]", entries.join(",\n"))
}
