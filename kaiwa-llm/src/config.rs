use serde::{Deserialize, Serialize};

/// Settings for the suggestion request sent to the language model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Model identifier passed to the hosted API
    pub model: String,

    /// How many expressions to ask for
    pub suggestion_count: usize,

    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            suggestion_count: 3,
            api_key_env: "GOOGLE_GENERATIVE_AI_API_KEY".to_string(),
        }
    }
}

impl SuggestionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }

        if self.suggestion_count == 0 || self.suggestion_count > 10 {
            return Err("Suggestion count must be between 1 and 10".to_string());
        }

        if self.api_key_env.is_empty() {
            return Err("API key environment variable name cannot be empty".to_string());
        }

        if !self.api_key_env.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err("API key environment variable name contains invalid characters".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SuggestionConfig::default();
        assert_eq!(config.suggestion_count, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_count_bounds() {
        let mut config = SuggestionConfig::default();
        config.suggestion_count = 0;
        assert!(config.validate().is_err());
        config.suggestion_count = 11;
        assert!(config.validate().is_err());
        config.suggestion_count = 10;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_name_characters() {
        let mut config = SuggestionConfig::default();
        config.api_key_env = "BAD-NAME".to_string();
        assert!(config.validate().is_err());
    }
}
