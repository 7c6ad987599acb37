// Kaiwa configuration file
// Optional TOML file with [speech] and [suggestions] tables

use anyhow::{anyhow, Context, Result};
use kaiwa_llm::SuggestionConfig;
use kaiwa_spk::SpeechConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub speech: SpeechConfig,
    pub suggestions: SuggestionConfig,
}

impl AppConfig {
    /// Load the explicit file, else the per-user file when present, else
    /// defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => default_path().filter(|path| path.exists()),
        };

        let config = match path {
            Some(path) => Self::from_file(&path)?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.speech
            .validate()
            .map_err(|e| anyhow!("Invalid [speech] config: {}", e))?;
        self.suggestions
            .validate()
            .map_err(|e| anyhow!("Invalid [suggestions] config: {}", e))?;
        Ok(())
    }
}

/// `<config_dir>/kaiwa/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("kaiwa").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaiwa_spk::PlaybackRate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_partial_file() {
        let file = write_config(
            r#"
[speech]
language = "en-GB"
default_rate = 0.75

[suggestions]
suggestion_count = 5
"#,
        );

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.speech.language, "en-GB");
        assert_eq!(config.speech.default_rate, PlaybackRate::ThreeQuarters);
        assert_eq!(config.speech.single_rate, 0.9);
        assert_eq!(config.suggestions.suggestion_count, 5);
        assert_eq!(config.suggestions.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_load_voice_lists() {
        let file = write_config(
            r#"
[speech.voices]
female_names = ["kyoko"]
male_names = ["otoya"]
"#,
        );

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.speech.voices.female_names, vec!["kyoko"]);
        assert_eq!(config.speech.voices.male_names, vec!["otoya"]);
    }

    #[test]
    fn test_unsupported_rate_rejected() {
        let file = write_config("[speech]\ndefault_rate = 2.0\n");
        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_config("[speech]\npitch = 5.0\n");
        assert!(AppConfig::load(Some(file.path())).is_err());

        let file = write_config("[suggestions]\nsuggestion_count = 0\n");
        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_default_path_location() {
        if let Some(path) = default_path() {
            assert!(path.ends_with("kaiwa/config.toml"));
        }
    }
}
