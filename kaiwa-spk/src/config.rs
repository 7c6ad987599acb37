//! Configuration for dialog playback

use crate::rate::PlaybackRate;
use serde::{Deserialize, Serialize};

/// Playback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Enable playback; when off every playback operation is a no-op
    pub enabled: bool,

    /// Spoken language tag (e.g., "en-US")
    pub language: String,

    /// Pitch passed to the engine (0.0-2.0, default 1.0)
    pub pitch: f32,

    /// Rate used by dialogs until the caller picks another one
    pub default_rate: PlaybackRate,

    /// Rate for single-suggestion playback (0.1-10.0, default 0.9)
    pub single_rate: f32,

    /// Capacity of the playback event channel
    pub event_buffer: usize,

    /// Name heuristics for role voices
    pub voices: VoiceSelectionConfig,
}

/// Display-name allow-lists used when a voice carries no gender attribute.
/// Matching is a case-insensitive substring test.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSelectionConfig {
    pub female_names: Vec<String>,
    pub male_names: Vec<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "en-US".to_string(),
            pitch: 1.0,
            default_rate: PlaybackRate::Normal,
            single_rate: 0.9,
            event_buffer: 64,
            voices: VoiceSelectionConfig::default(),
        }
    }
}

impl Default for VoiceSelectionConfig {
    fn default() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            female_names: names(&["zira", "samantha", "karen", "susan", "victoria", "female"]),
            male_names: names(&["david", "mark", "richard", "daniel", "james", "male"]),
        }
    }
}

impl SpeechConfig {
    /// Primary language subtag ("en" for "en-US")
    pub fn primary_language(&self) -> &str {
        self.language
            .split(|c| c == '-' || c == '_')
            .next()
            .unwrap_or("")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.language.is_empty() {
            return Err("Language code cannot be empty".to_string());
        }

        if self.language.len() > 32 {
            return Err("Language code too long (max 32 chars)".to_string());
        }

        if !self.language.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err("Language code contains invalid characters (only alphanumeric, '-' and '_' allowed)".to_string());
        }

        if !(0.0..=2.0).contains(&self.pitch) {
            return Err("Pitch must be between 0.0 and 2.0".to_string());
        }

        if !(0.1..=10.0).contains(&self.single_rate) {
            return Err("Single playback rate must be between 0.1 and 10.0".to_string());
        }

        if self.event_buffer == 0 {
            return Err("Event buffer must be greater than 0".to_string());
        }

        if self.event_buffer > 10_000 {
            return Err("Event buffer too large (max 10000)".to_string());
        }

        self.voices.validate()
    }
}

impl VoiceSelectionConfig {
    pub fn validate(&self) -> Result<(), String> {
        for name in self.female_names.iter().chain(self.male_names.iter()) {
            if name.trim().is_empty() {
                return Err("Voice name patterns cannot be empty".to_string());
            }

            if name.len() > 256 {
                return Err("Voice name pattern too long (max 256 chars)".to_string());
            }

            if name.chars().any(|c| c.is_control()) {
                return Err("Voice name pattern contains invalid characters".to_string());
            }
        }

        Ok(())
    }
}
