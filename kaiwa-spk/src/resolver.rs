//! Deterministic voice-per-role assignment.
//!
//! Role A prefers a female-leaning voice and role B a male-leaning voice
//! distinct from A's. Gender attributes win over name heuristics, and the
//! name allow-lists come from configuration.

use crate::config::{SpeechConfig, VoiceSelectionConfig};
use crate::voices::{VoiceGender, VoiceHandle};
use kaiwa_core::Role;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Voice chosen for each role; a missing role means "runtime default voice"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoiceAssignment {
    role_to_voice: BTreeMap<Role, VoiceHandle>,
}

impl VoiceAssignment {
    /// Assignment with every role absent
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, role: Role, voice: VoiceHandle) {
        self.role_to_voice.insert(role, voice);
    }

    pub fn voice_for(&self, role: Role) -> Option<&VoiceHandle> {
        self.role_to_voice.get(&role)
    }

    /// Voice for a turn's speaker; unattributed turns use the default voice
    pub fn voice_for_turn(&self, speaker: Option<Role>) -> Option<&VoiceHandle> {
        speaker.and_then(|role| self.voice_for(role))
    }

    pub fn is_empty(&self) -> bool {
        self.role_to_voice.is_empty()
    }

    /// Whether A and B sound different
    pub fn is_distinct(&self) -> bool {
        match (self.voice_for(Role::A), self.voice_for(Role::B)) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        }
    }
}

/// Stateless resolver; cheap to call again whenever the catalogue changes
#[derive(Debug, Clone)]
pub struct VoiceResolver {
    language: String,
    female_names: Vec<String>,
    male_names: Vec<String>,
}

impl VoiceResolver {
    /// `language` may be a full tag; only its primary subtag is used
    pub fn new(language: &str, selection: &VoiceSelectionConfig) -> Self {
        let primary = language
            .split(|c| c == '-' || c == '_')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        let lower = |names: &[String]| names.iter().map(|n| n.to_lowercase()).collect();

        Self {
            language: primary,
            female_names: lower(&selection.female_names),
            male_names: lower(&selection.male_names),
        }
    }

    pub fn from_config(config: &SpeechConfig) -> Self {
        Self::new(&config.language, &config.voices)
    }

    /// Assign a voice to each role.
    ///
    /// `voices` must be in the runtime's enumeration order; the result only
    /// depends on that order and the voices themselves.
    pub fn resolve(&self, voices: &[VoiceHandle]) -> VoiceAssignment {
        let candidates: Vec<&VoiceHandle> = voices
            .iter()
            .filter(|voice| voice.lang.to_ascii_lowercase().starts_with(&self.language))
            .collect();

        let mut assignment = VoiceAssignment::empty();
        if candidates.is_empty() {
            debug!("No '{}' voices available, using runtime default", self.language);
            return assignment;
        }

        let voice_a: &VoiceHandle = candidates
            .iter()
            .copied()
            .find(|voice| voice.gender == Some(VoiceGender::Female))
            .or_else(|| {
                candidates
                    .iter()
                    .copied()
                    .find(|voice| name_matches(&voice.name, &self.female_names))
            })
            .unwrap_or(candidates[0]);

        let others: Vec<&VoiceHandle> = candidates
            .iter()
            .copied()
            .filter(|voice| *voice != voice_a)
            .collect();
        let voice_b: &VoiceHandle = others
            .iter()
            .copied()
            .find(|voice| voice.gender == Some(VoiceGender::Male))
            .or_else(|| {
                others
                    .iter()
                    .copied()
                    .find(|voice| name_matches(&voice.name, &self.male_names))
            })
            .or_else(|| others.first().copied())
            .unwrap_or(voice_a);

        debug!(
            "Selected voices: A={}, B={}, distinct={}",
            voice_a.name,
            voice_b.name,
            voice_a != voice_b
        );

        assignment.assign(Role::A, voice_a.clone());
        assignment.assign(Role::B, voice_b.clone());
        assignment
    }
}

impl Default for VoiceResolver {
    fn default() -> Self {
        Self::from_config(&SpeechConfig::default())
    }
}

/// Resolve with the default language and name lists
pub fn resolve(voices: &[VoiceHandle]) -> VoiceAssignment {
    VoiceResolver::default().resolve(voices)
}

fn name_matches(name: &str, patterns: &[String]) -> bool {
    let name = name.to_lowercase();
    patterns.iter().any(|pattern| name.contains(pattern.as_str()))
}
