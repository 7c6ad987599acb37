//! Voice descriptions and the runtime's voice catalogue.
//!
//! Runtimes often populate their voice list some time after startup and may
//! refresh it later, so the catalogue is an observable value rather than a
//! one-shot read.

use crate::engines::SpeechEngine;
use crate::resolver::{VoiceAssignment, VoiceResolver};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// Voice gender attribute, when the runtime reports one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    Male,
    Female,
    Neutral,
}

/// One synthesis voice offered by the runtime
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceHandle {
    /// Runtime identifier (voice URI)
    pub id: String,

    /// Display name
    pub name: String,

    /// BCP 47 language tag, e.g. "en-GB"
    pub lang: String,

    #[serde(default)]
    pub gender: Option<VoiceGender>,

    /// Runtime's default voice
    #[serde(default)]
    pub is_default: bool,
}

impl VoiceHandle {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lang: lang.into(),
            gender: None,
            is_default: false,
        }
    }

    pub fn with_gender(mut self, gender: VoiceGender) -> Self {
        self.gender = Some(gender);
        self
    }
}

/// Process-wide list of available voices
pub struct VoiceCatalogue {
    sender: watch::Sender<Vec<VoiceHandle>>,
}

impl VoiceCatalogue {
    /// Empty catalogue; voices arrive through [`publish`](Self::publish)
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Vec::new());
        Self { sender }
    }

    /// Replace the voice list and notify subscribers
    pub fn publish(&self, voices: Vec<VoiceHandle>) {
        debug!("Voice catalogue updated: {} voices", voices.len());
        self.sender.send_replace(voices);
    }

    /// Re-read the voice list from an engine
    pub fn refresh_from(&self, engine: &dyn SpeechEngine) {
        self.publish(engine.voices());
    }

    pub fn snapshot(&self) -> Vec<VoiceHandle> {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<VoiceHandle>> {
        self.sender.subscribe()
    }
}

impl Default for VoiceCatalogue {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep a voice assignment in step with a catalogue.
///
/// Resolves once immediately, then again on every catalogue change. The
/// background task ends when the catalogue or every assignment receiver is
/// dropped. Must be called from within a tokio runtime.
pub fn track_assignments(
    mut voices: watch::Receiver<Vec<VoiceHandle>>,
    resolver: VoiceResolver,
) -> watch::Receiver<VoiceAssignment> {
    let initial = resolver.resolve(&voices.borrow_and_update());
    let (sender, receiver) = watch::channel(initial);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = voices.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = sender.closed() => break,
            }

            let assignment = resolver.resolve(&voices.borrow_and_update());
            sender.send_if_modified(|current| {
                if *current == assignment {
                    false
                } else {
                    *current = assignment;
                    true
                }
            });
        }
        debug!("Voice assignment tracking stopped");
    });

    receiver
}
