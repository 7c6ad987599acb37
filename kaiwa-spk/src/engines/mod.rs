//! Speech engine capability

pub mod scripted;

use crate::voices::VoiceHandle;
use std::sync::Arc;

/// One unit of synthesized speech
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// `None` selects the runtime's default voice
    pub voice: Option<VoiceHandle>,
    pub rate: f32,
    pub pitch: f32,
    pub lang: String,
}

/// Progress notifications for a single utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtteranceEvent {
    Started,
    Ended,
    Failed(String),
}

pub type UtteranceCallback = Arc<dyn Fn(UtteranceEvent) + Send + Sync>;

/// Trait for speech engines.
///
/// The engine owns one global synthesis slot. `speak` returns immediately
/// and reports progress through the callback, possibly synchronously.
/// `cancel_all` silences whatever is in flight and must not invoke any
/// callback.
pub trait SpeechEngine: Send + Sync {
    /// Check if the hosting runtime offers speech synthesis at all
    fn is_available(&self) -> bool;

    /// Voices currently offered, in the runtime's enumeration order
    fn voices(&self) -> Vec<VoiceHandle>;

    /// Start speaking
    fn speak(&self, utterance: Utterance, on_event: UtteranceCallback);

    /// Cancel every queued or speaking utterance
    fn cancel_all(&self);

    /// Get engine name
    fn name(&self) -> &'static str;
}
