//! kaiwa-spk: Dialog playback over a speech engine
//!
//! Provides:
//! - Voice catalogue tracking and per-role voice assignment
//! - A process-wide exclusive speech slot
//! - Sequential, interruptible playback with rate changes
//! - A scripted engine for deterministic playback

pub mod config;
pub mod engines;
pub mod error;
pub mod rate;
pub mod resolver;
pub mod scheduler;
pub mod slot;
pub mod voices;

pub use config::{SpeechConfig, VoiceSelectionConfig};
pub use engines::scripted::ScriptedEngine;
pub use engines::{SpeechEngine, Utterance, UtteranceCallback, UtteranceEvent};
pub use error::SpeechError;
pub use rate::PlaybackRate;
pub use resolver::{resolve, VoiceAssignment, VoiceResolver};
pub use scheduler::{
    PlaybackEvent, PlaybackScheduler, PlaybackSnapshot, PlaybackStatus, StopReason,
    MAX_TURN_TEXT_LENGTH,
};
pub use slot::{OwnerId, SlotTicket, SpeechSlot};
pub use voices::{track_assignments, VoiceCatalogue, VoiceGender, VoiceHandle};
