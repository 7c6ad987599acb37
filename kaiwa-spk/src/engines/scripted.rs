//! Deterministic in-memory engine.
//!
//! In manual mode utterances wait until the caller fires `start`, `finish`
//! or `fail`; in auto mode each utterance starts and ends synchronously
//! inside `speak`. Every utterance is recorded.

use crate::engines::{SpeechEngine, Utterance, UtteranceCallback, UtteranceEvent};
use crate::voices::VoiceHandle;
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;

pub struct ScriptedEngine {
    available: bool,
    auto_complete: bool,
    fail_at: Option<usize>,
    voices: RwLock<Vec<VoiceHandle>>,
    state: Mutex<ScriptState>,
}

#[derive(Default)]
struct ScriptState {
    spoken: Vec<Utterance>,
    pending: VecDeque<UtteranceCallback>,
    cancels: usize,
}

impl ScriptedEngine {
    /// Manual engine: the caller drives every event
    pub fn new(voices: Vec<VoiceHandle>) -> Self {
        Self {
            available: true,
            auto_complete: false,
            fail_at: None,
            voices: RwLock::new(voices),
            state: Mutex::new(ScriptState::default()),
        }
    }

    /// Engine that finishes every utterance as soon as it is spoken
    pub fn auto(voices: Vec<VoiceHandle>) -> Self {
        Self {
            auto_complete: true,
            ..Self::new(voices)
        }
    }

    /// Engine reporting that the runtime has no speech support
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(Vec::new())
        }
    }

    /// In auto mode, fail the utterance with this zero-based position
    pub fn failing_at(mut self, position: usize) -> Self {
        self.fail_at = Some(position);
        self
    }

    pub fn set_voices(&self, voices: Vec<VoiceHandle>) {
        *self.voices.write() = voices;
    }

    /// Every utterance passed to `speak`, in order
    pub fn spoken(&self) -> Vec<Utterance> {
        self.state.lock().spoken.clone()
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.state.lock().spoken.iter().map(|u| u.text.clone()).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn cancel_count(&self) -> usize {
        self.state.lock().cancels
    }

    /// Fire `Started` for the oldest pending utterance
    pub fn start(&self) -> bool {
        let callback = self.state.lock().pending.front().cloned();
        match callback {
            Some(callback) => {
                callback(UtteranceEvent::Started);
                true
            }
            None => false,
        }
    }

    /// Fire `Ended` for the oldest pending utterance
    pub fn finish(&self) -> bool {
        self.complete(UtteranceEvent::Ended)
    }

    /// Fire `Failed` for the oldest pending utterance
    pub fn fail(&self, reason: &str) -> bool {
        self.complete(UtteranceEvent::Failed(reason.to_string()))
    }

    fn complete(&self, event: UtteranceEvent) -> bool {
        // Release the lock first: the callback may speak again
        let callback = self.state.lock().pending.pop_front();
        match callback {
            Some(callback) => {
                callback(event);
                true
            }
            None => false,
        }
    }
}

impl SpeechEngine for ScriptedEngine {
    fn is_available(&self) -> bool {
        self.available
    }

    fn voices(&self) -> Vec<VoiceHandle> {
        self.voices.read().clone()
    }

    fn speak(&self, utterance: Utterance, on_event: UtteranceCallback) {
        let position = {
            let mut state = self.state.lock();
            state.spoken.push(utterance);
            if !self.auto_complete {
                state.pending.push_back(on_event);
                return;
            }
            state.spoken.len() - 1
        };

        on_event(UtteranceEvent::Started);
        if self.fail_at == Some(position) {
            on_event(UtteranceEvent::Failed("synthesis-failed".to_string()));
        } else {
            on_event(UtteranceEvent::Ended);
        }
    }

    fn cancel_all(&self) {
        let mut state = self.state.lock();
        state.pending.clear();
        state.cancels += 1;
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
