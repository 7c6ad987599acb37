//! Sequential, interruptible playback of dialog turns.
//!
//! One utterance is in flight at a time. Each one carries a sequence token;
//! engine events whose token is no longer current are ignored, which keeps
//! cancellation (stop, restart, pre-emption) from ever advancing playback.

use crate::config::SpeechConfig;
use crate::engines::{Utterance, UtteranceCallback, UtteranceEvent};
use crate::error::SpeechError;
use crate::rate::PlaybackRate;
use crate::resolver::VoiceAssignment;
use crate::slot::{OwnerId, SlotTicket, SpeechSlot};
use kaiwa_core::{DialogTurn, Suggestion};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Longest turn text accepted, in bytes
pub const MAX_TURN_TEXT_LENGTH: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    Idle,
    Playing,
    Stopped,
}

impl PlaybackStatus {
    /// Idle and Stopped behave the same; they only differ by history
    pub fn is_at_rest(&self) -> bool {
        !matches!(self, PlaybackStatus::Playing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The last turn ended
    Finished,
    /// `stop()` was called
    Cancelled,
    /// The engine reported a synthesis error
    Failed,
    /// Another playback surface took the speech slot
    Preempted,
}

/// Notifications for the playback surface
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlaybackEvent {
    Started { turn_count: usize },
    TurnStarted { index: usize },
    RateChanged { rate: PlaybackRate },
    VoicesChanged,
    Stopped { reason: StopReason },
}

/// Point-in-time view of the session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub status: PlaybackStatus,
    pub current_index: Option<usize>,
    /// Dialog rate, also used by the next `play_all` when passed back in
    pub rate: PlaybackRate,
    /// Rate the current utterance is spoken at; single-line playback uses
    /// the configured single rate instead of `rate`
    pub spoken_rate: f32,
    pub turn_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionMode {
    Dialog,
    /// One suggestion: default voice, single-suggestion rate
    Single,
}

struct SessionState {
    turns: Vec<DialogTurn>,
    current_index: Option<usize>,
    rate: PlaybackRate,
    status: PlaybackStatus,
    assignment: VoiceAssignment,
    mode: SessionMode,
    utterance_seq: u64,
    ticket: Option<SlotTicket>,
}

impl SessionState {
    fn new(rate: PlaybackRate) -> Self {
        Self {
            turns: Vec::new(),
            current_index: None,
            rate,
            status: PlaybackStatus::Idle,
            assignment: VoiceAssignment::empty(),
            mode: SessionMode::Dialog,
            utterance_seq: 0,
            ticket: None,
        }
    }

    /// Move to Stopped and invalidate the in-flight utterance
    fn halt(&mut self) -> Option<SlotTicket> {
        self.status = PlaybackStatus::Stopped;
        self.current_index = None;
        self.utterance_seq += 1;
        self.ticket.take()
    }
}

/// Work to do once the state lock is released
struct PendingUtterance {
    ticket: SlotTicket,
    index: usize,
    seq: u64,
    utterance: Utterance,
}

struct SchedulerInner {
    owner: OwnerId,
    slot: Option<SpeechSlot>,
    config: SpeechConfig,
    state: Mutex<SessionState>,
    events: broadcast::Sender<PlaybackEvent>,
}

/// Drives one playback surface.
///
/// Built without a speech slot (engine unavailable or playback disabled),
/// every playback operation is a no-op.
pub struct PlaybackScheduler {
    inner: Arc<SchedulerInner>,
}

impl PlaybackScheduler {
    /// Create a scheduler
    pub fn new(slot: Option<SpeechSlot>, config: SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Config)?;

        let slot = if config.enabled {
            slot
        } else {
            info!("Playback disabled in config");
            None
        };

        let (events, _) = broadcast::channel(config.event_buffer);
        let state = SessionState::new(config.default_rate);

        Ok(Self {
            inner: Arc::new(SchedulerInner {
                owner: OwnerId::next(),
                slot,
                config,
                state: Mutex::new(state),
                events,
            }),
        })
    }

    /// Whether playback can happen at all
    pub fn is_available(&self) -> bool {
        self.inner.slot.is_some()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.inner.events.subscribe()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let state = self.inner.state.lock();
        PlaybackSnapshot {
            status: state.status,
            current_index: state.current_index,
            rate: state.rate,
            spoken_rate: self.inner.spoken_rate(&state),
            turn_count: state.turns.len(),
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.inner.state.lock().status
    }

    pub fn current_index(&self) -> Option<usize> {
        self.inner.state.lock().current_index
    }

    pub fn rate(&self) -> PlaybackRate {
        self.inner.state.lock().rate
    }

    /// Play every turn in order, starting at turn 0, at `rate`.
    ///
    /// `rate` becomes the stored rate. Pass [`rate`](Self::rate) to honour
    /// a rate chosen with `set_rate` while nothing was playing.
    ///
    /// Cancels any utterance in flight anywhere in the process. An empty
    /// turn list is a no-op.
    pub fn play_all(
        &self,
        turns: Vec<DialogTurn>,
        assignment: VoiceAssignment,
        rate: PlaybackRate,
    ) -> Result<(), SpeechError> {
        validate_turns(&turns)?;

        if turns.is_empty() {
            debug!("play_all called with no turns");
            return Ok(());
        }

        self.inner.start_session(turns, assignment, rate, SessionMode::Dialog);
        Ok(())
    }

    /// Play one line with the runtime's default voice at the
    /// single-suggestion rate
    pub fn play_single(&self, text: &str) -> Result<(), SpeechError> {
        let turns = vec![DialogTurn::unattributed(text, "")];
        validate_turns(&turns)?;

        // The stored dialog rate is kept; the utterance uses `single_rate`
        let rate = self.rate();
        self.inner
            .start_session(turns, VoiceAssignment::empty(), rate, SessionMode::Single);
        Ok(())
    }

    pub fn play_suggestion(&self, suggestion: &Suggestion) -> Result<(), SpeechError> {
        self.play_single(&suggestion.english_text)
    }

    /// Cancel the in-flight utterance and stop. Idempotent.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Change the rate. While a dialog plays, the current turn restarts from
    /// its beginning at the new rate. Otherwise the rate is only stored and
    /// read back through [`rate`](Self::rate) for the next run.
    pub fn set_rate(&self, rate: PlaybackRate) {
        let restart = {
            let mut state = self.inner.state.lock();
            if state.rate == rate {
                return;
            }
            state.rate = rate;
            self.inner.restart_current(&mut state)
        };

        self.inner.emit(PlaybackEvent::RateChanged { rate });
        if let Some(pending) = restart {
            self.inner.interrupt_and_speak(pending);
        }
    }

    /// Replace the voice mapping, e.g. after the voice catalogue changed.
    /// While a dialog plays, the current turn restarts with the new voices.
    pub fn set_voice_assignment(&self, assignment: VoiceAssignment) {
        let restart = {
            let mut state = self.inner.state.lock();
            if state.assignment == assignment {
                return;
            }
            state.assignment = assignment;
            self.inner.restart_current(&mut state)
        };

        self.inner.emit(PlaybackEvent::VoicesChanged);
        if let Some(pending) = restart {
            self.inner.interrupt_and_speak(pending);
        }
    }
}

impl Drop for PlaybackScheduler {
    fn drop(&mut self) {
        self.inner.stop();
    }
}

impl SchedulerInner {
    fn start_session(
        self: &Arc<Self>,
        turns: Vec<DialogTurn>,
        assignment: VoiceAssignment,
        rate: PlaybackRate,
        mode: SessionMode,
    ) {
        let Some(slot) = self.slot.as_ref() else {
            debug!("No speech engine, ignoring playback request");
            return;
        };

        let weak = Arc::downgrade(self);
        let ticket = slot.acquire(self.owner, move || {
            if let Some(inner) = weak.upgrade() {
                inner.on_preempted();
            }
        });

        let (pending, turn_count) = {
            let mut state = self.state.lock();
            state.turns = turns;
            state.assignment = assignment;
            state.rate = rate;
            state.mode = mode;
            state.status = PlaybackStatus::Playing;
            state.current_index = Some(0);
            state.utterance_seq += 1;
            state.ticket = Some(ticket);

            let pending = PendingUtterance {
                ticket,
                index: 0,
                seq: state.utterance_seq,
                utterance: self.utterance_for(&state, 0),
            };
            (pending, state.turns.len())
        };

        info!("Playback started: {} turns", turn_count);
        self.emit(PlaybackEvent::Started { turn_count });
        self.speak(slot, pending);
    }

    fn stop(&self) {
        let Some(slot) = self.slot.as_ref() else {
            return;
        };

        let ticket = {
            let mut state = self.state.lock();
            if state.status != PlaybackStatus::Playing {
                return;
            }
            state.halt()
        };

        if let Some(ticket) = ticket {
            slot.release(ticket);
        }
        info!("Playback stopped");
        self.emit(PlaybackEvent::Stopped {
            reason: StopReason::Cancelled,
        });
    }

    fn on_preempted(&self) {
        {
            let mut state = self.state.lock();
            if state.status != PlaybackStatus::Playing {
                return;
            }
            // The slot already belongs to someone else; nothing to release
            state.halt();
        }

        info!("Playback pre-empted by another surface");
        self.emit(PlaybackEvent::Stopped {
            reason: StopReason::Preempted,
        });
    }

    /// Prepare a restart of the current turn; caller holds the state lock
    fn restart_current(&self, state: &mut SessionState) -> Option<PendingUtterance> {
        if self.slot.is_none()
            || state.status != PlaybackStatus::Playing
            || state.mode != SessionMode::Dialog
        {
            return None;
        }
        let index = state.current_index?;
        let ticket = state.ticket?;

        state.utterance_seq += 1;
        Some(PendingUtterance {
            ticket,
            index,
            seq: state.utterance_seq,
            utterance: self.utterance_for(state, index),
        })
    }

    fn interrupt_and_speak(self: &Arc<Self>, pending: PendingUtterance) {
        let Some(slot) = self.slot.as_ref() else {
            return;
        };

        if !slot.interrupt(pending.ticket) {
            debug!("Restart skipped, speech slot no longer held");
            return;
        }
        debug!("Restarting turn {}", pending.index);
        self.speak(slot, pending);
    }

    fn speak(self: &Arc<Self>, slot: &SpeechSlot, pending: PendingUtterance) {
        let weak: Weak<SchedulerInner> = Arc::downgrade(self);
        let (seq, index) = (pending.seq, pending.index);
        let callback: UtteranceCallback = Arc::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.on_utterance_event(seq, index, event);
            }
        });

        slot.speak(pending.ticket, pending.utterance, callback);
    }

    fn on_utterance_event(self: &Arc<Self>, seq: u64, index: usize, event: UtteranceEvent) {
        let Some(slot) = self.slot.as_ref() else {
            return;
        };

        match event {
            UtteranceEvent::Started => {
                {
                    let mut state = self.state.lock();
                    if !is_current(&state, seq) {
                        debug!("Ignoring start of stale utterance (turn {})", index);
                        return;
                    }
                    state.current_index = Some(index);
                }
                self.emit(PlaybackEvent::TurnStarted { index });
            }
            UtteranceEvent::Ended => {
                let next = {
                    let mut state = self.state.lock();
                    if !is_current(&state, seq) {
                        debug!("Ignoring end of stale utterance (turn {})", index);
                        return;
                    }

                    let next_index = index + 1;
                    let ticket = state.ticket;
                    match ticket {
                        Some(ticket) if next_index < state.turns.len() => {
                            state.current_index = Some(next_index);
                            state.utterance_seq += 1;
                            Ok(PendingUtterance {
                                ticket,
                                index: next_index,
                                seq: state.utterance_seq,
                                utterance: self.utterance_for(&state, next_index),
                            })
                        }
                        _ => Err(state.halt()),
                    }
                };

                match next {
                    Ok(pending) => self.speak(slot, pending),
                    Err(ticket) => {
                        if let Some(ticket) = ticket {
                            slot.finish(ticket);
                        }
                        info!("Playback finished");
                        self.emit(PlaybackEvent::Stopped {
                            reason: StopReason::Finished,
                        });
                    }
                }
            }
            UtteranceEvent::Failed(reason) => {
                let ticket = {
                    let mut state = self.state.lock();
                    if !is_current(&state, seq) {
                        debug!("Ignoring failure of stale utterance (turn {}): {}", index, reason);
                        return;
                    }
                    state.halt()
                };

                warn!("Speech synthesis failed on turn {}: {}", index, reason);
                if let Some(ticket) = ticket {
                    slot.finish(ticket);
                }
                self.emit(PlaybackEvent::Stopped {
                    reason: StopReason::Failed,
                });
            }
        }
    }

    fn utterance_for(&self, state: &SessionState, index: usize) -> Utterance {
        let turn = &state.turns[index];
        let voice = match state.mode {
            SessionMode::Dialog => state.assignment.voice_for_turn(turn.speaker).cloned(),
            SessionMode::Single => None,
        };

        Utterance {
            text: turn.english_text.clone(),
            voice,
            rate: self.spoken_rate(state),
            pitch: self.config.pitch,
            lang: self.config.language.clone(),
        }
    }

    fn spoken_rate(&self, state: &SessionState) -> f32 {
        match state.mode {
            SessionMode::Dialog => state.rate.as_f32(),
            SessionMode::Single => self.config.single_rate,
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

fn is_current(state: &SessionState, seq: u64) -> bool {
    state.status == PlaybackStatus::Playing && state.utterance_seq == seq
}

fn validate_turns(turns: &[DialogTurn]) -> Result<(), SpeechError> {
    for (index, turn) in turns.iter().enumerate() {
        if turn.english_text.len() > MAX_TURN_TEXT_LENGTH {
            return Err(SpeechError::InvalidTurn {
                index,
                reason: format!("text too long (max {} bytes)", MAX_TURN_TEXT_LENGTH),
            });
        }

        if turn.english_text.contains('\0') {
            return Err(SpeechError::InvalidTurn {
                index,
                reason: "text contains null bytes".to_string(),
            });
        }
    }
    Ok(())
}
