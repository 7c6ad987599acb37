//! The process-wide speech slot.
//!
//! Only one utterance may be synthesizing at a time anywhere in the process.
//! Every playback start goes through [`SpeechSlot::acquire`], which silences
//! whatever is in flight and pre-empts the previous holder. Holders give the
//! slot back with `release` (cancel) or `finish` (natural end).

use crate::engines::{SpeechEngine, Utterance, UtteranceCallback};
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

/// Identity of a slot user (one per scheduler)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

impl OwnerId {
    pub fn next() -> Self {
        Self(NEXT_OWNER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Proof of one acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTicket {
    owner: OwnerId,
    seq: u64,
}

impl SlotTicket {
    pub fn owner(&self) -> OwnerId {
        self.owner
    }
}

struct Holder {
    ticket: SlotTicket,
    on_preempt: Box<dyn FnOnce() + Send>,
}

struct SlotInner {
    engine: Arc<dyn SpeechEngine>,
    // Re-entrant: engines may call back into the slot from inside `speak`
    // on the same thread. `RefCell` borrows never span an engine call.
    holder: ReentrantMutex<RefCell<Option<Holder>>>,
    next_seq: AtomicU64,
}

/// Shared handle to the engine's single synthesis slot
#[derive(Clone)]
pub struct SpeechSlot {
    inner: Arc<SlotInner>,
}

impl SpeechSlot {
    /// One-time capability check: `None` when the runtime has no speech
    /// support, which callers treat as "playback disabled"
    pub fn detect(engine: Arc<dyn SpeechEngine>) -> Option<Self> {
        if !engine.is_available() {
            info!("Speech engine '{}' not available, playback disabled", engine.name());
            return None;
        }

        info!("Speech engine '{}' ready", engine.name());
        Some(Self {
            inner: Arc::new(SlotInner {
                engine,
                holder: ReentrantMutex::new(RefCell::new(None)),
                next_seq: AtomicU64::new(1),
            }),
        })
    }

    pub fn engine(&self) -> &Arc<dyn SpeechEngine> {
        &self.inner.engine
    }

    /// Take the slot: cancel anything in flight and make `owner` the holder.
    ///
    /// A different previous owner is notified through its `on_preempt`
    /// callback after the slot lock is released. Re-acquiring by the same
    /// owner replaces its ticket silently.
    pub fn acquire<F>(&self, owner: OwnerId, on_preempt: F) -> SlotTicket
    where
        F: FnOnce() + Send + 'static,
    {
        let ticket = SlotTicket {
            owner,
            seq: self.inner.next_seq.fetch_add(1, Ordering::Relaxed),
        };

        let previous = {
            let holder = self.inner.holder.lock();
            self.inner.engine.cancel_all();
            let previous = holder.borrow_mut().replace(Holder {
                ticket,
                on_preempt: Box::new(on_preempt),
            });
            previous
        };

        if let Some(previous) = previous {
            if previous.ticket.owner != owner {
                debug!("Speech slot pre-empted owner {:?}", previous.ticket.owner);
                (previous.on_preempt)();
            }
        }

        ticket
    }

    pub fn is_held_by(&self, ticket: SlotTicket) -> bool {
        let holder = self.inner.holder.lock();
        let held = holds(&holder.borrow(), ticket);
        held
    }

    /// Current holder, if any
    pub fn holder(&self) -> Option<OwnerId> {
        let holder = self.inner.holder.lock();
        let owner = holder.borrow().as_ref().map(|holder| holder.ticket.owner);
        owner
    }

    /// Speak on behalf of the holder; refused for stale tickets.
    ///
    /// The slot stays locked until the engine has taken the utterance, so a
    /// `release` from another thread either lands first and refuses it, or
    /// waits and then cancels it.
    pub fn speak(&self, ticket: SlotTicket, utterance: Utterance, on_event: UtteranceCallback) -> bool {
        let holder = self.inner.holder.lock();
        if !holds(&holder.borrow(), ticket) {
            debug!("Dropping utterance from a ticket that no longer holds the slot");
            return false;
        }

        self.inner.engine.speak(utterance, on_event);
        true
    }

    /// Silence the in-flight utterance but keep holding the slot
    pub fn interrupt(&self, ticket: SlotTicket) -> bool {
        let holder = self.inner.holder.lock();
        if !holds(&holder.borrow(), ticket) {
            return false;
        }
        self.inner.engine.cancel_all();
        true
    }

    /// Give the slot back and cancel what is still speaking
    pub fn release(&self, ticket: SlotTicket) -> bool {
        let holder = self.inner.holder.lock();
        if !take_if_held(&holder, ticket) {
            return false;
        }
        self.inner.engine.cancel_all();
        true
    }

    /// Give the slot back after the last utterance ended on its own
    pub fn finish(&self, ticket: SlotTicket) -> bool {
        let holder = self.inner.holder.lock();
        take_if_held(&holder, ticket)
    }
}

fn holds(holder: &Option<Holder>, ticket: SlotTicket) -> bool {
    holder.as_ref().map_or(false, |current| current.ticket == ticket)
}

/// Clear the holder when `ticket` is current. The dropped `on_preempt`
/// callback is never run.
fn take_if_held(holder: &RefCell<Option<Holder>>, ticket: SlotTicket) -> bool {
    let mut holder = holder.borrow_mut();
    if !holds(&holder, ticket) {
        return false;
    }
    *holder = None;
    true
}
