// Console speech engine
// Prints each utterance and holds it for roughly its spoken duration

use kaiwa_spk::{SpeechEngine, Utterance, UtteranceCallback, UtteranceEvent, VoiceHandle};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Baseline speaking speed at rate 1.0
const WORDS_PER_MINUTE: f32 = 160.0;
const MIN_UTTERANCE: Duration = Duration::from_millis(300);

pub struct ConsoleEngine {
    runtime: Handle,
    voices: Vec<VoiceHandle>,
    current: Mutex<Option<JoinHandle<()>>>,
}

impl ConsoleEngine {
    pub fn new(runtime: Handle, voices: Vec<VoiceHandle>) -> Self {
        Self {
            runtime,
            voices,
            current: Mutex::new(None),
        }
    }
}

impl SpeechEngine for ConsoleEngine {
    fn is_available(&self) -> bool {
        true
    }

    fn voices(&self) -> Vec<VoiceHandle> {
        self.voices.clone()
    }

    fn speak(&self, utterance: Utterance, on_event: UtteranceCallback) {
        let duration = speaking_time(&utterance.text, utterance.rate);
        let task = self.runtime.spawn(async move {
            on_event(UtteranceEvent::Started);
            let voice = utterance
                .voice
                .as_ref()
                .map(|voice| voice.name.as_str())
                .unwrap_or("default voice");
            println!("🔊 [{} @ {:.2}x] {}", voice, utterance.rate, utterance.text);
            tokio::time::sleep(duration).await;
            on_event(UtteranceEvent::Ended);
        });

        *self.current.lock() = Some(task);
    }

    fn cancel_all(&self) {
        if let Some(task) = self.current.lock().take() {
            task.abort();
        }
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

fn speaking_time(text: &str, rate: f32) -> Duration {
    let words = text.split_whitespace().count() as f32;
    let rate = if rate > 0.0 { rate } else { 1.0 };
    let seconds = words * 60.0 / (WORDS_PER_MINUTE * rate);
    Duration::from_secs_f32(seconds).max(MIN_UTTERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_speaking_time_scales_with_rate() {
        let text = "one two three four five six seven eight nine ten";
        let normal = speaking_time(text, 1.0);
        let half = speaking_time(text, 0.5);
        assert!(half > normal);
        assert_eq!(speaking_time("", 1.0), MIN_UTTERANCE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_utterance_runs_to_end() {
        let engine = ConsoleEngine::new(Handle::current(), Vec::new());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let callback: UtteranceCallback = Arc::new(move |event| {
            let _ = tx.send(event);
        });

        engine.speak(
            Utterance {
                text: "Hello there".to_string(),
                voice: None,
                rate: 1.0,
                pitch: 1.0,
                lang: "en-US".to_string(),
            },
            callback,
        );

        assert_eq!(rx.recv().await, Some(UtteranceEvent::Started));
        assert_eq!(rx.recv().await, Some(UtteranceEvent::Ended));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_suppresses_end() {
        let engine = ConsoleEngine::new(Handle::current(), Vec::new());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let callback: UtteranceCallback = Arc::new(move |event| {
            let _ = tx.send(event);
        });

        engine.speak(
            Utterance {
                text: "A fairly long sentence to speak".to_string(),
                voice: None,
                rate: 1.0,
                pitch: 1.0,
                lang: "en-US".to_string(),
            },
            callback,
        );
        assert_eq!(rx.recv().await, Some(UtteranceEvent::Started));

        engine.cancel_all();
        // The aborted task drops its sender
        assert_eq!(rx.recv().await, None);
    }
}
