//! Playback with no speech capability must be a silent no-op

use kaiwa_core::{DialogTurn, Role};
use kaiwa_spk::{
    PlaybackRate, PlaybackScheduler, PlaybackStatus, SpeechConfig, SpeechEngine, SpeechSlot,
    Utterance, UtteranceCallback, VoiceAssignment, VoiceHandle,
};
use mockall::mock;
use std::sync::Arc;

mock! {
    pub Engine {}

    impl SpeechEngine for Engine {
        fn is_available(&self) -> bool;
        fn voices(&self) -> Vec<VoiceHandle>;
        fn speak(&self, utterance: Utterance, on_event: UtteranceCallback);
        fn cancel_all(&self);
        fn name(&self) -> &'static str;
    }
}

fn turns() -> Vec<DialogTurn> {
    vec![DialogTurn::new(Role::A, "Hello", "こんにちは")]
}

#[test]
fn test_absent_engine_never_speaks() {
    let mut engine = MockEngine::new();
    engine.expect_is_available().times(1).return_const(false);
    engine.expect_name().return_const("mock");
    engine.expect_speak().never();
    engine.expect_cancel_all().never();

    let slot = SpeechSlot::detect(Arc::new(engine));
    assert!(slot.is_none());

    let scheduler = PlaybackScheduler::new(slot, SpeechConfig::default()).unwrap();
    assert!(!scheduler.is_available());

    scheduler
        .play_all(turns(), VoiceAssignment::empty(), PlaybackRate::Normal)
        .unwrap();
    assert_eq!(scheduler.status(), PlaybackStatus::Idle);

    scheduler.set_rate(PlaybackRate::Half);
    scheduler.play_single("Hi").unwrap();
    scheduler.stop();
    assert_eq!(scheduler.status(), PlaybackStatus::Idle);
    assert_eq!(scheduler.rate(), PlaybackRate::Half);
}

#[test]
fn test_disabled_config_never_speaks() {
    let mut engine = MockEngine::new();
    engine.expect_is_available().return_const(true);
    engine.expect_name().return_const("mock");
    engine.expect_speak().never();
    engine.expect_cancel_all().never();

    let slot = SpeechSlot::detect(Arc::new(engine));
    assert!(slot.is_some());

    let config = SpeechConfig {
        enabled: false,
        ..SpeechConfig::default()
    };
    let scheduler = PlaybackScheduler::new(slot, config).unwrap();
    assert!(!scheduler.is_available());

    scheduler
        .play_all(turns(), VoiceAssignment::empty(), PlaybackRate::Normal)
        .unwrap();
    assert_eq!(scheduler.status(), PlaybackStatus::Idle);
}

#[test]
fn test_available_engine_receives_utterance() {
    let mut engine = MockEngine::new();
    engine.expect_is_available().return_const(true);
    engine.expect_name().return_const("mock");
    // Once on acquire, once on stop
    engine.expect_cancel_all().times(2).return_const(());
    engine
        .expect_speak()
        .withf(|utterance, _| utterance.text == "Hello" && utterance.rate == 0.75)
        .times(1)
        .return_const(());

    let slot = SpeechSlot::detect(Arc::new(engine)).unwrap();
    let scheduler = PlaybackScheduler::new(Some(slot), SpeechConfig::default()).unwrap();
    scheduler
        .play_all(turns(), VoiceAssignment::empty(), PlaybackRate::ThreeQuarters)
        .unwrap();
    assert_eq!(scheduler.status(), PlaybackStatus::Playing);

    scheduler.stop();
    assert_eq!(scheduler.status(), PlaybackStatus::Stopped);
}
