use kaiwa_core::{BookmarkDraft, DialogTurn, Role};
use kaiwa_llm::{extract, ResponseAccumulator, SuggestionConfig, SuggestionPrompt};
use kaiwa_spk::{
    track_assignments, PlaybackEvent, PlaybackRate, PlaybackScheduler, PlaybackStatus,
    ScriptedEngine, SpeechConfig, SpeechEngine, SpeechSlot, StopReason, VoiceCatalogue,
    VoiceGender, VoiceHandle, VoiceResolver,
};
use std::sync::Arc;
use std::time::Duration;

const RESPONSE: &str = r#"Sure! Here are some expressions for ordering coffee:
[
  {"englishText": "Could I get a latte, please?", "japaneseText": "ラテをお願いできますか？"},
  {"englishText": "For here, please.", "japaneseText": "店内でお願いします。"},
  {"english_text": "Can I pay by card?", "japanese_text": "カードで払えますか？"}
]
Enjoy your coffee!"#;

fn voices() -> Vec<VoiceHandle> {
    vec![
        VoiceHandle::new("ja", "Kyoko", "ja-JP").with_gender(VoiceGender::Female),
        VoiceHandle::new("en-m", "Daniel", "en-GB").with_gender(VoiceGender::Male),
        VoiceHandle::new("en-f", "Samantha", "en-US"),
    ]
}

#[test]
fn test_streamed_response_to_bookmarks() {
    let mut accumulator = ResponseAccumulator::new();
    for line in RESPONSE.split_inclusive('\n') {
        accumulator.push(line);
        // Incomplete arrays extract nothing rather than partial results
        if !accumulator.text().contains(']') {
            assert!(accumulator.suggestions().is_empty());
        }
    }

    let suggestions = accumulator.finish();
    assert_eq!(suggestions.len(), 3);
    assert_eq!(suggestions[2].english_text, "Can I pay by card?");
    assert_eq!(
        suggestions.iter().map(|s| s.index).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );

    let drafts: Vec<BookmarkDraft> = suggestions.iter().map(BookmarkDraft::from).collect();
    assert!(drafts.iter().all(|draft| draft.validate().is_ok()));
    assert_eq!(drafts[0].japanese_text, "ラテをお願いできますか？");
}

#[test]
fn test_suggestions_played_as_dialog() {
    let suggestions = extract(RESPONSE);
    let turns: Vec<DialogTurn> = suggestions
        .iter()
        .zip(Role::ALL.iter().cycle())
        .map(|(s, role)| DialogTurn::new(*role, s.english_text.clone(), s.japanese_text.clone()))
        .collect();

    let engine = Arc::new(ScriptedEngine::auto(voices()));
    let slot = SpeechSlot::detect(engine.clone()).unwrap();
    let config = SpeechConfig::default();
    let assignment = VoiceResolver::from_config(&config).resolve(&engine.voices());
    let scheduler = PlaybackScheduler::new(Some(slot), config).unwrap();
    let mut events = scheduler.subscribe();

    scheduler
        .play_all(turns, assignment, PlaybackRate::ThreeQuarters)
        .unwrap();

    assert_eq!(scheduler.status(), PlaybackStatus::Stopped);
    let spoken = engine.spoken();
    assert_eq!(spoken.len(), 3);
    let voice_ids: Vec<&str> = spoken
        .iter()
        .map(|u| u.voice.as_ref().map_or("", |v| v.id.as_str()))
        .collect();
    assert_eq!(voice_ids, vec!["en-f", "en-m", "en-f"]);
    assert!(spoken.iter().all(|u| u.rate == 0.75));

    let mut last = None;
    while let Ok(event) = events.try_recv() {
        last = Some(event);
    }
    assert_eq!(
        last,
        Some(PlaybackEvent::Stopped {
            reason: StopReason::Finished
        })
    );
}

#[tokio::test]
async fn test_late_catalogue_updates_running_dialog() {
    let engine = Arc::new(ScriptedEngine::new(Vec::new()));
    let slot = SpeechSlot::detect(engine.clone()).unwrap();
    let scheduler = PlaybackScheduler::new(Some(slot), SpeechConfig::default()).unwrap();

    let catalogue = VoiceCatalogue::new();
    catalogue.refresh_from(engine.as_ref());
    let mut assignments = track_assignments(catalogue.subscribe(), VoiceResolver::default());
    let initial = assignments.borrow_and_update().clone();
    assert!(initial.is_empty());

    let turns = vec![
        DialogTurn::new(Role::A, "Good morning", "おはよう"),
        DialogTurn::new(Role::B, "Morning!", "おはよう！"),
    ];
    scheduler
        .play_all(turns, initial, PlaybackRate::Normal)
        .unwrap();
    engine.start();

    // Voices arrive after playback began
    engine.set_voices(voices());
    catalogue.refresh_from(engine.as_ref());
    tokio::time::timeout(Duration::from_secs(1), assignments.changed())
        .await
        .unwrap()
        .unwrap();
    scheduler.set_voice_assignment(assignments.borrow_and_update().clone());

    let spoken = engine.spoken();
    assert_eq!(spoken.len(), 2);
    assert_eq!(spoken[1].text, "Good morning");
    assert_eq!(spoken[1].voice.as_ref().map(|v| v.id.as_str()), Some("en-f"));

    engine.start();
    engine.finish();
    engine.start();
    engine.finish();
    assert_eq!(scheduler.status(), PlaybackStatus::Stopped);
    assert_eq!(
        engine.spoken()[2].voice.as_ref().map(|v| v.id.as_str()),
        Some("en-m")
    );
}

#[test]
fn test_prompt_asks_for_extractable_shape() {
    let config = SuggestionConfig::default();
    let prompt = SuggestionPrompt::build("ordering coffee", &config).unwrap();

    // The example embedded in the prompt is itself extractable
    let suggestions = extract(&prompt.user);
    assert_eq!(suggestions.len(), config.suggestion_count);
    assert!(prompt.user.contains("ordering coffee"));
}
