//! End-to-end turn pipeline tests over the demo catalog, with scripted
//! gateway doubles and the in-memory progress store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use phrase_tutor_core::content::seed::demo_catalog;
use phrase_tutor_core::progress::{MemoryProgressStore, ProgressStore, StoreError};
use phrase_tutor_core::services::stt_provider::{SpeechToText, SttError};
use phrase_tutor_core::services::tts_provider::{TextToSpeech, TtsError};
use phrase_tutor_core::{Outcome, TurnError, TurnProcessor, PROGRESS_COMPLETE};

struct ScriptedStt {
    transcript: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedStt {
    fn recognizing(transcript: &str) -> Arc<Self> {
        Arc::new(Self {
            transcript: Some(transcript.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            transcript: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechToText for ScriptedStt {
    async fn transcribe(&self, _audio: &[u8]) -> Result<String, SttError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.transcript {
            Some(text) => Ok(text.clone()),
            None => Err(SttError::NotConfigured("ELEVENLABS_API_KEY")),
        }
    }
}

struct RecordingTts {
    fail: bool,
    spoken: Mutex<Vec<(String, String, Option<String>)>>,
}

impl RecordingTts {
    fn working() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            spoken: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            spoken: Mutex::new(Vec::new()),
        })
    }

    fn spoken(&self) -> Vec<(String, String, Option<String>)> {
        self.spoken.lock().clone()
    }
}

#[async_trait]
impl TextToSpeech for RecordingTts {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        language: Option<&str>,
    ) -> Result<Bytes, TtsError> {
        if self.fail {
            return Err(TtsError::NotConfigured("ELEVENLABS_API_KEY"));
        }
        self.spoken.lock().push((
            text.to_string(),
            voice_id.to_string(),
            language.map(str::to_string),
        ));
        Ok(Bytes::from_static(b"mpeg-bytes"))
    }
}

/// A store whose conditional advance always loses, as if a concurrent
/// turn had already moved the pointer.
struct ContestedStore {
    inner: MemoryProgressStore,
}

#[async_trait]
impl ProgressStore for ContestedStore {
    async fn current_step(&self, caller_id: &str) -> Result<Option<i32>, StoreError> {
        self.inner.current_step(caller_id).await
    }

    async fn advance_if_current(
        &self,
        _caller_id: &str,
        _expected_current: i32,
        _next: i32,
    ) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn initialize(&self, caller_id: &str, first_step_id: i32) -> Result<(), StoreError> {
        self.inner.initialize(caller_id, first_step_id).await
    }

    async fn reset(&self, caller_id: &str, first_step_id: i32) -> Result<bool, StoreError> {
        self.inner.reset(caller_id, first_step_id).await
    }
}

fn processor(
    store: Arc<dyn ProgressStore>,
    stt: Arc<ScriptedStt>,
    tts: Arc<RecordingTts>,
) -> TurnProcessor {
    TurnProcessor::new(demo_catalog(), store, stt, tts)
}

#[tokio::test]
async fn empty_audio_is_rejected_before_any_gateway_call() {
    let store = Arc::new(MemoryProgressStore::with_entry("u1", 1));
    let stt = ScriptedStt::recognizing("hello");
    let tts = RecordingTts::working();
    let turns = processor(store, stt.clone(), tts.clone());

    let err = turns.process_turn("u1", b"", "en").await.unwrap_err();
    assert!(matches!(err, TurnError::InvalidInput(_)));
    assert_eq!(stt.calls(), 0);
    assert!(tts.spoken().is_empty());
}

#[tokio::test]
async fn unknown_caller_is_not_found() {
    let store = Arc::new(MemoryProgressStore::new());
    let turns = processor(store, ScriptedStt::recognizing("hello"), RecordingTts::working());

    let err = turns.process_turn("ghost", b"clip", "en").await.unwrap_err();
    assert!(matches!(err, TurnError::NotFound(_)));
    assert_eq!(err.kind(), "NOT_FOUND");
}

#[tokio::test]
async fn correct_response_advances_to_the_next_step() {
    let store = Arc::new(MemoryProgressStore::with_entry("u1", 1));
    let turns = processor(
        store.clone(),
        ScriptedStt::recognizing("hello world"),
        RecordingTts::working(),
    );

    let result = turns.process_turn("u1", b"clip", "en").await.unwrap();
    assert_eq!(result.outcome, Outcome::Success);
    assert_eq!(result.transcript, "hello world");
    assert_eq!(result.response_text, "Great job! 'Hello' is correct.");
    assert_eq!(result.audio, Bytes::from_static(b"mpeg-bytes"));
    assert_eq!(store.current_step("u1").await.unwrap(), Some(2));
}

#[tokio::test]
async fn wrong_response_holds_progress_and_speaks_failure_feedback() {
    let store = Arc::new(MemoryProgressStore::with_entry("u1", 1));
    let turns = processor(
        store.clone(),
        ScriptedStt::recognizing("good morning"),
        RecordingTts::working(),
    );

    let result = turns.process_turn("u1", b"clip", "en").await.unwrap();
    assert_eq!(result.outcome, Outcome::Failure);
    assert_eq!(
        result.response_text,
        "Not quite. The correct answer is 'Hello'. Let's try again."
    );
    assert_eq!(store.current_step("u1").await.unwrap(), Some(1));
}

#[tokio::test]
async fn feedback_is_localized_to_the_conversation_language() {
    let store = Arc::new(MemoryProgressStore::with_entry("u1", 1));
    let tts = RecordingTts::working();
    let turns = processor(
        store.clone(),
        ScriptedStt::recognizing("um, hello there"),
        tts.clone(),
    );

    let result = turns.process_turn("u1", b"clip", "hi").await.unwrap();
    assert_eq!(result.outcome, Outcome::Success);
    assert_eq!(result.response_text, "बहुत बढ़िया! 'Hello' सही है।");
    assert_eq!(store.current_step("u1").await.unwrap(), Some(2));

    let spoken = tts.spoken();
    assert_eq!(spoken.len(), 1);
    assert_eq!(spoken[0].1, "pNInz6obpgDQGcFmaJgB");
    assert_eq!(spoken[0].2.as_deref(), Some("hi"));
}

#[tokio::test]
async fn unsupported_language_falls_back_to_base_content() {
    let store = Arc::new(MemoryProgressStore::with_entry("u1", 1));
    let turns = processor(
        store,
        ScriptedStt::recognizing("hello everyone"),
        RecordingTts::working(),
    );

    let result = turns.process_turn("u1", b"clip", "de").await.unwrap();
    assert_eq!(result.response_text, "Great job! 'Hello' is correct.");
}

#[tokio::test]
async fn transcription_failure_leaves_progress_untouched() {
    let store = Arc::new(MemoryProgressStore::with_entry("u1", 1));
    let tts = RecordingTts::working();
    let turns = processor(store.clone(), ScriptedStt::failing(), tts.clone());

    let err = turns.process_turn("u1", b"clip", "en").await.unwrap_err();
    assert!(matches!(err, TurnError::UpstreamUnavailable(_)));
    assert_eq!(store.current_step("u1").await.unwrap(), Some(1));
    assert!(tts.spoken().is_empty());
}

#[tokio::test]
async fn synthesis_failure_leaves_progress_untouched() {
    let store = Arc::new(MemoryProgressStore::with_entry("u1", 1));
    let turns = processor(
        store.clone(),
        ScriptedStt::recognizing("hello"),
        RecordingTts::failing(),
    );

    let err = turns.process_turn("u1", b"clip", "en").await.unwrap_err();
    assert!(matches!(err, TurnError::UpstreamUnavailable(_)));
    assert_eq!(store.current_step("u1").await.unwrap(), Some(1));
}

#[tokio::test]
async fn finishing_the_last_step_parks_progress_on_the_sentinel() {
    let store = Arc::new(MemoryProgressStore::with_entry("u1", 2));
    let turns = processor(
        store.clone(),
        ScriptedStt::recognizing("Goodbye everyone"),
        RecordingTts::working(),
    );

    let result = turns.process_turn("u1", b"clip", "en").await.unwrap();
    assert_eq!(result.outcome, Outcome::Success);
    assert_eq!(
        result.response_text,
        "Excellent! 'Goodbye' is correct. You have finished this lesson!"
    );
    assert_eq!(
        store.current_step("u1").await.unwrap(),
        Some(PROGRESS_COMPLETE)
    );
}

#[tokio::test]
async fn completed_caller_hears_completion_without_transcription() {
    let store = Arc::new(MemoryProgressStore::with_entry("u1", PROGRESS_COMPLETE));
    let stt = ScriptedStt::recognizing("hello");
    let turns = processor(store.clone(), stt.clone(), RecordingTts::working());

    for _ in 0..2 {
        let result = turns.process_turn("u1", b"clip", "en").await.unwrap();
        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(result.transcript, "");
        assert!(result.response_text.starts_with("Congratulations!"));
    }
    assert_eq!(stt.calls(), 0);
    assert_eq!(
        store.current_step("u1").await.unwrap(),
        Some(PROGRESS_COMPLETE)
    );
}

#[tokio::test]
async fn dangling_step_pointer_degrades_to_completion() {
    let store = Arc::new(MemoryProgressStore::with_entry("u1", 99));
    let stt = ScriptedStt::recognizing("hello");
    let turns = processor(store.clone(), stt.clone(), RecordingTts::working());

    let result = turns.process_turn("u1", b"clip", "es").await.unwrap();
    assert_eq!(result.outcome, Outcome::Success);
    assert!(result.response_text.starts_with("¡Felicidades!"));
    assert_eq!(stt.calls(), 0);
    // Degradation is read-only; the defective pointer is left for
    // operators to find.
    assert_eq!(store.current_step("u1").await.unwrap(), Some(99));
}

#[tokio::test]
async fn losing_the_advance_race_fails_the_turn() {
    let store = Arc::new(ContestedStore {
        inner: MemoryProgressStore::with_entry("u1", 1),
    });
    let turns = processor(
        store,
        ScriptedStt::recognizing("hello"),
        RecordingTts::working(),
    );

    let err = turns.process_turn("u1", b"clip", "en").await.unwrap_err();
    assert!(matches!(err, TurnError::PersistenceError(_)));
    assert_eq!(err.kind(), "PERSISTENCE_ERROR");
}

#[tokio::test]
async fn reset_returns_the_caller_to_the_first_step() {
    let store = Arc::new(MemoryProgressStore::with_entry("u1", PROGRESS_COMPLETE));
    let turns = processor(
        store.clone(),
        ScriptedStt::recognizing("hello"),
        RecordingTts::working(),
    );

    assert_eq!(turns.reset_progress("u1").await.unwrap(), 1);
    assert_eq!(store.current_step("u1").await.unwrap(), Some(1));

    let err = turns.reset_progress("ghost").await.unwrap_err();
    assert!(matches!(err, TurnError::NotFound(_)));
}
