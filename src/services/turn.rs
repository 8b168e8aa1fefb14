use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::content::LessonCatalog;
use crate::error::TurnError;
use crate::progress::{ProgressStore, PROGRESS_COMPLETE};
use crate::services::stt_provider::SpeechToText;
use crate::services::tts_provider::{default_voice_for_language, TextToSpeech};

// Substituted for an empty expected response so the step cannot be
// passed by accident: transcripts never contain control characters.
const UNMATCHABLE_RESPONSE: &str = "\u{1}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// Everything one turn produces. Not persisted; the audio is the primary
/// response body and the rest travels as out-of-band metadata.
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub transcript: String,
    pub response_text: String,
    pub outcome: Outcome,
    pub audio: Bytes,
}

/// Drives one conversational turn: transcribe the caller's clip, judge
/// it against the current step, advance or hold progress, and speak the
/// localized feedback.
pub struct TurnProcessor {
    catalog: LessonCatalog,
    progress: Arc<dyn ProgressStore>,
    stt: Arc<dyn SpeechToText>,
    tts: Arc<dyn TextToSpeech>,
}

impl TurnProcessor {
    pub fn new(
        catalog: LessonCatalog,
        progress: Arc<dyn ProgressStore>,
        stt: Arc<dyn SpeechToText>,
        tts: Arc<dyn TextToSpeech>,
    ) -> Self {
        Self {
            catalog,
            progress,
            stt,
            tts,
        }
    }

    pub fn catalog(&self) -> &LessonCatalog {
        &self.catalog
    }

    /// Processes one audio submission for an authenticated caller.
    ///
    /// Progress is written exactly once, and only after the feedback
    /// audio has been synthesized: a turn that fails anywhere leaves the
    /// caller's step pointer untouched. The write is advance-if-current,
    /// so of two overlapping turns only one can move the pointer; the
    /// other is rejected.
    pub async fn process_turn(
        &self,
        caller_id: &str,
        audio: &[u8],
        conversation_language: &str,
    ) -> Result<TurnResult, TurnError> {
        if audio.is_empty() {
            return Err(TurnError::InvalidInput(
                "empty audio submission; record again and resubmit".to_string(),
            ));
        }

        let turn_id = Uuid::new_v4();

        let current = self
            .progress
            .current_step(caller_id)
            .await
            .map_err(|e| TurnError::PersistenceError(e.to_string()))?
            .ok_or_else(|| {
                TurnError::NotFound(format!("no progress record for caller {caller_id}"))
            })?;

        let step = if current == PROGRESS_COMPLETE {
            None
        } else {
            let step = self.catalog.step(current);
            if step.is_none() {
                // Dangling pointer in the content; degrade to "complete".
                warn!(%turn_id, step = current, "progress points at a missing step");
            }
            step
        };

        let Some(step) = step else {
            let response_text = self
                .catalog
                .messages(conversation_language)?
                .all_lessons_complete
                .clone();
            let audio = self.speak(&response_text, conversation_language).await?;
            info!(%turn_id, caller = caller_id, "caller has no steps left");
            return Ok(TurnResult {
                transcript: String::new(),
                response_text,
                outcome: Outcome::Success,
                audio,
            });
        };

        let transcript = self.stt.transcribe(audio).await.map_err(|e| {
            warn!(%turn_id, error = %e, "transcription failed");
            TurnError::UpstreamUnavailable(format!("speech-to-text failed: {e}"))
        })?;

        let localized = self.catalog.resolve_step(step, conversation_language)?;
        let matched = transcript_matches(&transcript, localized.expected_user_response.as_deref());

        if !matched {
            info!(%turn_id, caller = caller_id, step = step.id, "response did not match");
            let audio = self
                .speak(&localized.failure_feedback, conversation_language)
                .await?;
            return Ok(TurnResult {
                transcript,
                response_text: localized.failure_feedback,
                outcome: Outcome::Failure,
                audio,
            });
        }

        let mut response_text = localized.success_feedback;
        let next = match step.next_step_id {
            Some(next) => next,
            None => {
                let suffix = &self
                    .catalog
                    .messages(conversation_language)?
                    .lesson_finished_suffix;
                response_text.push(' ');
                response_text.push_str(suffix);
                PROGRESS_COMPLETE
            }
        };

        let audio = self.speak(&response_text, conversation_language).await?;

        let advanced = self
            .progress
            .advance_if_current(caller_id, current, next)
            .await
            .map_err(|e| TurnError::PersistenceError(e.to_string()))?;
        if !advanced {
            warn!(%turn_id, caller = caller_id, step = current, "concurrent turn won the advance");
            return Err(TurnError::PersistenceError(
                "progress changed while the turn was in flight; please retry".to_string(),
            ));
        }

        info!(%turn_id, caller = caller_id, from = current, to = next, "progress advanced");
        Ok(TurnResult {
            transcript,
            response_text,
            outcome: Outcome::Success,
            audio,
        })
    }

    /// Rewinds the caller to the catalog's first step.
    pub async fn reset_progress(&self, caller_id: &str) -> Result<i32, TurnError> {
        let first = self.catalog.first_step_id().ok_or_else(|| {
            TurnError::ContentMissing("catalog has no steps to reset to".to_string())
        })?;

        let found = self
            .progress
            .reset(caller_id, first)
            .await
            .map_err(|e| TurnError::PersistenceError(e.to_string()))?;
        if !found {
            return Err(TurnError::NotFound(format!(
                "no progress record for caller {caller_id}"
            )));
        }
        info!(caller = caller_id, step = first, "progress reset");
        Ok(first)
    }

    async fn speak(&self, text: &str, language: &str) -> Result<Bytes, TurnError> {
        let voice = default_voice_for_language(language);
        self.tts
            .synthesize(text, voice, Some(language))
            .await
            .map_err(|e| {
                warn!(error = %e, "synthesis failed");
                TurnError::UpstreamUnavailable(format!("text-to-speech failed: {e}"))
            })
    }
}

pub fn normalize_speech(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Lenient correctness check: the normalized transcript must contain the
/// normalized expected phrase. Natural speech transcripts carry filler
/// words, so exact equality is not required.
pub fn transcript_matches(transcript: &str, expected: Option<&str>) -> bool {
    let needle = match expected.map(normalize_speech).filter(|e| !e.is_empty()) {
        Some(needle) => needle,
        None => UNMATCHABLE_RESPONSE.to_string(),
    };
    normalize_speech(transcript).contains(&needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_cased_transcript_matches() {
        assert!(transcript_matches("  Hello there!  ", Some("hello")));
    }

    #[test]
    fn filler_words_around_the_phrase_match() {
        assert!(transcript_matches("um, thank you very much", Some("Thank you")));
    }

    #[test]
    fn unrelated_transcript_does_not_match() {
        assert!(!transcript_matches("goodbye", Some("hello")));
    }

    #[test]
    fn empty_or_absent_expected_never_matches() {
        assert!(!transcript_matches("anything at all", Some("")));
        assert!(!transcript_matches("anything at all", Some("   ")));
        assert!(!transcript_matches("anything at all", None));
        assert!(!transcript_matches("", None));
    }

    #[test]
    fn outcome_tags_are_stable() {
        assert_eq!(Outcome::Success.as_str(), "success");
        assert_eq!(Outcome::Failure.as_str(), "failure");
        assert_eq!(
            serde_json::to_string(&Outcome::Failure).unwrap(),
            "\"failure\""
        );
    }
}
