pub mod seed;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::TurnError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub target_language: String,
}

/// Per-language text for one step: what the tutor says in the learner's
/// conversation language.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepTranslation {
    pub agent_prompt: String,
    pub success_feedback: String,
    pub failure_feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonStep {
    pub id: i32,
    pub lesson_id: i32,
    /// The phrase being taught, in the target language.
    pub target_phrase: String,
    /// What the learner must approximately utter. Empty or absent means
    /// the step can never be passed until an operator fixes the content.
    pub expected_user_response: Option<String>,
    pub translations: HashMap<String, StepTranslation>,
    /// `None` marks the end of the step chain.
    pub next_step_id: Option<i32>,
}

/// A step flattened into one conversation language.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedStep {
    pub id: i32,
    pub lesson_id: i32,
    pub target_phrase: String,
    pub expected_user_response: Option<String>,
    pub agent_prompt: String,
    pub success_feedback: String,
    pub failure_feedback: String,
    pub next_step_id: Option<i32>,
}

/// Standalone tutor messages that are not tied to a single step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiMessages {
    /// Spoken when the caller has no steps left at all.
    pub all_lessons_complete: String,
    /// Appended to the success feedback of a lesson's last step.
    pub lesson_finished_suffix: String,
}

/// Read-only lesson content, keyed by step id. Step order is defined by
/// the `next_step_id` chain, not by ids.
#[derive(Debug, Clone)]
pub struct LessonCatalog {
    base_language: String,
    lessons: Vec<Lesson>,
    steps: HashMap<i32, LessonStep>,
    messages: HashMap<String, UiMessages>,
    first_step_id: Option<i32>,
}

impl LessonCatalog {
    pub fn new(
        base_language: impl Into<String>,
        lessons: Vec<Lesson>,
        steps: Vec<LessonStep>,
        messages: HashMap<String, UiMessages>,
    ) -> Self {
        // Entry point: the step no other step points at, falling back to
        // the lowest id when the chain is malformed.
        let referenced: Vec<i32> = steps.iter().filter_map(|s| s.next_step_id).collect();
        let first_step_id = steps
            .iter()
            .map(|s| s.id)
            .filter(|id| !referenced.contains(id))
            .min()
            .or_else(|| steps.iter().map(|s| s.id).min());

        Self {
            base_language: base_language.into(),
            lessons,
            steps: steps.into_iter().map(|s| (s.id, s)).collect(),
            messages,
            first_step_id,
        }
    }

    pub fn base_language(&self) -> &str {
        &self.base_language
    }

    /// The step id new (or reset) callers start from.
    pub fn first_step_id(&self) -> Option<i32> {
        self.first_step_id
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn lesson(&self, id: i32) -> Result<&Lesson, TurnError> {
        self.lessons
            .iter()
            .find(|lesson| lesson.id == id)
            .ok_or_else(|| TurnError::NotFound(format!("lesson {id} does not exist")))
    }

    pub fn step(&self, id: i32) -> Option<&LessonStep> {
        self.steps.get(&id)
    }

    /// Resolves one step into the requested conversation language,
    /// falling back to the base language. Only a missing base-language
    /// entry is an error.
    pub fn resolve_step(
        &self,
        step: &LessonStep,
        language: &str,
    ) -> Result<LocalizedStep, TurnError> {
        let translation = step
            .translations
            .get(language)
            .or_else(|| step.translations.get(&self.base_language))
            .ok_or_else(|| {
                TurnError::ContentMissing(format!(
                    "step {} has no {} translation",
                    step.id, self.base_language
                ))
            })?;

        Ok(LocalizedStep {
            id: step.id,
            lesson_id: step.lesson_id,
            target_phrase: step.target_phrase.clone(),
            expected_user_response: step.expected_user_response.clone(),
            agent_prompt: translation.agent_prompt.clone(),
            success_feedback: translation.success_feedback.clone(),
            failure_feedback: translation.failure_feedback.clone(),
            next_step_id: step.next_step_id,
        })
    }

    /// All steps of one lesson, localized, in chain order.
    pub fn lesson_steps(
        &self,
        lesson_id: i32,
        language: &str,
    ) -> Result<Vec<LocalizedStep>, TurnError> {
        self.lesson(lesson_id)?;

        let in_lesson: Vec<&LessonStep> = self
            .steps
            .values()
            .filter(|s| s.lesson_id == lesson_id)
            .collect();
        let referenced: Vec<i32> = in_lesson.iter().filter_map(|s| s.next_step_id).collect();

        let mut ordered = Vec::with_capacity(in_lesson.len());
        let mut cursor = in_lesson
            .iter()
            .map(|s| s.id)
            .filter(|id| !referenced.contains(id))
            .min();
        while let Some(id) = cursor {
            let Some(step) = in_lesson.iter().find(|s| s.id == id) else {
                break;
            };
            ordered.push(self.resolve_step(step, language)?);
            if ordered.len() == in_lesson.len() {
                break;
            }
            cursor = step.next_step_id;
        }
        Ok(ordered)
    }

    pub fn messages(&self, language: &str) -> Result<&UiMessages, TurnError> {
        self.messages
            .get(language)
            .or_else(|| self.messages.get(&self.base_language))
            .ok_or_else(|| {
                TurnError::ContentMissing(format!(
                    "no {} tutor messages configured",
                    self.base_language
                ))
            })
    }

    /// Content-integrity findings: dangling successor pointers, missing
    /// base-language translations, steps owned by unknown lessons. These
    /// degrade gracefully at runtime but should be fixed in the content.
    pub fn validate(&self) -> Vec<String> {
        let mut findings = Vec::new();

        for step in self.steps.values() {
            if let Some(next) = step.next_step_id {
                match self.steps.get(&next) {
                    None => findings.push(format!(
                        "step {} points at missing step {next}",
                        step.id
                    )),
                    Some(successor) if successor.lesson_id != step.lesson_id => findings.push(
                        format!("step {} points outside its lesson (step {next})", step.id),
                    ),
                    Some(_) => {}
                }
            }
            if !step.translations.contains_key(&self.base_language) {
                findings.push(format!(
                    "step {} is missing its {} translation",
                    step.id, self.base_language
                ));
            }
            if self.lessons.iter().all(|l| l.id != step.lesson_id) {
                findings.push(format!(
                    "step {} belongs to unknown lesson {}",
                    step.id, step.lesson_id
                ));
            }
        }

        if !self.messages.contains_key(&self.base_language) {
            findings.push(format!(
                "tutor messages are missing the {} entry",
                self.base_language
            ));
        }

        findings
    }
}
