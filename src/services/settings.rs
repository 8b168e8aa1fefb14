use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::settings::{get_settings_row, update_settings_row};
use crate::db::Database;
use crate::error::TurnError;
use crate::services::tts_provider::default_voice_for_language;

pub const SUPPORTED_CONVERSATION_LANGUAGES: &[&str] = &["en", "hi", "es", "fr"];
pub const SUPPORTED_TARGET_LANGUAGES: &[&str] = &["en"];

const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub conversation_language: String,
    pub target_language: String,
    pub preferred_voice_id: String,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub conversation_language: Option<String>,
    pub target_language: Option<String>,
    pub preferred_voice_id: Option<String>,
}

/// The conversation language must be a supported instruction language,
/// the target a supported taught language, and the two must differ.
pub fn validate_language_pair(conversation: &str, target: &str) -> Result<(), TurnError> {
    if !SUPPORTED_CONVERSATION_LANGUAGES.contains(&conversation) {
        return Err(TurnError::InvalidInput(format!(
            "conversation language '{conversation}' is not supported"
        )));
    }
    if !SUPPORTED_TARGET_LANGUAGES.contains(&target) {
        return Err(TurnError::InvalidInput(format!(
            "target language '{target}' is not supported"
        )));
    }
    if conversation == target {
        return Err(TurnError::InvalidInput(
            "conversation language and target language must be different".to_string(),
        ));
    }
    Ok(())
}

pub struct SettingsService {
    db: Database,
}

impl SettingsService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn get_settings(&self, caller_id: &str) -> Result<UserSettings, TurnError> {
        let row = get_settings_row(&self.db, caller_id)
            .await
            .map_err(|e| TurnError::PersistenceError(e.to_string()))?
            .ok_or_else(|| TurnError::NotFound(format!("caller {caller_id} does not exist")))?;

        let conversation_language = row
            .conversation_language
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let preferred_voice_id = row
            .preferred_voice_id
            .unwrap_or_else(|| default_voice_for_language(&conversation_language).to_string());

        Ok(UserSettings {
            target_language: row
                .target_language
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            conversation_language,
            preferred_voice_id,
        })
    }

    pub async fn update_settings(
        &self,
        caller_id: &str,
        update: SettingsUpdate,
    ) -> Result<UserSettings, TurnError> {
        let current = self.get_settings(caller_id).await?;

        let merged = UserSettings {
            conversation_language: update
                .conversation_language
                .unwrap_or(current.conversation_language),
            target_language: update.target_language.unwrap_or(current.target_language),
            preferred_voice_id: update
                .preferred_voice_id
                .unwrap_or(current.preferred_voice_id),
        };
        validate_language_pair(&merged.conversation_language, &merged.target_language)?;

        let updated = update_settings_row(
            &self.db,
            caller_id,
            &merged.conversation_language,
            &merged.target_language,
            &merged.preferred_voice_id,
        )
        .await
        .map_err(|e| TurnError::PersistenceError(e.to_string()))?;
        if !updated {
            return Err(TurnError::NotFound(format!(
                "caller {caller_id} does not exist"
            )));
        }

        info!(
            caller = caller_id,
            conversation = %merged.conversation_language,
            target = %merged.target_language,
            "settings updated"
        );
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_pairs_pass() {
        for conversation in ["hi", "es", "fr"] {
            assert!(validate_language_pair(conversation, "en").is_ok());
        }
    }

    #[test]
    fn same_language_pair_is_rejected() {
        let err = validate_language_pair("en", "en").unwrap_err();
        assert!(matches!(err, TurnError::InvalidInput(_)));
    }

    #[test]
    fn unsupported_languages_are_rejected() {
        assert!(validate_language_pair("de", "en").is_err());
        assert!(validate_language_pair("hi", "fr").is_err());
    }
}
