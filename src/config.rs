const DEFAULT_BASE_LANGUAGE: &str = "en";

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub base_language: String,
}

impl Config {
    /// Loads `.env` (if present) and then reads configuration from the
    /// process environment.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    pub fn from_env() -> Self {
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let base_language = std::env::var("BASE_LANGUAGE")
            .ok()
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_LANGUAGE.to_string());

        Self {
            log_level,
            base_language,
        }
    }
}
