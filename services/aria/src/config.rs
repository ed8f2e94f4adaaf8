use aria_core::profile::UserProfile;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
///
/// Nothing here is mandatory: missing API keys degrade the matching feature
/// (offline conversational fallback, uncalibrated weather module) instead of
/// aborting startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub user_name: String,
    pub user_location: String,
    pub user_interests: Vec<String>,
    pub status_level: String,
    pub weather_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub chat_api_base: Option<String>,
    pub chat_model: String,
    pub tts_enabled: bool,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let user_name = std::env::var("USER_NAME").unwrap_or_else(|_| "Operator".to_string());
        let user_location =
            std::env::var("USER_LOCATION").unwrap_or_else(|_| "London".to_string());
        let user_interests = std::env::var("USER_INTERESTS")
            .unwrap_or_else(|_| "coding, space exploration, cybersecurity".to_string())
            .split(',')
            .map(|interest| interest.trim().to_string())
            .filter(|interest| !interest.is_empty())
            .collect();
        let status_level =
            std::env::var("STATUS_LEVEL").unwrap_or_else(|_| "Optimal".to_string());

        let weather_api_key = std::env::var("OPENWEATHERMAP_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());
        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());
        let chat_api_base = std::env::var("CHAT_API_BASE")
            .ok()
            .filter(|base| !base.is_empty());
        let chat_model =
            std::env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let tts_enabled = match std::env::var("TTS_ENABLED") {
            Ok(raw) => raw.parse::<bool>().map_err(|_| {
                ConfigError::InvalidValue(
                    "TTS_ENABLED".to_string(),
                    format!("'{raw}' is not a boolean"),
                )
            })?,
            Err(_) => false,
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{log_level_str}' is not a valid log level"),
            )
        })?;

        Ok(Self {
            user_name,
            user_location,
            user_interests,
            status_level,
            weather_api_key,
            openai_api_key,
            chat_api_base,
            chat_model,
            tts_enabled,
            log_level,
        })
    }

    /// The user profile assembled from the profile-related variables.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            name: self.user_name.clone(),
            location: self.user_location.clone(),
            interests: self.user_interests.clone(),
            status_level: self.status_level.clone(),
        }
    }
}
