use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use teloxide::types::ChatId;

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    telegram_bot_token: String,
    /// OpenAI API key for the AI fallback path. Empty = fallback disabled.
    #[serde(default)]
    openai_api_key: String,
    /// Groups the bot responds in. Empty = respond in any group.
    #[serde(default)]
    allowed_groups: Vec<i64>,
    /// Chat that receives WARN/ERROR log lines.
    log_chat_id: Option<i64>,
    /// Directory for state files (logs). Defaults to current directory.
    data_dir: Option<String>,
    /// Directory of lesson text files.
    lessons_dir: Option<String>,
    /// Directory of explanation text files.
    explanations_dir: Option<String>,
    #[serde(default = "default_cooldown_secs")]
    intent_cooldown_secs: u64,
    #[serde(default = "default_cooldown_secs")]
    ai_cooldown_secs: u64,
    #[serde(default = "default_context_timeout_secs")]
    context_timeout_secs: u64,
}

fn default_cooldown_secs() -> u64 {
    60
}

fn default_context_timeout_secs() -> u64 {
    300
}

pub struct Config {
    pub telegram_bot_token: String,
    /// Empty string disables the AI fallback path.
    pub openai_api_key: String,
    pub allowed_groups: HashSet<ChatId>,
    pub log_chat_id: Option<ChatId>,
    /// Directory for state files (logs).
    pub data_dir: PathBuf,
    pub lessons_dir: PathBuf,
    pub explanations_dir: PathBuf,
    /// Minimum interval between automatic intent replies to one user.
    pub intent_cooldown_secs: u64,
    /// Minimum interval between AI replies to one user.
    pub ai_cooldown_secs: u64,
    /// How long a detected topic is remembered for the AI hint.
    pub context_timeout_secs: u64,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?;

        // The bot token is the only thing allowed to stop startup
        if file.telegram_bot_token.is_empty() {
            return Err(ConfigError::Validation("telegram_bot_token is required".into()));
        }
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = file.telegram_bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "telegram_bot_token appears invalid (expected format: 123456789:ABCdefGHI...)".into()
            ));
        }

        if file.intent_cooldown_secs == 0 || file.ai_cooldown_secs == 0 {
            return Err(ConfigError::Validation("cooldown windows must be at least 1 second".into()));
        }

        let allowed_groups = file.allowed_groups.into_iter().map(ChatId).collect();

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let lessons_dir = file
            .lessons_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("content/lessons"));
        let explanations_dir = file
            .explanations_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("content/explanations"));

        Ok(Self {
            telegram_bot_token: file.telegram_bot_token,
            openai_api_key: file.openai_api_key,
            allowed_groups,
            log_chat_id: file.log_chat_id.map(ChatId),
            data_dir,
            lessons_dir,
            explanations_dir,
            intent_cooldown_secs: file.intent_cooldown_secs,
            ai_cooldown_secs: file.ai_cooldown_secs,
            context_timeout_secs: file.context_timeout_secs,
        })
    }

    pub fn ai_enabled(&self) -> bool {
        !self.openai_api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn assert_err<T>(result: Result<T, ConfigError>) -> ConfigError {
        match result {
            Ok(_) => panic!("expected error, got Ok"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_valid_config() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdefGHIjklMNOpqrsTUVwxyz"
        }"#);
        let config = Config::load(file.path()).expect("should load valid config");
        assert_eq!(config.intent_cooldown_secs, 60);
        assert_eq!(config.ai_cooldown_secs, 60);
        assert_eq!(config.context_timeout_secs, 300);
        assert!(!config.ai_enabled());
        assert_eq!(config.lessons_dir, PathBuf::from("content/lessons"));
    }

    #[test]
    fn test_ai_key_enables_fallback() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "openai_api_key": "sk-test"
        }"#);
        let config = Config::load(file.path()).unwrap();
        assert!(config.ai_enabled());
    }

    #[test]
    fn test_overridden_windows() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "intent_cooldown_secs": 120,
            "ai_cooldown_secs": 30,
            "context_timeout_secs": 600
        }"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.intent_cooldown_secs, 120);
        assert_eq!(config.ai_cooldown_secs, 30);
        assert_eq!(config.context_timeout_secs, 600);
    }

    #[test]
    fn test_empty_token() {
        let file = write_config(r#"{
            "telegram_bot_token": ""
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("telegram_bot_token"));
    }

    #[test]
    fn test_missing_token_field() {
        let file = write_config(r#"{}"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::ParseJson { .. }));
    }

    #[test]
    fn test_invalid_token_format_no_colon() {
        let file = write_config(r#"{
            "telegram_bot_token": "invalid_token_no_colon"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn test_invalid_token_format_non_numeric_id() {
        let file = write_config(r#"{
            "telegram_bot_token": "notanumber:ABCdef"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_zero_cooldown_rejected() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "intent_cooldown_secs": 0
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_file_not_found() {
        let err = assert_err(Config::load("/nonexistent/path/config.json"));
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{ invalid json }");
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::ParseJson { .. }));
    }
}
