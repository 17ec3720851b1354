use std::{fs, path::PathBuf, str::FromStr, time::Duration};

use anyhow::Result;
use config::Config;
use duration_string::DurationString;
use serde::{Deserialize, Serialize};

use crate::{constant, error::FifiError};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ModelConfig {
    pub provider: String,
    pub name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "openrouter".into(),
            name: "openai/gpt-4".into(),
            api_key: "".into(),
            base_url: "".into(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CompletionConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    /// number of user/assistant turns sent to the endpoint, 0 sends everything
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    #[serde(default = "default_timeout")]
    pub timeout: DurationString,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff: DurationString,
}

fn default_temperature() -> f64 {
    0.4
}

fn default_max_tokens() -> u64 {
    600
}

fn default_history_window() -> usize {
    10
}

fn default_timeout() -> DurationString {
    Duration::from_secs(60).into()
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff() -> DurationString {
    Duration::from_millis(500).into()
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            presence_penalty: None,
            frequency_penalty: None,
            history_window: default_history_window(),
            timeout: default_timeout(),
            max_retries: default_max_retries(),
            retry_backoff: default_retry_backoff(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PersonaConfig {
    #[serde(default = "default_persona_version")]
    pub version: String,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_persona_version() -> String {
    constant::PERSONA_VERSION.into()
}

fn default_system_prompt() -> String {
    constant::PERSONA_MD.trim().into()
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            version: default_persona_version(),
            system_prompt: default_system_prompt(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AugmentConfig {
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
}

fn default_max_articles() -> usize {
    3
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            max_articles: default_max_articles(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StorageConfig {
    pub workspace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            workspace: "~/.fifi".into(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ChannelsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HTTPChannelConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HTTPChannelConfig {
    pub port: u32,
    /// sessions idle for longer are dropped from memory
    #[serde(default = "default_session_ttl")]
    pub session_ttl: DurationString,
}

fn default_session_ttl() -> DurationString {
    Duration::from_secs(30 * 60).into()
}

impl HTTPChannelConfig {
    pub fn new(port: u32) -> Self {
        Self {
            port,
            session_ttl: default_session_ttl(),
        }
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from(self.session_ttl.clone())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FifiConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub persona: PersonaConfig,
    #[serde(default)]
    pub augment: AugmentConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub channels: ChannelsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
struct AllConfig {
    fifi: FifiConfig,
}

impl FifiConfig {
    pub fn default_path() -> Result<PathBuf> {
        let mut default_path = dirs::home_dir()
            .ok_or_else(|| FifiError::Config("cannot resolve home directory".into()))?;
        default_path.push(PathBuf::from_str(constant::DEFAULT_CONFIG_PATH)?);

        Ok(default_path)
    }

    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => {
                let default_path = Self::default_path()?;
                log::warn!("config path not inputed, fallback to {:?}", default_path);

                default_path
            }
        };

        if !path.exists() {
            log::warn!("{:?} not found, generating a new config file", path);

            Self::create_file(path.clone())?;
        }

        let settings = Config::builder()
            .add_source(config::File::from(path.clone()))
            .build()?;

        log::info!("config loaded: {:?}", path);
        let config = settings.try_deserialize::<AllConfig>()?;

        Ok(config.fifi.resolve())
    }

    /// fills secrets from the environment and expands `~` in the workspace path
    fn resolve(mut self) -> Self {
        if self.model.api_key.is_empty() {
            if let Ok(api_key) = std::env::var(constant::API_KEY_ENV) {
                self.model.api_key = api_key;
            }
        }

        if let Some(rest) = self.storage.workspace.strip_prefix("~") {
            if let Some(home) = dirs::home_dir() {
                self.storage.workspace = format!("{}{}", home.display(), rest);
            }
        }

        self
    }

    pub fn create_file(path: PathBuf) -> Result<()> {
        if let Some(parent_dir) = path.parent() {
            std::fs::create_dir_all(parent_dir)?;
        }

        fs::write(&path, constant::DEFAULT_CONFIG_TOML)?;

        Ok(())
    }

    pub fn save(&self, path: PathBuf, commented_suffix: String) -> Result<()> {
        if let Some(parent_dir) = path.parent() {
            std::fs::create_dir_all(parent_dir)?;
        }

        let content = toml::to_string_pretty(&AllConfig { fifi: self.clone() })?;
        fs::write(&path, format!("{}{}", content, commented_suffix))?;

        Ok(())
    }
}

impl CompletionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from(self.timeout.clone())
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from(self.retry_backoff.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_template_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = FifiConfig::load(Some(path.clone())).unwrap();

        assert!(path.exists());
        assert_eq!(config.model.provider, "openrouter");
        assert_eq!(config.model.name, "openai/gpt-4");
        assert_eq!(config.completion.temperature, 0.4);
        assert_eq!(config.completion.max_tokens, 600);
        assert_eq!(config.completion.presence_penalty, None);
        assert_eq!(config.completion.history_window, 10);
        assert_eq!(config.completion.timeout(), Duration::from_secs(60));
        assert_eq!(config.completion.retry_backoff(), Duration::from_millis(500));
        assert_eq!(config.augment.max_articles, 3);
        let http = config.channels.http.unwrap();
        assert_eq!(http.port, 8080);
        assert_eq!(http.session_ttl(), Duration::from_secs(30 * 60));
        assert!(config.persona.system_prompt.starts_with("You are Fifi"));
        assert!(!config.storage.workspace.starts_with('~'));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = FifiConfig::default();
        config.model.provider = "ollama".into();
        config.model.name = "llama3.1".into();
        config.model.base_url = "http://localhost:11434".into();
        config.model.api_key = "unused".into();
        config.completion.frequency_penalty = Some(0.3);
        config.storage.workspace = dir.path().to_string_lossy().to_string();
        config.channels.http = Some(HTTPChannelConfig {
            port: 9000,
            session_ttl: Duration::from_secs(120).into(),
        });

        config
            .save(path.clone(), "\n# trailing comment\n".into())
            .unwrap();
        let loaded = FifiConfig::load(Some(path)).unwrap();

        assert_eq!(loaded.model, config.model);
        assert_eq!(loaded.completion.frequency_penalty, Some(0.3));
        assert_eq!(loaded.completion.timeout(), Duration::from_secs(60));
        assert_eq!(loaded.persona, config.persona);
        assert_eq!(loaded.storage, config.storage);
        let http = loaded.channels.http.unwrap();
        assert_eq!(http.port, 9000);
        assert_eq!(http.session_ttl(), Duration::from_secs(120));
    }
}
