use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Telegram bot credential.
    #[serde(default)]
    pub bot_token: String,

    /// Chat the finished reports and voice forwards are sent to.
    #[serde(default)]
    pub admin_chat_id: i64,

    /// Identities (username or numeric id) allowed to talk to the bot.
    /// `*` admits everyone, which is the default for a public survey.
    #[serde(default = "default_allowed_users")]
    pub allowed_users: Vec<String>,

    /// Custom question list; the built-in survey is used when absent.
    #[serde(default)]
    pub survey: Option<SurveyConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    pub questions: Vec<QuestionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionConfig {
    pub prompt: String,
    /// Empty options list means a free-form question.
    #[serde(default)]
    pub options: Vec<String>,
    /// Keep only the latest selection and advance on tap.
    #[serde(default)]
    pub exclusive: bool,
    /// Offer an "Other" button redirecting to free text/voice.
    #[serde(default)]
    pub allow_custom: bool,
}

fn default_allowed_users() -> Vec<String> {
    vec!["*".into()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            bot_token: String::new(),
            admin_chat_id: 0,
            allowed_users: default_allowed_users(),
            survey: None,
        }
    }
}

impl Config {
    /// Load `~/.canvass/config.toml`, writing a default file on first run.
    pub fn load_or_init() -> Result<Self, ConfigError> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .ok_or_else(|| ConfigError::Load("could not find home directory".into()))?;
        let canvass_dir = home.join(".canvass");
        let config_path = canvass_dir.join("config.toml");

        if !canvass_dir.exists() {
            fs::create_dir_all(&canvass_dir)?;
        }

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            let config = Self {
                config_path: config_path.clone(),
                ..Self::default()
            };
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(format!("failed to parse {}: {e}", path.display())))?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Environment overrides win over the file. `BOT_TOKEN` and
    /// `ADMIN_CHAT_ID` are honored as fallbacks for deployments that only
    /// carry the bare variables.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) =
            std::env::var("CANVASS_BOT_TOKEN").or_else(|_| std::env::var("BOT_TOKEN"))
        {
            if !token.is_empty() {
                self.bot_token = token;
            }
        }

        if let Ok(admin) =
            std::env::var("CANVASS_ADMIN_CHAT_ID").or_else(|_| std::env::var("ADMIN_CHAT_ID"))
        {
            if let Ok(chat_id) = admin.parse::<i64>() {
                self.admin_chat_id = chat_id;
            }
        }
    }

    /// The run command needs a credential and somewhere to send reports.
    pub fn validate_for_run(&self) -> Result<(), ConfigError> {
        if self.bot_token.is_empty() {
            return Err(ConfigError::Validation(format!(
                "bot_token is empty; set it in {} or via CANVASS_BOT_TOKEN",
                self.config_path.display()
            )));
        }
        if self.admin_chat_id == 0 {
            return Err(ConfigError::Validation(format!(
                "admin_chat_id is unset; set it in {} or via CANVASS_ADMIN_CHAT_ID",
                self.config_path.display()
            )));
        }
        Ok(())
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Load(format!("failed to serialize config: {e}")))?;
        fs::write(&self.config_path, toml_str)?;
        Ok(())
    }
}
