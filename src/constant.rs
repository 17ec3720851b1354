pub const DEFAULT_CONFIG_PATH: &str = ".fifi/config.toml"; // relative to $HOME
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../templates/.fifi.template.toml");

pub const PERSONA_MD: &str = include_str!("../templates/PERSONA.MD");
pub const PERSONA_VERSION: &str = "2025-02";

pub const API_KEY_ENV: &str = "FIFI_API_KEY";

pub const DB_NAMESPACE: &str = "fifi";
pub const DB_NAME: &str = "v1";
pub const CHATS_TABLE: &str = "chats";
pub const USERS_TABLE: &str = "users";

pub const ERROR_REPLY_PREFIX: &str = "An error occurred:";
pub const MIN_PASSWORD_LEN: usize = 6;
