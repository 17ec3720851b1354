use serde::{Deserialize, Serialize};

use crate::{agent::memory::Message, database::schema::UserProfile};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionResponse {
    pub session_id: String,
    pub authenticated: bool,
    pub persona_version: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HistoryResponse {
    pub session_id: String,
    pub authenticated: bool,
    /// false once a storage failure left the session memory-only
    pub saved: bool,
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatRequest {
    pub content: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ChatResponse {
    pub content: String,
    pub thinking: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthResponse {
    pub user_id: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SaveInfoRequest {
    #[serde(default)]
    pub pregnancy_weeks: Option<u32>,
    #[serde(default)]
    pub baby_age_months: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReminderRequest {
    pub reminder: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProfileResponse {
    pub profile: UserProfile,
    pub banners: Vec<String>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            banners: profile.banners(),
            profile,
        }
    }
}
