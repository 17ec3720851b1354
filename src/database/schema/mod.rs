use std::collections::BTreeSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::agent::memory::Message;

/// `chats:{user_id}`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct ChatDocument {
    #[serde(default)]
    pub history: Vec<Message>,
}

/// `users:{user_id}`, account and profile share one document
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserRecord {
    pub user_id: String,
    pub email: String,
    pub password_hash: String,
    pub sign_up_date: chrono::DateTime<Utc>,
    #[serde(default)]
    pub pregnancy_weeks: Option<u32>,
    #[serde(default)]
    pub baby_age_months: Option<u32>,
    #[serde(default)]
    pub reminders: BTreeSet<String>,
}

impl UserRecord {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            email: self.email.clone(),
            pregnancy_weeks: self.pregnancy_weeks,
            baby_age_months: self.baby_age_months,
            reminders: self.reminders.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct UserProfile {
    pub email: String,
    pub pregnancy_weeks: Option<u32>,
    pub baby_age_months: Option<u32>,
    pub reminders: BTreeSet<String>,
}

impl UserProfile {
    pub fn banners(&self) -> Vec<String> {
        let mut banners = vec![];

        if let Some(weeks) = self.pregnancy_weeks {
            let trimester = match weeks {
                0..=13 => "first",
                14..=27 => "second",
                _ => "third",
            };
            banners.push(format!(
                "🤰 You are {weeks} weeks pregnant, in your {trimester} trimester."
            ));
        }

        if let Some(months) = self.baby_age_months {
            let unit = if months == 1 { "month" } else { "months" };
            banners.push(format!("👶 Your baby is {months} {unit} old."));
        }

        for reminder in &self.reminders {
            banners.push(format!("⏰ Reminder: {reminder}"));
        }

        banners
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banners_empty_profile() {
        assert!(UserProfile::default().banners().is_empty());
    }

    #[test]
    fn test_banners() {
        let profile = UserProfile {
            email: "mom@example.com".into(),
            pregnancy_weeks: Some(20),
            baby_age_months: Some(1),
            reminders: BTreeSet::from(["prenatal vitamins".to_string()]),
        };

        assert_eq!(
            profile.banners(),
            vec![
                "🤰 You are 20 weeks pregnant, in your second trimester.".to_string(),
                "👶 Your baby is 1 month old.".to_string(),
                "⏰ Reminder: prenatal vitamins".to_string(),
            ]
        );
    }

    #[test]
    fn test_trimester_boundaries() {
        let banner = |weeks| {
            UserProfile {
                pregnancy_weeks: Some(weeks),
                ..Default::default()
            }
            .banners()
            .remove(0)
        };

        assert!(banner(13).contains("first"));
        assert!(banner(14).contains("second"));
        assert!(banner(28).contains("third"));
    }
}
