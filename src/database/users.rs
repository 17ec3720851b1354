use std::collections::BTreeSet;

use chrono::Utc;

use crate::{
    constant::{MIN_PASSWORD_LEN, USERS_TABLE},
    database::{
        FifiDatabases,
        schema::{UserProfile, UserRecord},
    },
    error::{FifiError, error},
};

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct Accounts {
    db: FifiDatabases,
    hash_cost: u32,
}

impl Accounts {
    pub fn new(db: FifiDatabases) -> Self {
        Self {
            db,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn with_hash_cost(mut self, hash_cost: u32) -> Self {
        self.hash_cost = hash_cost;
        self
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<String, FifiError> {
        let email = normalize_email(email);
        if !email.contains('@') {
            return Err(FifiError::auth("Please enter a valid email address."));
        }

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(FifiError::auth(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters."
            )));
        }

        if self.get_user_by_email(&email).await?.is_some() {
            return Err(FifiError::auth("An account with this email already exists."));
        }

        let password_hash = match bcrypt::hash(password, self.hash_cost) {
            Ok(hash) => hash,
            Err(err) => return error(FifiError::Auth, "users: hash password", err),
        };

        let user = UserRecord {
            user_id: uuid::Uuid::new_v4().to_string(),
            email: email.clone(),
            password_hash,
            sign_up_date: Utc::now(),
            pregnancy_weeks: None,
            baby_age_months: None,
            reminders: BTreeSet::new(),
        };

        let user_id = user.user_id.clone();
        let created: Result<Option<UserRecord>, _> = self
            .db
            .conn
            .create((USERS_TABLE, user_id.clone()))
            .content(user)
            .await;

        if let Err(err) = created {
            // a sign-up racing this one took the email between lookup and create
            if self.get_user_by_email(&email).await?.is_some() {
                log::warn!("users: create lost to a concurrent sign-up: {}", err);
                return Err(FifiError::auth("An account with this email already exists."));
            }

            return error(FifiError::Persistence, "users: create", err);
        }

        log::info!("user {} signed up", user_id);
        Ok(user_id)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, FifiError> {
        let response = self
            .db
            .conn
            .query(format!("SELECT * FROM {USERS_TABLE} WHERE email = $email LIMIT 1"))
            .bind(("email", normalize_email(email)))
            .await;

        let mut response = match response {
            Ok(response) => response,
            Err(err) => return error(FifiError::Persistence, "users: lookup", err),
        };

        let users: Vec<UserRecord> = match response.take(0) {
            Ok(users) => users,
            Err(err) => return error(FifiError::Persistence, "users: lookup", err),
        };

        Ok(users.into_iter().next())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, FifiError> {
        let Some(user) = self.get_user_by_email(email).await? else {
            return Err(FifiError::auth("Invalid credentials."));
        };

        match bcrypt::verify(password, &user.password_hash) {
            Ok(true) => {
                log::info!("user {} logged in", user.user_id);
                Ok(user.user_id)
            }
            Ok(false) => Err(FifiError::auth("Invalid credentials.")),
            Err(err) => error(FifiError::Auth, "users: verify password", err),
        }
    }

    pub async fn profile(&self, user_id: &str) -> Result<UserProfile, FifiError> {
        Ok(self.get(user_id).await?.profile())
    }

    pub async fn save_info(
        &self,
        user_id: &str,
        pregnancy_weeks: Option<u32>,
        baby_age_months: Option<u32>,
    ) -> Result<UserProfile, FifiError> {
        let mut user = self.get(user_id).await?;
        user.pregnancy_weeks = pregnancy_weeks;
        user.baby_age_months = baby_age_months;

        let profile = user.profile();
        self.put(user).await?;

        Ok(profile)
    }

    pub async fn add_reminder(&self, user_id: &str, reminder: &str) -> Result<UserProfile, FifiError> {
        let reminder = reminder.trim();
        if reminder.is_empty() {
            return Err(FifiError::auth("Reminder cannot be empty."));
        }

        let mut user = self.get(user_id).await?;
        user.reminders.insert(reminder.to_string());

        let profile = user.profile();
        self.put(user).await?;

        Ok(profile)
    }

    async fn get(&self, user_id: &str) -> Result<UserRecord, FifiError> {
        let user: Option<UserRecord> = match self
            .db
            .conn
            .select((USERS_TABLE, user_id.to_string()))
            .await
        {
            Ok(user) => user,
            Err(err) => return error(FifiError::Persistence, "users: get", err),
        };

        user.ok_or_else(|| FifiError::auth(format!("unknown user {user_id}")))
    }

    async fn put(&self, user: UserRecord) -> Result<(), FifiError> {
        let saved: Result<Option<UserRecord>, _> = self
            .db
            .conn
            .upsert((USERS_TABLE, user.user_id.clone()))
            .content(user)
            .await;

        if let Err(err) = saved {
            return error(FifiError::Persistence, "users: save", err);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn accounts() -> Accounts {
        Accounts::new(FifiDatabases::in_memory().await.unwrap()).with_hash_cost(4)
    }

    #[tokio::test]
    async fn test_sign_up_then_login() {
        let accounts = accounts().await;

        let user_id = accounts
            .sign_up("  Mom@Example.com ", "secret-password")
            .await
            .unwrap();

        let logged_in = accounts
            .login("mom@example.com", "secret-password")
            .await
            .unwrap();
        assert_eq!(logged_in, user_id);

        let user = accounts
            .get_user_by_email("MOM@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.email, "mom@example.com");
        assert_ne!(user.password_hash, "secret-password");
    }

    #[tokio::test]
    async fn test_login_verifies_password() {
        let accounts = accounts().await;
        accounts
            .sign_up("mom@example.com", "secret-password")
            .await
            .unwrap();

        let err = accounts
            .login("mom@example.com", "wrong-password")
            .await
            .unwrap_err();
        assert_eq!(err, FifiError::Auth("Invalid credentials.".into()));

        let err = accounts.login("dad@example.com", "secret-password").await;
        assert!(matches!(err, Err(FifiError::Auth(_))));
    }

    #[tokio::test]
    async fn test_sign_up_rejects_duplicates_and_bad_input() {
        let accounts = accounts().await;
        accounts
            .sign_up("mom@example.com", "secret-password")
            .await
            .unwrap();

        assert!(matches!(
            accounts.sign_up("mom@example.com", "another-one").await,
            Err(FifiError::Auth(_))
        ));
        assert!(matches!(
            accounts.sign_up("not-an-email", "secret-password").await,
            Err(FifiError::Auth(_))
        ));
        assert!(matches!(
            accounts.sign_up("new@example.com", "short").await,
            Err(FifiError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_sign_up_keeps_one_account() {
        let accounts = accounts().await;

        let (first, second) = tokio::join!(
            accounts.sign_up("dup@example.com", "secret-1"),
            accounts.sign_up("DUP@example.com", "secret-2"),
        );

        let winner = match (first, second) {
            (Ok(user_id), Err(FifiError::Auth(_))) => (user_id, "secret-1"),
            (Err(FifiError::Auth(_)), Ok(user_id)) => (user_id, "secret-2"),
            other => panic!("expected exactly one sign-up to succeed, got {other:?}"),
        };

        let users: Vec<UserRecord> = accounts.db.conn.select(USERS_TABLE).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(
            accounts.login("dup@example.com", winner.1).await.unwrap(),
            winner.0
        );
    }

    #[tokio::test]
    async fn test_store_rejects_a_second_record_for_one_email() {
        let accounts = accounts().await;
        accounts
            .sign_up("mom@example.com", "secret-password")
            .await
            .unwrap();

        let result = accounts
            .db
            .conn
            .query(format!(
                "CREATE {USERS_TABLE} SET email = 'mom@example.com', password_hash = 'x'"
            ))
            .await
            .unwrap()
            .check();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_profile_updates() {
        let accounts = accounts().await;
        let user_id = accounts
            .sign_up("mom@example.com", "secret-password")
            .await
            .unwrap();

        let profile = accounts.profile(&user_id).await.unwrap();
        assert_eq!(profile.email, "mom@example.com");
        assert!(profile.banners().is_empty());

        accounts.save_info(&user_id, Some(30), None).await.unwrap();
        accounts.add_reminder(&user_id, " doctor visit ").await.unwrap();
        accounts.add_reminder(&user_id, "doctor visit").await.unwrap();

        let profile = accounts.profile(&user_id).await.unwrap();
        assert_eq!(profile.pregnancy_weeks, Some(30));
        assert_eq!(profile.baby_age_months, None);
        assert_eq!(profile.reminders.len(), 1);
        assert!(accounts.add_reminder(&user_id, "   ").await.is_err());

        // the account survives profile writes
        assert_eq!(
            accounts.login("mom@example.com", "secret-password").await.unwrap(),
            user_id
        );
    }
}
