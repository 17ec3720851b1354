use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{sync::Mutex, time::Instant};

use crate::{
    agent::{Completion, FifiAgents, session::ChatSession},
    database::users::Accounts,
};

pub type SharedSession = Arc<Mutex<ChatSession>>;

const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

struct SessionEntry {
    session: SharedSession,
    last_seen: Instant,
}

/// Each session sits behind its own lock, so one turn finishes before the
/// next message of that session is taken. Sessions untouched for longer than
/// `session_ttl` are dropped whenever a new one is opened.
pub struct HTTPState<C: Completion> {
    pub agents: FifiAgents<C>,
    pub accounts: Accounts,
    sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
    session_ttl: Duration,
}

impl<C: Completion> Clone for HTTPState<C> {
    fn clone(&self) -> Self {
        Self {
            agents: self.agents.clone(),
            accounts: self.accounts.clone(),
            sessions: self.sessions.clone(),
            session_ttl: self.session_ttl,
        }
    }
}

impl<C: Completion> HTTPState<C> {
    pub fn new(agents: FifiAgents<C>, accounts: Accounts) -> Self {
        Self {
            agents,
            accounts,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    pub fn with_session_ttl(mut self, session_ttl: Duration) -> Self {
        self.session_ttl = session_ttl;
        self
    }

    pub async fn insert(&self, session: ChatSession) -> SharedSession {
        let id = session.id.clone();
        let session = Arc::new(Mutex::new(session));

        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() <= self.session_ttl);
        if sessions.len() < before {
            log::debug!("expired {} idle sessions", before - sessions.len());
        }

        sessions.insert(
            id,
            SessionEntry {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );

        session
    }

    /// Looks a session up and marks it as active.
    pub async fn get(&self, session_id: &str) -> Option<SharedSession> {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.get_mut(session_id)?;
        entry.last_seen = Instant::now();

        Some(entry.session.clone())
    }

    pub async fn remove(&self, session_id: &str) -> Option<SharedSession> {
        self.sessions
            .lock()
            .await
            .remove(session_id)
            .map(|entry| entry.session)
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        agent::testing::ScriptedCompletion,
        config::FifiConfig,
        database::{FifiDatabases, chats::ChatArchive},
    };

    async fn state(session_ttl: Duration) -> HTTPState<ScriptedCompletion> {
        let db = FifiDatabases::in_memory().await.unwrap();
        let agents = FifiAgents::new(
            ScriptedCompletion::default(),
            ChatArchive::new(db.clone()),
            &FifiConfig::default(),
        );

        HTTPState::new(agents, Accounts::new(db)).with_session_ttl(session_ttl)
    }

    #[tokio::test]
    async fn test_idle_sessions_expire_on_insert() {
        let state = state(Duration::from_millis(300)).await;

        let idle = state.agents.open_session(None).await;
        let idle_id = idle.id.clone();
        state.insert(idle).await;

        let active = state.agents.open_session(None).await;
        let active_id = active.id.clone();
        state.insert(active).await;

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(state.get(&active_id).await.is_some());
        tokio::time::sleep(Duration::from_millis(200)).await;

        state.insert(state.agents.open_session(None).await).await;

        assert!(state.get(&idle_id).await.is_none());
        assert!(state.get(&active_id).await.is_some());
        assert_eq!(state.len().await, 2);
    }
}
