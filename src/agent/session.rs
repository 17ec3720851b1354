use crate::agent::memory::{Conversation, Message};

/// One user interaction: the in-memory conversation plus who it belongs to.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: String,
    user_id: Option<String>,
    conversation: Conversation,
    persistence_enabled: bool,
}

impl ChatSession {
    pub fn new(id: String, user_id: Option<String>, conversation: Conversation) -> Self {
        Self {
            id,
            user_id,
            conversation,
            persistence_enabled: true,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn history(&self) -> &[Message] {
        self.conversation.all()
    }

    pub fn append(&mut self, message: Message) {
        self.conversation.append(message);
    }

    /// user id to save under, if the session is authenticated and the store
    /// has not failed for it yet
    pub fn persist_target(&self) -> Option<&str> {
        if self.persistence_enabled {
            self.user_id()
        } else {
            None
        }
    }

    pub fn disable_persistence(&mut self) {
        log::warn!("session {} continues in memory only", self.id);
        self.persistence_enabled = false;
    }

    pub fn is_persistent(&self) -> bool {
        self.persist_target().is_some()
    }

    pub fn attach(&mut self, user_id: String, stored: Option<Conversation>) {
        if let Some(stored) = stored {
            self.conversation = stored;
        }

        self.user_id = Some(user_id);
        self.persistence_enabled = true;
    }

    pub fn detach(&mut self, conversation: Conversation) {
        self.user_id = None;
        self.conversation = conversation;
    }
}
