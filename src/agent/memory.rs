use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered, append-only conversation. The first message is the persona seed.
///
/// Role alternation after the seed is expected but not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn seeded(persona: &str) -> Self {
        Self {
            messages: vec![Message::system(persona)],
        }
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages the user sees, the persona seed excluded.
    pub fn visible(&self) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|msg| msg.role != Role::System)
            .cloned()
            .collect()
    }

    /// Leading system messages plus the last `max_turns` user/assistant pairs,
    /// and the pending user message if there is one.
    pub fn window(&self, max_turns: usize) -> Vec<Message> {
        if max_turns == 0 {
            return self.messages.clone();
        }

        let seed_len = self
            .messages
            .iter()
            .take_while(|msg| msg.role == Role::System)
            .count();
        let (seed, rest) = self.messages.split_at(seed_len);
        let pending = usize::from(rest.last().is_some_and(|msg| msg.role == Role::User));
        let keep = rest.len().min(max_turns * 2 + pending);

        seed.iter()
            .chain(rest[rest.len() - keep..].iter())
            .cloned()
            .collect()
    }
}
