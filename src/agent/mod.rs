use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use rig::client::{CompletionClient, Nothing};
use rig::completion::Chat;
use rig::providers::{ollama, openrouter};
use serde_json::json;

use crate::agent::memory::{Conversation, Message, Role};
use crate::agent::session::ChatSession;
use crate::augment::Augmenter;
use crate::config::{CompletionConfig, FifiConfig, ModelConfig};
use crate::constant::{API_KEY_ENV, ERROR_REPLY_PREFIX};
use crate::database::chats::ChatArchive;
use crate::error::FifiError;
use crate::utils::remove_think_tags;

pub mod memory;
pub mod session;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// The hosted completion endpoint, seen from the pipeline.
pub trait Completion: Send + Sync {
    fn complete(&self, messages: &[Message]) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Clone)]
enum ProviderClient {
    Ollama(ollama::Client),
    OpenRouter(openrouter::Client),
}

#[derive(Clone)]
pub struct FifiAgent {
    client: ProviderClient,
    model: String,
    params: CompletionConfig,
}

impl FifiAgent {
    pub fn new(config: &ModelConfig, params: CompletionConfig) -> Result<Self> {
        let client = match &*config.provider {
            "openrouter" => {
                if config.api_key.is_empty() {
                    bail!(FifiError::Config(format!(
                        "openrouter needs an api key, set model.api_key or {API_KEY_ENV}"
                    )));
                }

                ProviderClient::OpenRouter(openrouter::Client::new(config.api_key.clone())?)
            }
            "ollama" => {
                let base_url = if config.base_url.is_empty() {
                    DEFAULT_OLLAMA_URL.to_string()
                } else {
                    config.base_url.clone()
                };

                let client: ollama::Client = ollama::Client::builder()
                    .base_url(base_url)
                    .api_key(Nothing)
                    .build()?;

                ProviderClient::Ollama(client)
            }
            other => bail!(FifiError::Config(format!("unknown model provider {other}"))),
        };

        log::info!("completion provider {} with model {}", config.provider, config.name);
        Ok(Self {
            client,
            model: config.name.clone(),
            params,
        })
    }

    fn additional_params(&self) -> Option<serde_json::Value> {
        let mut params = serde_json::Map::new();
        if let Some(presence_penalty) = self.params.presence_penalty {
            params.insert("presence_penalty".into(), json!(presence_penalty));
        }
        if let Some(frequency_penalty) = self.params.frequency_penalty {
            params.insert("frequency_penalty".into(), json!(frequency_penalty));
        }

        if params.is_empty() {
            None
        } else {
            Some(serde_json::Value::Object(params))
        }
    }

    async fn chat_once(&self, request: &ChatRequest) -> Result<String> {
        let prompt = request.prompt.clone();
        let history = request.history.clone();

        let response = match &self.client {
            ProviderClient::Ollama(client) => {
                let mut builder = client
                    .agent(self.model.clone())
                    .preamble(&request.preamble)
                    .temperature(self.params.temperature)
                    .max_tokens(self.params.max_tokens);
                if let Some(params) = self.additional_params() {
                    builder = builder.additional_params(params);
                }

                builder.build().chat(prompt, history).await
            }
            ProviderClient::OpenRouter(client) => {
                let mut builder = client
                    .agent(self.model.clone())
                    .preamble(&request.preamble)
                    .temperature(self.params.temperature)
                    .max_tokens(self.params.max_tokens);
                if let Some(params) = self.additional_params() {
                    builder = builder.additional_params(params);
                }

                builder.build().chat(prompt, history).await
            }
        }?;

        Ok(remove_think_tags(&response))
    }
}

impl Completion for FifiAgent {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let request = ChatRequest::from_messages(messages)?;
        let policy = RetryPolicy::from(&self.params);

        with_retry(&policy, || self.chat_once(&request)).await
    }
}

/// A conversation split the way rig agents take it.
#[derive(Debug, Clone)]
struct ChatRequest {
    preamble: String,
    history: Vec<rig::message::Message>,
    prompt: String,
}

impl ChatRequest {
    fn from_messages(messages: &[Message]) -> Result<Self> {
        let preamble = messages
            .iter()
            .filter(|msg| msg.role == Role::System)
            .map(|msg| msg.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let turns = messages
            .iter()
            .filter(|msg| msg.role != Role::System)
            .collect::<Vec<_>>();

        let Some((last, earlier)) = turns.split_last() else {
            bail!("conversation has no user message");
        };
        if last.role != Role::User {
            bail!("conversation does not end with a user message");
        }

        let history = earlier
            .iter()
            .map(|msg| match msg.role {
                Role::Assistant => rig::message::Message::assistant(msg.content.clone()),
                _ => rig::message::Message::user(msg.content.clone()),
            })
            .collect();

        Ok(Self {
            preamble,
            history,
            prompt: last.content.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff: Duration,
}

impl From<&CompletionConfig> for RetryPolicy {
    fn from(config: &CompletionConfig) -> Self {
        Self {
            timeout: config.timeout(),
            max_retries: config.max_retries,
            backoff: config.retry_backoff(),
        }
    }
}

/// Runs `call` with a per-attempt timeout, retrying with exponential backoff.
pub async fn with_retry<F, Fut>(policy: &RetryPolicy, mut call: F) -> Result<String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let mut attempt = 0;
    loop {
        let err = match tokio::time::timeout(policy.timeout, call()).await {
            Ok(Ok(text)) => return Ok(text),
            Ok(Err(err)) => err,
            Err(_) => anyhow!(FifiError::Completion(format!(
                "no response within {:?}",
                policy.timeout
            ))),
        };

        if attempt >= policy.max_retries {
            return Err(err);
        }

        let delay = policy.backoff * 2u32.saturating_pow(attempt);
        log::warn!(
            "completion attempt {} failed: {:#}, retrying in {:?}",
            attempt + 1,
            err,
            delay
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// The conversation pipeline: session store, completion, augmentation, and
/// persistence for authenticated users.
pub struct FifiAgents<C: Completion> {
    completion: Arc<C>,
    archive: ChatArchive,
    augmenter: Augmenter,
    persona: String,
    persona_version: String,
    history_window: usize,
}

impl<C: Completion> Clone for FifiAgents<C> {
    fn clone(&self) -> Self {
        Self {
            completion: self.completion.clone(),
            archive: self.archive.clone(),
            augmenter: self.augmenter.clone(),
            persona: self.persona.clone(),
            persona_version: self.persona_version.clone(),
            history_window: self.history_window,
        }
    }
}

impl<C: Completion> FifiAgents<C> {
    pub fn new(completion: C, archive: ChatArchive, config: &FifiConfig) -> Self {
        Self {
            completion: Arc::new(completion),
            archive,
            augmenter: Augmenter::new(config.augment.max_articles),
            persona: config.persona.system_prompt.clone(),
            persona_version: config.persona.version.clone(),
            history_window: config.completion.history_window,
        }
    }

    pub fn seeded(&self) -> Conversation {
        Conversation::seeded(&self.persona)
    }

    pub fn persona_version(&self) -> &str {
        &self.persona_version
    }

    /// Loads the stored conversation of `user_id`, `Ok(None)` when there is none.
    async fn stored(&self, user_id: &str) -> Result<Option<Conversation>, FifiError> {
        let history = self.archive.load(user_id).await?;

        Ok(history
            .filter(|history| !history.is_empty())
            .map(Conversation::from_messages))
    }

    pub async fn open_session(&self, user_id: Option<String>) -> ChatSession {
        let session_id = uuid::Uuid::new_v4().to_string();
        log::debug!(
            "session {} opened with persona {}",
            session_id,
            self.persona_version
        );

        let Some(user_id) = user_id else {
            return ChatSession::new(session_id, None, self.seeded());
        };

        match self.stored(&user_id).await {
            Ok(stored) => {
                let conversation = stored.unwrap_or_else(|| self.seeded());
                ChatSession::new(session_id, Some(user_id), conversation)
            }
            Err(err) => {
                // a failed load must not be followed by a save over the stored history
                log::error!("loading history of {}: {}", user_id, err);
                let mut session = ChatSession::new(session_id, Some(user_id), self.seeded());
                session.disable_persistence();
                session
            }
        }
    }

    /// Binds a signed-in user to the session. A stored conversation replaces the
    /// in-memory one; otherwise the current one is kept and saved on the next turn.
    /// A session signed in as someone else starts over from the seed first.
    pub async fn attach_user(&self, session: &mut ChatSession, user_id: String) {
        if session.user_id().is_some_and(|current| current != user_id) {
            log::info!("session {}: switching user, conversation reset", session.id);
            self.detach_user(session);
        }

        match self.stored(&user_id).await {
            Ok(stored) => session.attach(user_id, stored),
            Err(err) => {
                log::error!("loading history of {}: {}", user_id, err);
                session.attach(user_id, None);
                session.disable_persistence();
            }
        }
    }

    pub fn detach_user(&self, session: &mut ChatSession) {
        session.detach(self.seeded());
    }

    pub async fn handle_turn(&self, session: &mut ChatSession, user_text: &str) -> String {
        session.append(Message::user(user_text));

        let messages = session.conversation().window(self.history_window);
        log::debug!(
            "session {}: sending {} of {} messages",
            session.id,
            messages.len(),
            session.conversation().len()
        );

        let reply = match self.completion.complete(&messages).await {
            Ok(reply) => self.augmenter.augment(&reply, user_text),
            Err(err) => {
                log::error!("session {}: completion failed: {:#}", session.id, err);
                format!("{} {:#}", ERROR_REPLY_PREFIX, err)
            }
        };

        session.append(Message::assistant(reply.clone()));

        if let Some(user_id) = session.persist_target().map(str::to_string) {
            if let Err(err) = self.archive.save(&user_id, session.history()).await {
                log::error!("session {}: {}", session.id, err);
                session.disable_persistence();
            }
        }

        log::info!(
            "session {}: turn complete, {} messages",
            session.id,
            session.conversation().len()
        );
        reply
    }
}
