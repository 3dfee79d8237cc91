//! Fakes for the dispatcher's collaborators.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::llm::LanguageModel;
use crate::persona::{ConversationSession, ModelIdentity, Persona};
use crate::store::{Collection, DocumentStore, Query};

/// What a [`ScriptedModel`] was asked.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub session_id: String,
    pub persona: Persona,
    pub instructions: String,
    pub user_text: String,
}

/// Answers with canned replies in order; repeats the last one when exhausted.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    last: Mutex<Option<Result<String, String>>>,
    sent: Mutex<Vec<SentMessage>>,
}

impl ScriptedModel {
    pub fn replying(reply: &str) -> Self {
        Self::script(vec![Ok(reply.to_owned())])
    }

    pub fn failing(message: &str) -> Self {
        Self::script(vec![Err(message.to_owned())])
    }

    pub fn script(replies: Vec<Result<String, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn send(&self, session: &ConversationSession<'_>, user_text: &str) -> Result<String> {
        self.sent.lock().unwrap().push(SentMessage {
            session_id: session.session_id.clone(),
            persona: session.persona,
            instructions: session.instructions.to_owned(),
            user_text: user_text.to_owned(),
        });

        let next = self.replies.lock().unwrap().pop_front();
        let reply = match next {
            Some(reply) => {
                *self.last.lock().unwrap() = Some(reply.clone());
                reply
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err("no scripted reply".to_owned())),
        };
        reply.map_err(anyhow::Error::msg)
    }
}

/// A store whose every operation fails.
pub struct BrokenStore;

#[async_trait]
impl DocumentStore for BrokenStore {
    async fn insert(&self, _collection: Collection, _document: Value) -> Result<()> {
        anyhow::bail!("store is read-only")
    }

    async fn find(&self, _collection: Collection, _query: &Query) -> Result<Vec<Value>> {
        anyhow::bail!("store is unreachable")
    }
}

pub fn model_identity() -> ModelIdentity {
    ModelIdentity {
        provider: "anthropic".to_owned(),
        model: "claude-sonnet-4-20250514".to_owned(),
    }
}
