pub(crate) mod anthropic;

use anyhow::Result;
use async_trait::async_trait;

use crate::persona::ConversationSession;

/// A request/response language model. One call, one textual reply.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn send(&self, session: &ConversationSession<'_>, user_text: &str) -> Result<String>;
}
