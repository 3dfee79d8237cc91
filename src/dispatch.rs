use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::DispatchError;
use crate::llm::LanguageModel;
use crate::parsing::{sources, verdict};
use crate::persona::{
    ConversationSession, ModelIdentity, Persona, PersonaTable, build_session, fresh_session_id,
};
use crate::protocol::{
    CalendarResponse, ChatHistoryResponse, ChatRequest, ChatResponse, FactCheckRequest,
    FactCheckResponse, HealthResponse, LeaderUpdatesResponse, PostAnalysisRequest,
    PostAnalysisResponse, RecentFactChecksResponse,
};
use crate::records::{Exchange, VerdictRecord, utc_timestamp};
use crate::store::{Collection, DocumentStore, Query};

pub const HISTORY_LIMIT: usize = 100;
pub const DEFAULT_RECENT_LIMIT: usize = 10;

const CALENDAR_QUESTION: &str = "What are the key upcoming political events, elections, and important dates for US politics in 2026? Include federal, state, and local events where significant.";

/// Routes each capability to its persona, the model and the store.
pub struct Dispatcher {
    personas: Arc<PersonaTable>,
    model: ModelIdentity,
    llm: Arc<dyn LanguageModel>,
    store: Arc<dyn DocumentStore>,
    service_name: String,
}

impl Dispatcher {
    pub fn new(
        personas: Arc<PersonaTable>,
        model: ModelIdentity,
        llm: Arc<dyn LanguageModel>,
        store: Arc<dyn DocumentStore>,
        service_name: String,
    ) -> Self {
        Self {
            personas,
            model,
            llm,
            store,
            service_name,
        }
    }

    /// Multi-turn analyst chat; the session id comes from the caller.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, DispatchError> {
        info!(session_id = %request.session_id, "Chat message received");
        let session = self.session(request.session_id.clone(), Persona::Analyst);

        let reply = self.ask(&session, &request.message).await?;
        let timestamp = utc_timestamp();
        let sources = sources::extract(&reply);

        let exchange = Exchange {
            session_id: request.session_id,
            user_message: request.message,
            assistant_response: reply.clone(),
            sources: sources.clone(),
            timestamp: timestamp.clone(),
        };
        self.persist(Collection::Chats, &exchange).await?;

        Ok(ChatResponse {
            role: "assistant".to_owned(),
            content: reply,
            sources,
            timestamp,
        })
    }

    pub async fn fact_check(
        &self,
        request: FactCheckRequest,
    ) -> Result<FactCheckResponse, DispatchError> {
        let session = self.session(fresh_session_id(Persona::FactChecker), Persona::FactChecker);
        info!(session_id = %session.session_id, source_type = %request.source_type, "Fact-checking claim");

        let prompt = format!(
            "Fact-check this {} claim:\n\n\"{}\"\n\nRespond with a JSON object containing verdict, explanation, sources, and confidence.",
            request.source_type, request.claim
        );
        let reply = self.ask(&session, &prompt).await?;
        let assessment = verdict::parse(&reply);

        let record = VerdictRecord {
            claim: request.claim,
            source_type: request.source_type,
            verdict: assessment.verdict,
            explanation: assessment.explanation,
            sources: assessment.sources,
            confidence: assessment.confidence,
            timestamp: utc_timestamp(),
        };
        self.persist(Collection::FactChecks, &record).await?;

        Ok(record.into())
    }

    pub async fn analyze_post(
        &self,
        request: PostAnalysisRequest,
    ) -> Result<PostAnalysisResponse, DispatchError> {
        let session = self.session(fresh_session_id(Persona::PostAnalyzer), Persona::PostAnalyzer);
        info!(session_id = %session.session_id, "Analyzing post");

        let prompt = format!(
            "Analyze this X post:\n\nAuthor: {}\nContent: \"{}\"\n\nProvide:\n1. Summary of claims made\n2. Factual accuracy assessment\n3. Political context\n4. Any missing context or potential bias",
            request.author.as_deref().unwrap_or("Unknown"),
            request.post_content
        );
        let analysis = self.ask(&session, &prompt).await?;

        Ok(PostAnalysisResponse {
            analysis,
            post_content: request.post_content,
            author: request.author,
            timestamp: utc_timestamp(),
        })
    }

    pub async fn leader_updates(
        &self,
        party: Option<String>,
    ) -> Result<LeaderUpdatesResponse, DispatchError> {
        let session = self.session(fresh_session_id(Persona::LeaderUpdates), Persona::LeaderUpdates);
        info!(session_id = %session.session_id, party = ?party, "Fetching leader updates");

        let prompt = match &party {
            Some(party) => format!(
                "Provide recent updates on key {party} political leaders in the US. Include their recent statements, positions, and activities."
            ),
            None => "Provide recent updates on key political leaders from both major US parties. Include recent statements, positions, and activities from leaders like the President, congressional leadership, and prominent figures.".to_owned(),
        };
        let updates = self.ask(&session, &prompt).await?;

        Ok(LeaderUpdatesResponse {
            updates,
            party_filter: party,
            timestamp: utc_timestamp(),
        })
    }

    pub async fn political_calendar(&self) -> Result<CalendarResponse, DispatchError> {
        let session = self.session(fresh_session_id(Persona::Calendar), Persona::Calendar);
        info!(session_id = %session.session_id, "Fetching political calendar");

        let calendar = self.ask(&session, CALENDAR_QUESTION).await?;

        Ok(CalendarResponse {
            calendar,
            timestamp: utc_timestamp(),
        })
    }

    pub async fn recent_fact_checks(
        &self,
        limit: usize,
    ) -> Result<RecentFactChecksResponse, DispatchError> {
        let fact_checks = self
            .load(Collection::FactChecks, &Query::all().newest_first().limit(limit))
            .await?;
        Ok(RecentFactChecksResponse { fact_checks })
    }

    pub async fn chat_history(
        &self,
        session_id: &str,
    ) -> Result<ChatHistoryResponse, DispatchError> {
        let history = self
            .load(
                Collection::Chats,
                &Query::field_eq("session_id", session_id).limit(HISTORY_LIMIT),
            )
            .await?;
        Ok(ChatHistoryResponse { history })
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "healthy".to_owned(),
            service: self.service_name.clone(),
            timestamp: utc_timestamp(),
        }
    }

    fn session(&self, session_id: String, persona: Persona) -> ConversationSession<'_> {
        build_session(&self.personas, &self.model, session_id, persona)
    }

    async fn ask(
        &self,
        session: &ConversationSession<'_>,
        user_text: &str,
    ) -> Result<String, DispatchError> {
        let reply = self
            .llm
            .send(session, user_text)
            .await
            .map_err(DispatchError::Model)?;
        debug!(session_id = %session.session_id, reply_len = reply.len(), "Model replied");
        Ok(reply)
    }

    async fn persist<T: Serialize>(
        &self,
        collection: Collection,
        record: &T,
    ) -> Result<(), DispatchError> {
        let document = serde_json::to_value(record)
            .map_err(|error| DispatchError::Persistence(error.into()))?;
        self.store
            .insert(collection, document)
            .await
            .map_err(DispatchError::Persistence)
    }

    async fn load<T: DeserializeOwned>(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<T>, DispatchError> {
        self.store
            .find(collection, query)
            .await
            .map_err(DispatchError::Persistence)?
            .into_iter()
            .map(|document| {
                serde_json::from_value(document)
                    .map_err(|error| DispatchError::Persistence(error.into()))
            })
            .collect()
    }
}
