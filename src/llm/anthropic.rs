use anyhow::{Context, Result};
use async_trait::async_trait;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::LanguageModel;
use crate::persona::ConversationSession;

pub const PROVIDER: &str = "anthropic";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(api_key: String, base_url: Option<String>, max_tokens: u32) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned())
                .trim_end_matches('/')
                .to_owned(),
            max_tokens,
        })
    }
}

#[async_trait]
impl LanguageModel for AnthropicClient {
    async fn send(&self, session: &ConversationSession<'_>, user_text: &str) -> Result<String> {
        anyhow::ensure!(
            session.model.provider == PROVIDER,
            "Unsupported model provider `{}`",
            session.model.provider
        );

        let request = AnthropicRequest {
            model: &session.model.model,
            max_tokens: self.max_tokens,
            system: session.instructions,
            messages: vec![Message {
                role: "user",
                content: user_text,
            }],
        };

        tracing::debug!(
            session_id = %session.session_id,
            persona = %session.persona,
            "Sending message to Anthropic"
        );

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?
            .error_for_status()
            .context("Anthropic API error")?;

        let api_response: AnthropicResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic API response")?;

        reply_text(api_response)
    }
}

fn reply_text(response: AnthropicResponse) -> Result<String> {
    anyhow::ensure!(
        !response.content.is_empty(),
        "No content in Anthropic response"
    );

    Ok(response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .map(|block| block.text)
        .join(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::{ModelIdentity, Persona, PersonaTable, build_session};
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode, Uri};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    #[test]
    fn joins_text_blocks_and_skips_others() {
        let response: AnthropicResponse = serde_json::from_value(serde_json::json!({
            "content": [
                {"type": "text", "text": "Part one. "},
                {"type": "tool_use", "id": "x", "name": "lookup", "input": {}},
                {"type": "text", "text": "Part two."}
            ]
        }))
        .unwrap();

        assert_eq!(reply_text(response).unwrap(), "Part one. Part two.");
    }

    #[test]
    fn empty_content_is_an_error() {
        let response = AnthropicResponse { content: vec![] };
        assert!(reply_text(response).is_err());
    }

    async fn fake_messages_api(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured = Captured::default();
        let app = Router::new()
            .route(
                "/v1/messages",
                post(
                    move |State(captured): State<Captured>,
                          uri: Uri,
                          headers: HeaderMap,
                          Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            captured.0.lock().unwrap().push(CapturedRequest {
                                path: uri.path().to_owned(),
                                headers,
                                body,
                            });
                            (status, Json(reply))
                        }
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        (format!("http://{addr}/"), captured)
    }

    struct CapturedRequest {
        path: String,
        headers: HeaderMap,
        body: Value,
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<CapturedRequest>>>);

    fn anthropic_model() -> ModelIdentity {
        ModelIdentity {
            provider: PROVIDER.to_owned(),
            model: "claude-sonnet-4-20250514".to_owned(),
        }
    }

    #[tokio::test]
    async fn posts_persona_instructions_to_messages_endpoint() {
        let (base_url, captured) = fake_messages_api(
            StatusCode::OK,
            json!({ "content": [{ "type": "text", "text": "Primaries are in March." }] }),
        )
        .await;
        let table = PersonaTable::standard();
        let model = anthropic_model();
        let session = build_session(&table, &model, "calendar-1".to_owned(), Persona::Calendar);
        let client = AnthropicClient::new("test-key".to_owned(), Some(base_url), 1024).unwrap();

        let reply = client.send(&session, "What is next?").await.unwrap();
        assert_eq!(reply, "Primaries are in March.");

        let requests = captured.0.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.path, "/v1/messages");
        assert_eq!(request.headers["x-api-key"].to_str().unwrap(), "test-key");
        assert_eq!(request.headers["anthropic-version"].to_str().unwrap(), API_VERSION);
        assert_eq!(request.body["model"], "claude-sonnet-4-20250514");
        assert_eq!(request.body["max_tokens"], 1024);
        assert_eq!(request.body["system"], table.instructions(Persona::Calendar));
        assert_eq!(
            request.body["messages"],
            json!([{ "role": "user", "content": "What is next?" }])
        );
    }

    #[tokio::test]
    async fn error_status_is_a_failure() {
        let (base_url, captured) = fake_messages_api(
            StatusCode::UNAUTHORIZED,
            json!({ "type": "error", "error": { "type": "authentication_error", "message": "invalid x-api-key" } }),
        )
        .await;
        let table = PersonaTable::standard();
        let model = anthropic_model();
        let session = build_session(&table, &model, "chat-1".to_owned(), Persona::Analyst);
        let client = AnthropicClient::new("wrong-key".to_owned(), Some(base_url), 16).unwrap();

        let error = client.send(&session, "hello").await.unwrap_err();
        assert!(format!("{error:#}").contains("401"));
        assert_eq!(captured.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejects_foreign_providers_before_any_request() {
        let table = PersonaTable::standard();
        let model = ModelIdentity {
            provider: "openai".to_owned(),
            model: "gpt-4o".to_owned(),
        };
        let session = build_session(&table, &model, "s-2".to_owned(), Persona::Analyst);
        let client = AnthropicClient::new("key".to_owned(), Some("http://127.0.0.1:9".to_owned()), 16).unwrap();

        let error = client.send(&session, "hello").await.unwrap_err();
        assert!(error.to_string().contains("Unsupported model provider"));
    }
}
