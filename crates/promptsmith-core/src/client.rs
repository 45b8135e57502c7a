use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PromptsmithError, Result};

#[derive(Serialize)]
struct NewChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewChatResponse {
    pub session_id: String,
    /// Greeting from the service
    pub prompt: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    #[serde(rename = "useCase")]
    use_case: &'a str,
    session_id: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerateResponse {
    pub prompt: String,
    #[serde(default)]
    pub is_final_prompt: bool,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

/// The remote side of a prompt conversation.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Start a conversation, optionally restarting `previous`.
    async fn new_chat(&self, previous: Option<&str>) -> Result<NewChatResponse>;

    async fn generate(&self, use_case: &str, session_id: &str) -> Result<GenerateResponse>;
}

/// JSON-over-HTTP client for the generation service.
#[derive(Clone)]
pub struct GenerationClient {
    client: Client,
    base_url: String,
}

impl GenerationClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "POST");

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&text)
                .map(|e| e.detail)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
                });
            warn!(status = status.as_u16(), %detail, "Generation service returned an error");
            return Err(PromptsmithError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        serde_json::from_str(&text).map_err(|e| PromptsmithError::Decode(e.to_string()))
    }
}

#[async_trait]
impl GenerationBackend for GenerationClient {
    async fn new_chat(&self, previous: Option<&str>) -> Result<NewChatResponse> {
        self.post("new_chat", &NewChatRequest { session_id: previous }).await
    }

    async fn generate(&self, use_case: &str, session_id: &str) -> Result<GenerateResponse> {
        self.post("generate", &GenerateRequest { use_case, session_id }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> GenerationClient {
        GenerationClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_trailing_slash_is_trimmed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/new_chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "session_id": "s1",
                "prompt": "hello"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            GenerationClient::new(&format!("{}/", server.uri()), Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), server.uri());
        client.new_chat(None).await.unwrap();
    }

    #[tokio::test]
    async fn test_new_chat_sends_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/new_chat"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "session_id": "abc",
                "prompt": "Hello! Level 1 Business Context"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client_for(&server).await.new_chat(None).await.unwrap();
        assert_eq!(resp.session_id, "abc");
        assert_eq!(resp.prompt, "Hello! Level 1 Business Context");
    }

    #[tokio::test]
    async fn test_new_chat_restart_sends_previous_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/new_chat"))
            .and(body_json(json!({ "session_id": "old" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "session_id": "new",
                "prompt": "hi"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client_for(&server).await.new_chat(Some("old")).await.unwrap();
        assert_eq!(resp.session_id, "new");
    }

    #[tokio::test]
    async fn test_generate_round_trips_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(body_json(json!({ "useCase": "a bakery", "session_id": "s1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "prompt": "What is your business called?"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client_for(&server).await.generate("a bakery", "s1").await.unwrap();
        assert_eq!(resp.prompt, "What is your business called?");
        assert!(!resp.is_final_prompt);
    }

    #[tokio::test]
    async fn test_generate_final_flag() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "prompt": "FINAL",
                "is_final_prompt": true
            })))
            .mount(&server)
            .await;

        let resp = client_for(&server).await.generate("x", "s").await.unwrap();
        assert!(resp.is_final_prompt);
    }

    #[tokio::test]
    async fn test_error_detail_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "detail": "Session not found" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).await.generate("x", "gone").await.unwrap_err();
        match err {
            PromptsmithError::Server { status, detail } => {
                assert_eq!(status, 404);
                assert_eq!(detail, "Session not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_without_detail_uses_status_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.generate("x", "s").await.unwrap_err();
        assert!(matches!(
            err,
            PromptsmithError::Server { status: 500, ref detail } if detail == "Internal Server Error"
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/new_chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.new_chat(None).await.unwrap_err();
        assert!(matches!(err, PromptsmithError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        // port 9 (discard) is not listening on test machines
        let client = GenerationClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client.generate("x", "s").await.unwrap_err();
        assert!(err.is_transport());
    }
}
