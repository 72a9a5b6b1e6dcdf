use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE } };
use serde::{ Deserialize, Serialize };
use serde_json::Value;

use super::{ GenerationClient, GenerationError, GenerationRequest };
use crate::cli::Args;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    system_instruction: SystemInstruction<'a>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a Value,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<SystemPart<'a>>,
}

#[derive(Serialize)]
struct SystemPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

impl<'a> From<&'a GenerationRequest> for GenerateContentRequest<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        let contents = request.contents
            .iter()
            .map(|msg| GeminiContent {
                role: msg.role.as_str(),
                parts: vec![GeminiPart { text: &msg.content }],
            })
            .collect();

        Self {
            contents,
            system_instruction: SystemInstruction {
                parts: vec![SystemPart { text: &request.system_instruction }],
            },
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        }
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
}

#[derive(Deserialize)]
struct GoogleCandidate {
    #[serde(default)]
    content: Option<GoogleContent>,
}

#[derive(Deserialize)]
struct GoogleContent {
    #[serde(default)]
    parts: Vec<GooglePart>,
}

#[derive(Deserialize)]
struct GooglePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleError,
}

#[derive(Deserialize)]
struct GoogleError {
    message: String,
}

impl GenerateContentResponse {
    /// Joins the text parts of the first candidate, skipping thought summaries.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let texts: Vec<String> = content.parts
            .into_iter()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text)
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }
}

fn error_message(body: String) -> String {
    serde_json
        ::from_str::<GoogleErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body)
}

pub struct GeminiChatClient {
    http: HttpClient,
    base_url: String,
}

impl GeminiChatClient {
    pub fn new(api_key: String, base_url: Option<String>) -> Result<Self, GenerationError> {
        if api_key.trim().is_empty() {
            return Err(GenerationError::Config("Gemini API key is required".to_string()));
        }
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut key = HeaderValue::from_str(api_key.trim())
            .map_err(|e| GenerationError::Config(format!("Invalid API key format: {}", e)))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(API_KEY_HEADER, key);

        let http = HttpClient::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_args(args: &Args) -> Result<Self, GenerationError> {
        Self::new(args.gemini_api_key.clone(), Some(args.gemini_base_url.clone()))
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerationClient for GeminiChatClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let url = self.endpoint(&request.model);
        debug!(
            "GeminiChatClient::generate() → model={} messages={} url={}",
            request.model,
            request.contents.len(),
            url
        );

        let payload = GenerateContentRequest::from(request);
        let resp = self.http.post(&url).json(&payload).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: error_message(body),
            });
        }

        let parsed: GenerateContentResponse = resp.json().await?;
        parsed.into_text().ok_or(GenerationError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::{ ConversationMessage, Role };
    use axum::{ extract::State, http::{ HeaderMap as AxumHeaders, StatusCode, Uri }, Json, Router };
    use serde_json::json;
    use std::sync::{ Arc, Mutex };

    #[derive(Clone, Debug)]
    struct Captured {
        path: String,
        api_key: Option<String>,
        body: Value,
    }

    #[derive(Clone)]
    struct FakeGemini {
        captured: Arc<Mutex<Vec<Captured>>>,
        status: StatusCode,
        reply: Value,
    }

    async fn fake_handler(
        State(fake): State<FakeGemini>,
        uri: Uri,
        headers: AxumHeaders,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        fake.captured.lock().unwrap().push(Captured {
            path: uri.path().to_string(),
            api_key: headers
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
            body,
        });
        (fake.status, Json(fake.reply.clone()))
    }

    async fn spawn_fake(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Captured>>>) {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let fake = FakeGemini { captured: captured.clone(), status, reply };
        let app = Router::new().fallback(fake_handler).with_state(fake);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/v1beta/", addr), captured)
    }

    fn sample_request() -> GenerationRequest {
        GenerationRequest {
            contents: vec![
                ConversationMessage { role: Role::User, content: json!("What is your experience?") },
                ConversationMessage { role: Role::Model, content: json!("Plenty.") },
                ConversationMessage { role: Role::User, content: json!("Tell me more") },
            ],
            system_instruction: "Be brief.".to_string(),
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.7,
        }
    }

    #[tokio::test]
    async fn sends_contents_instruction_and_temperature() {
        let reply = json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": "I have 6+ years..." }] } }]
        });
        let (base_url, captured) = spawn_fake(StatusCode::OK, reply).await;
        let client = GeminiChatClient::new("secret-key".into(), Some(base_url)).unwrap();

        let text = client.generate(&sample_request()).await.unwrap();
        assert_eq!(text, "I have 6+ years...");

        let captured = captured.lock().unwrap();
        assert_eq!(captured.len(), 1);
        let call = &captured[0];
        assert_eq!(call.path, "/v1beta/models/gemini-2.5-flash:generateContent");
        assert_eq!(call.api_key.as_deref(), Some("secret-key"));
        assert_eq!(
            call.body["contents"],
            json!([
                { "role": "user", "parts": [{ "text": "What is your experience?" }] },
                { "role": "model", "parts": [{ "text": "Plenty." }] },
                { "role": "user", "parts": [{ "text": "Tell me more" }] }
            ])
        );
        assert_eq!(call.body["systemInstruction"], json!({ "parts": [{ "text": "Be brief." }] }));
        let temperature = call.body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[tokio::test]
    async fn joins_text_parts_and_skips_thoughts() {
        let reply = json!({
            "candidates": [
                { "content": { "parts": [
                    { "text": "thinking...", "thought": true },
                    { "text": "Hello, " },
                    { "text": "world" }
                ] } },
                { "content": { "parts": [{ "text": "second candidate" }] } }
            ]
        });
        let (base_url, _) = spawn_fake(StatusCode::OK, reply).await;
        let client = GeminiChatClient::new("k".into(), Some(base_url)).unwrap();

        assert_eq!(client.generate(&sample_request()).await.unwrap(), "Hello, world");
    }

    #[tokio::test]
    async fn provider_error_message_is_extracted() {
        let reply = json!({
            "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
        });
        let (base_url, _) = spawn_fake(StatusCode::BAD_REQUEST, reply).await;
        let client = GeminiChatClient::new("bad".into(), Some(base_url)).unwrap();

        match client.generate(&sample_request()).await {
            Err(GenerationError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid.");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_candidates_is_empty_response() {
        let reply = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let (base_url, _) = spawn_fake(StatusCode::OK, reply).await;
        let client = GeminiChatClient::new("k".into(), Some(base_url)).unwrap();

        assert!(matches!(
            client.generate(&sample_request()).await,
            Err(GenerationError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn unreachable_provider_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = GeminiChatClient::new("k".into(), Some(format!("http://{}", addr))).unwrap();

        let err = client.generate(&sample_request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
        // The connect failure lives below the top-level message.
        let chain = crate::error::error_chain(&err);
        assert!(chain.len() > err.to_string().len(), "no causes in {:?}", chain);
    }

    #[test]
    fn blank_api_key_is_rejected() {
        assert!(matches!(
            GeminiChatClient::new("  ".into(), None),
            Err(GenerationError::Config(_))
        ));
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let client = GeminiChatClient::new("k".into(), Some("https://example.test/v1beta/".into())).unwrap();
        assert_eq!(
            client.endpoint("gemini-2.5-flash"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
