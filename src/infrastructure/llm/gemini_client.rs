use std::time::Duration;

use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    CompletionRequest, LlmClient, LlmClientError, LlmTokenStream,
};
use crate::domain::MessageRole;
use crate::presentation::config::LlmSettings;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Stands in for the user's text when only files were sent.
pub const FILE_ONLY_PROMPT: &str = "Please analyze this file";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini `generateContent` REST API.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    generation_config: GenerationConfig,
    request_timeout: Duration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content>,
    generation_config: &'a GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

impl ErrorBody {
    fn describe(self, fallback: &str) -> String {
        let message = self.message.unwrap_or_else(|| fallback.to_string());
        match self.status {
            Some(status) if !status.is_empty() => format!("{status}: {message}"),
            _ => message,
        }
    }
}

impl GenerateContentResponse {
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        generation_config: GenerationConfig,
        request_timeout: Duration,
    ) -> Result<Self, LlmClientError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmClientError::MissingApiKey);
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            generation_config,
            request_timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_contents(request: &CompletionRequest) -> Vec<Content> {
        let mut contents: Vec<Content> = request
            .turns
            .iter()
            .map(|turn| Content {
                role: gemini_role(turn.role),
                parts: if turn.text.trim().is_empty() {
                    Vec::new()
                } else {
                    vec![Part::Text {
                        text: turn.text.clone(),
                    }]
                },
            })
            .collect();

        if !request.attachments.is_empty() {
            let index = match contents.iter().rposition(|c| c.role == "user") {
                Some(index) => index,
                None => {
                    contents.push(Content {
                        role: "user",
                        parts: Vec::new(),
                    });
                    contents.len() - 1
                }
            };

            let turn = &mut contents[index];
            if turn.parts.is_empty() {
                turn.parts.push(Part::Text {
                    text: FILE_ONLY_PROMPT.to_string(),
                });
            }
            turn.parts
                .extend(request.attachments.iter().map(|a| Part::InlineData {
                    inline_data: InlineData {
                        mime_type: a.mime_type.clone(),
                        data: a.data_base64.clone(),
                    },
                }));
        }

        contents.retain(|c| !c.parts.is_empty());
        contents
    }

    async fn send(
        &self,
        action: &str,
        request: &CompletionRequest,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, LlmClientError> {
        let body = GenerateContentRequest {
            contents: Self::build_contents(request),
            generation_config: &self.generation_config,
        };

        let url = format!("{}/models/{}:{}", self.base_url, self.model, action);
        let mut builder = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmClientError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorWrapper>(&body)
                .map(|wrapper| wrapper.error.describe(&body))
                .unwrap_or(body);
            return Err(LlmClientError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, message
            )));
        }

        Ok(response)
    }
}

fn gemini_role(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "model",
    }
}

/// Parses one SSE line. `None` for lines that carry no text.
fn parse_event_line(line: &str) -> Option<Result<String, LlmClientError>> {
    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<GenerateContentResponse>(data) {
        Ok(mut event) => {
            if let Some(error) = event.error.take() {
                return Some(Err(LlmClientError::ApiRequestFailed(
                    error.describe("stream error"),
                )));
            }
            let text = event.text();
            (!text.is_empty()).then_some(Ok(text))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Skipping unparseable stream event");
            None
        }
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    #[tracing::instrument(skip(self, request), fields(model = %self.model, turns = request.turns.len()))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmClientError> {
        let response = self
            .send("generateContent", request, Some(self.request_timeout))
            .await?;

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(LlmClientError::EmptyResponse);
        }

        tracing::debug!(chars = text.len(), "Completion received");
        Ok(text)
    }

    #[tracing::instrument(
        skip(self, request),
        fields(model = %self.model, turns = request.turns.len(), attachments = request.attachments.len())
    )]
    async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<LlmTokenStream, LlmClientError> {
        let response = self
            .send("streamGenerateContent?alt=sse", request, None)
            .await?;

        let mut bytes = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut pending: Vec<u8> = Vec::new();
            let mut produced = false;
            let mut failed = false;

            'read: while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        failed = true;
                        yield Err(LlmClientError::ApiRequestFailed(e.to_string()));
                        break 'read;
                    }
                };
                pending.extend_from_slice(&chunk);

                while let Some(newline) = pending.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = pending.drain(..=newline).collect();
                    let line = String::from_utf8_lossy(&line);
                    match parse_event_line(line.trim()) {
                        Some(Ok(text)) => {
                            produced = true;
                            yield Ok(text);
                        }
                        Some(Err(e)) => {
                            failed = true;
                            yield Err(e);
                            break 'read;
                        }
                        None => {}
                    }
                }
            }

            // An error is the last item; nothing buffered after it is delivered.
            if failed {
                return;
            }

            if !pending.is_empty() {
                let line = String::from_utf8_lossy(&pending).to_string();
                match parse_event_line(line.trim()) {
                    Some(Ok(text)) => {
                        produced = true;
                        yield Ok(text);
                    }
                    Some(Err(e)) => {
                        yield Err(e);
                        return;
                    }
                    None => {}
                }
            }

            if !produced {
                yield Err(LlmClientError::EmptyResponse);
            }
        };

        Ok(Box::pin(stream))
    }
}

pub fn create_gemini_client(settings: &LlmSettings) -> Result<GeminiClient, LlmClientError> {
    let api_key = settings.resolve_api_key().ok_or(LlmClientError::MissingApiKey)?;

    GeminiClient::new(
        settings.base_url.clone(),
        api_key,
        settings.chat_model.clone(),
        GenerationConfig {
            max_output_tokens: settings.max_output_tokens,
            temperature: settings.temperature,
            top_p: settings.top_p,
            top_k: settings.top_k,
        },
        Duration::from_secs(settings.request_timeout_secs),
    )
}
