/// OpenAI Chat Completions provider
///
/// Structured requests use `response_format: json_schema` in strict mode so
/// the reply content is a JSON document matching the requested shape.
/// Streamed requests read the server-sent event body incrementally.
use crate::{
    error::{AppError, AppResult},
    models::OutputShape,
    services::providers::{sse::SseDecoder, CompletionProvider, TextStream},
};
use futures::{stream, StreamExt};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const USER_ROLE: &str = "user";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat {
    name: &'static str,
    strict: bool,
    schema: Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_url)
    }

    async fn send(&self, request: &ChatRequest<'_>) -> AppResult<reqwest::Response> {
        let response = self
            .http_client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "API returned status {}: {}",
                status, body
            )));
        }

        Ok(response)
    }
}

#[async_trait::async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn generate_object(&self, prompt: &str, shape: OutputShape) -> AppResult<Value> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: USER_ROLE,
                content: prompt,
            }],
            response_format: Some(ResponseFormat {
                format_type: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: shape.name(),
                    strict: true,
                    schema: shape.json_schema(),
                },
            }),
            stream: false,
        };

        let response: ChatResponse = self.send(&request).await?.json().await?;

        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| AppError::Upstream("API response contained no choices".to_string()))?;

        if let Some(refusal) = message.refusal {
            return Err(AppError::Upstream(format!("model refused: {}", refusal)));
        }

        let content = message
            .content
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AppError::Upstream("API response had empty content".to_string()))?;

        let object: Value = serde_json::from_str(&content)
            .map_err(|e| AppError::Upstream(format!("model returned invalid JSON: {}", e)))?;

        tracing::debug!(
            schema = shape.name(),
            model = %self.model,
            provider = "openai",
            "Structured completion received"
        );

        Ok(object)
    }

    async fn stream_text(&self, prompt: &str) -> AppResult<TextStream> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: USER_ROLE,
                content: prompt,
            }],
            response_format: None,
            stream: true,
        };

        let response = self.send(&request).await?;

        tracing::debug!(model = %self.model, provider = "openai", "Completion stream opened");

        let body = response.bytes_stream().boxed();
        let batches = stream::unfold(Some((body, SseDecoder::new())), |state| async move {
            let (mut body, mut decoder) = state?;
            // An error ends the stream
            let (items, next): (Vec<AppResult<String>>, _) = match body.next().await {
                Some(Ok(chunk)) => match decoder.push(&chunk) {
                    Ok(batch) => (batch.into_iter().map(Ok).collect(), Some((body, decoder))),
                    Err(e) => (vec![Err(e)], None),
                },
                Some(Err(e)) => (vec![Err(AppError::from(e))], None),
                None => (decoder.finish(), None),
            };
            Some((items, next))
        });

        Ok(batches.flat_map(stream::iter).boxed())
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
