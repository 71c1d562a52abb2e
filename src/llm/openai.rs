//! HTTP client for Azure OpenAI deployments and OpenAI-compatible servers.
//!
//! Both flavors speak the same JSON bodies; they differ in URL layout and
//! authentication header only.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};

use super::provider::{CompletionError, CompletionGateway, EmbeddingError, EmbeddingGateway};
use super::types::{ChatMessage, CompletionRequest};
use crate::core::config::{ApiFlavor, ModelEndpointConfig};

#[derive(Clone)]
pub struct OpenAiClient {
    flavor: ApiFlavor,
    base_url: String,
    api_key: String,
    model: String,
    api_version: String,
    dimensions: Option<usize>,
    client: Client,
}

impl OpenAiClient {
    pub fn new(config: &ModelEndpointConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            flavor: config.flavor,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            api_version: config.api_version.clone(),
            dimensions: config.dimensions,
            client,
        })
    }

    fn operation_url(&self, operation: &str) -> String {
        match self.flavor {
            ApiFlavor::Azure => format!(
                "{}/openai/deployments/{}/{}?api-version={}",
                self.base_url, self.model, operation, self.api_version
            ),
            ApiFlavor::OpenAi => format!("{}/v1/{}", self.base_url, operation),
        }
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.flavor {
            ApiFlavor::Azure => builder.header("api-key", &self.api_key),
            ApiFlavor::OpenAi if self.api_key.is_empty() => builder,
            ApiFlavor::OpenAi => builder.bearer_auth(&self.api_key),
        }
    }

    /// Azure routes by deployment name in the URL; OpenAI wants it in the body.
    fn with_model(&self, mut body: Value) -> Value {
        if self.flavor == ApiFlavor::OpenAi {
            if let Some(obj) = body.as_object_mut() {
                obj.insert("model".to_string(), json!(self.model));
            }
        }
        body
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

fn first_embedding(
    response: EmbeddingResponse,
    dimensions: Option<usize>,
) -> Result<Vec<f32>, EmbeddingError> {
    let vector = response
        .data
        .into_iter()
        .next()
        .map(|item| item.embedding)
        .ok_or_else(|| EmbeddingError::Malformed("response contained no vectors".to_string()))?;

    if vector.is_empty() {
        return Err(EmbeddingError::Malformed("empty vector".to_string()));
    }
    if let Some(expected) = dimensions {
        if vector.len() != expected {
            return Err(EmbeddingError::Malformed(format!(
                "expected {} dimensions, got {}",
                expected,
                vector.len()
            )));
        }
    }
    Ok(vector)
}

fn first_choice(response: ChatCompletionResponse) -> Result<ChatMessage, CompletionError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(CompletionError::NoChoices)?;
    let content = choice
        .message
        .content
        .ok_or_else(|| CompletionError::Malformed("first choice has no content".to_string()))?;
    Ok(ChatMessage::assistant(content))
}

#[async_trait]
impl EmbeddingGateway for OpenAiClient {
    fn name(&self) -> &str {
        self.flavor.as_str()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = self.operation_url("embeddings");
        let body = self.with_model(json!({ "input": [text] }));

        let res = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbeddingError::Transport(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(EmbeddingError::Status { status, body });
        }

        let payload: EmbeddingResponse = res
            .json()
            .await
            .map_err(|e| EmbeddingError::Malformed(e.to_string()))?;

        first_embedding(payload, self.dimensions)
    }
}

#[async_trait]
impl CompletionGateway for OpenAiClient {
    fn name(&self) -> &str {
        self.flavor.as_str()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<ChatMessage, CompletionError> {
        let url = self.operation_url("chat/completions");

        let mut body = self.with_model(json!({
            "messages": request.dialogue,
            "stream": false,
        }));
        if let Some(obj) = body.as_object_mut() {
            if let Some(temperature) = request.temperature {
                obj.insert("temperature".to_string(), json!(temperature));
            }
            if let Some(max_tokens) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(max_tokens));
            }
        }

        let res = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status, body });
        }

        let payload: ChatCompletionResponse = res
            .json()
            .await
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;

        first_choice(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::Role;

    fn endpoint(flavor: ApiFlavor) -> ModelEndpointConfig {
        ModelEndpointConfig {
            flavor,
            endpoint: "https://example.openai.azure.com/".to_string(),
            api_key: "k".to_string(),
            model: "gpt-4o".to_string(),
            api_version: "2024-02-01".to_string(),
            dimensions: None,
            temperature: None,
            max_tokens: None,
        }
    }

    #[test]
    fn azure_url_routes_by_deployment() {
        let client = OpenAiClient::new(&endpoint(ApiFlavor::Azure), Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.operation_url("chat/completions"),
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-02-01"
        );
        let body = client.with_model(json!({"input": ["x"]}));
        assert!(body.get("model").is_none());
    }

    #[test]
    fn openai_url_puts_model_in_body() {
        let client = OpenAiClient::new(&endpoint(ApiFlavor::OpenAi), Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.operation_url("embeddings"),
            "https://example.openai.azure.com/v1/embeddings"
        );
        let body = client.with_model(json!({"input": ["x"]}));
        assert_eq!(body["model"], "gpt-4o");
    }

    #[test]
    fn zero_choices_is_an_error() {
        let payload: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(first_choice(payload), Err(CompletionError::NoChoices)));

        let payload: ChatCompletionResponse = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert!(matches!(first_choice(payload), Err(CompletionError::NoChoices)));
    }

    #[test]
    fn first_choice_becomes_assistant_message() {
        let payload: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [
                {"message": {"role": "assistant", "content": "first"}},
                {"message": {"role": "assistant", "content": "second"}}
            ]}"#,
        )
        .unwrap();
        let msg = first_choice(payload).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, "first");
    }

    #[test]
    fn null_content_is_malformed() {
        let payload: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert!(matches!(first_choice(payload), Err(CompletionError::Malformed(_))));
    }

    #[test]
    fn embedding_dimension_is_checked() {
        let payload: EmbeddingResponse =
            serde_json::from_str(r#"{"data": [{"embedding": [0.1, 0.2, 0.3]}]}"#).unwrap();
        assert_eq!(first_embedding(payload, Some(3)).unwrap().len(), 3);

        let payload: EmbeddingResponse =
            serde_json::from_str(r#"{"data": [{"embedding": [0.1, 0.2]}]}"#).unwrap();
        assert!(matches!(first_embedding(payload, Some(3)), Err(EmbeddingError::Malformed(_))));

        let payload: EmbeddingResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(matches!(first_embedding(payload, None), Err(EmbeddingError::Malformed(_))));
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_azure_roundtrip() {
        let config = ModelEndpointConfig {
            endpoint: std::env::var("AZURE_ENDPOINT").unwrap_or_default(),
            api_key: std::env::var("AZURE_KEY").unwrap_or_default(),
            model: std::env::var("AZURE_EMBEDDING").unwrap_or_default(),
            ..endpoint(ApiFlavor::Azure)
        };
        let client = OpenAiClient::new(&config, Duration::from_secs(30)).unwrap();
        match client.embed("a widget with a spring").await {
            Ok(vector) => println!("Azure embedding dimensions: {}", vector.len()),
            Err(e) => panic!("Failed to reach Azure: {}", e),
        }
    }
}
