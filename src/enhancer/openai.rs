use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Backend, CompletionRequest, EnhanceError};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// A backend that calls the OpenAI chat-completions API.
pub struct OpenAiBackend {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl Default for OpenAiBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAiBackend {
    /// Production configuration: the credential is looked up from the
    /// environment on every call, so a key exported after startup works.
    pub fn new() -> Self {
        Self {
            base_url: OPENAI_API_URL.to_string(),
            api_key: None,
            client: reqwest::Client::new(),
        }
    }

    /// Point at a different OpenAI-compatible endpoint. Tests use this to
    /// talk to a loopback stub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Pin the credential instead of reading the environment.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn resolve_key(&self) -> Result<String, EnhanceError> {
        match &self.api_key {
            Some(key) => key_from(Some(key.clone())),
            None => key_from(std::env::var(API_KEY_ENV).ok()),
        }
    }
}

fn key_from(value: Option<String>) -> Result<String, EnhanceError> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(EnhanceError::MissingApiKey),
    }
}

#[async_trait]
impl Backend for OpenAiBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, EnhanceError> {
        let api_key = self.resolve_key()?;

        let body = ApiRequest {
            model: &request.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
        };

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(EnhanceError::Provider { status, message });
        }

        let api_resp: ApiResponse = resp.json().await?;
        let text = api_resp
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(EnhanceError::EmptyCompletion);
        }
        Ok(text)
    }
}

// --- API types ---

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_from_present_value() {
        assert_eq!(key_from(Some("sk-test".to_string())).unwrap(), "sk-test");
    }

    #[test]
    fn key_from_missing_value_fails() {
        assert!(matches!(key_from(None), Err(EnhanceError::MissingApiKey)));
    }

    #[test]
    fn key_from_blank_value_fails() {
        assert!(matches!(
            key_from(Some("   ".to_string())),
            Err(EnhanceError::MissingApiKey)
        ));
    }

    #[test]
    fn request_serializes_system_then_user() {
        let body = ApiRequest {
            model: "gpt-4o-mini",
            messages: vec![
                Message {
                    role: "system",
                    content: "instruction",
                },
                Message {
                    role: "user",
                    content: "prompt",
                },
            ],
            temperature: 0.3,
        };
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "prompt");
    }

    #[test]
    fn response_parses_first_choice_content() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"enhanced"}}]}"#;
        let resp: ApiResponse = serde_json::from_str(json).unwrap();
        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);
        assert_eq!(text.as_deref(), Some("enhanced"));
    }

    #[test]
    fn response_without_choices_parses_to_empty() {
        let resp: ApiResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.choices.is_empty());
    }

    #[test]
    fn with_base_url_strips_trailing_slash() {
        let backend = OpenAiBackend::new().with_base_url("http://127.0.0.1:9999/");
        assert_eq!(backend.base_url, "http://127.0.0.1:9999");
    }
}
