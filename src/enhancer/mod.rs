//! The completion adapter: one chat-completion call behind a trait seam.
//!
//! [`EnhanceService`] resolves the model, issues exactly one call through a
//! [`Backend`], trims and checks the result, and hands the transaction to
//! the audit writer without waiting for it.

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;
use crate::audit::writer::AuditWriter;
use crate::prompts::{ENHANCE_TEMPERATURE, build_enhance_system_prompt, effective_model};

/// Parameters for one enhancement, as received at the endpoint boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceParams {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// One upstream chat-completion call: a fixed system instruction plus the
/// user's raw prompt.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
}

/// Failures on the way to an enhanced prompt.
#[derive(Debug, thiserror::Error)]
pub enum EnhanceError {
    /// No upstream credential configured. Fatal for the request.
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
    /// The provider answered with a non-success status; its message is
    /// preserved verbatim.
    #[error("completion provider error ({status}): {message}")]
    Provider { status: u16, message: String },
    /// The provider answered, but with nothing usable in it.
    #[error("completion provider returned no content")]
    EmptyCompletion,
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// The raw chat-completion seam. Could be OpenAI, or a test script.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, EnhanceError>;
}

/// Wires a [`Backend`] and the audit writer into the enhancement
/// operation the endpoint exposes.
pub struct EnhanceService {
    backend: Box<dyn Backend>,
    audit: AuditWriter,
}

impl EnhanceService {
    pub fn new(backend: Box<dyn Backend>, audit: AuditWriter) -> Self {
        Self { backend, audit }
    }

    /// Enhance one prompt. The caller has already validated that the
    /// prompt is non-empty.
    pub async fn enhance(&self, params: &EnhanceParams) -> Result<String, EnhanceError> {
        let model = effective_model(params.model.as_deref());

        let request = CompletionRequest {
            model: model.clone(),
            system: build_enhance_system_prompt(),
            prompt: params.prompt.clone(),
            temperature: ENHANCE_TEMPERATURE,
        };

        let text = self.backend.complete(&request).await?;
        let enhanced = text.trim();
        if enhanced.is_empty() {
            return Err(EnhanceError::EmptyCompletion);
        }
        let enhanced = enhanced.to_string();

        // Enqueued, never awaited: the response must not wait on the log.
        self.audit.record(AuditEntry {
            user_id: params.user_id.clone(),
            raw_prompt: params.prompt.clone(),
            enhanced: enhanced.clone(),
            model: Some(model),
        });

        Ok(enhanced)
    }

    /// Close the audit queue and wait for pending writes. Tests use this
    /// to observe the fire-and-forget path deterministically.
    pub async fn shutdown(self) {
        self.audit.shutdown().await;
    }
}
