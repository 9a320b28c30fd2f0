//! The one client module every surface shares.
//!
//! Builds and sends a single HTTP request per enhancement and interprets
//! the response or failure. No retries and no timeout beyond the transport
//! default — deliberate simplicity, not an omission.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::audit::AuditRecord;

/// Failures a surface has to present.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Caught locally, before any network I/O.
    #[error("prompt is empty")]
    EmptyPrompt,
    /// The endpoint answered with a non-success status.
    #[error("enhance request failed ({status}): {body}")]
    RequestFailed { status: u16, body: String },
    /// The endpoint answered 2xx but without an enhanced text.
    #[error("no enhanced text returned")]
    EmptyResult,
    #[error("could not reach the enhancement service: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Client for the enhancement endpoint.
pub struct EnhanceClient {
    base_url: String,
    user_id: Option<String>,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnhanceRequest<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct EnhanceResponse {
    enhanced: Option<String>,
}

impl EnhanceClient {
    /// `base_url` comes out of the resolution chain
    /// ([`crate::config::resolve_base_url`]); paths are appended here.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id: None,
            client: reqwest::Client::new(),
        }
    }

    /// Attach a user id to every request this client sends.
    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The URL enhancement requests go to.
    pub fn enhance_url(&self) -> String {
        format!("{}/api/enhance", self.base_url)
    }

    /// Enhance one prompt. Empty input short-circuits locally.
    pub async fn enhance(
        &self,
        prompt: &str,
        model: Option<&str>,
    ) -> Result<String, ClientError> {
        if prompt.trim().is_empty() {
            return Err(ClientError::EmptyPrompt);
        }

        let resp = self
            .client
            .post(self.enhance_url())
            .json(&EnhanceRequest {
                prompt,
                model,
                user_id: self.user_id.as_deref(),
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::RequestFailed { status, body });
        }

        let data: EnhanceResponse = resp.json().await?;
        match data.enhanced {
            Some(enhanced) if !enhanced.is_empty() => Ok(enhanced),
            _ => Err(ClientError::EmptyResult),
        }
    }

    /// Fetch recent enhancements, newest first. The server clamps `limit`
    /// to its own cap.
    pub async fn history(
        &self,
        user_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<AuditRecord>, ClientError> {
        let mut req = self
            .client
            .get(format!("{}/api/history", self.base_url))
            .query(&[("limit", limit.to_string())]);
        if let Some(user) = user_id {
            req = req.query(&[("userId", user)]);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::RequestFailed { status, body });
        }
        Ok(resp.json().await?)
    }

    /// Probe `/health` until the server acknowledges, up to `attempts`
    /// probes spaced `delay` apart. An explicit readiness handshake
    /// instead of a guessed timeout.
    pub async fn wait_until_ready(
        &self,
        attempts: u32,
        delay: Duration,
    ) -> Result<(), ClientError> {
        let attempts = attempts.max(1);
        let mut last = None;

        for attempt in 1..=attempts {
            match self
                .client
                .get(format!("{}/health", self.base_url))
                .send()
                .await
            {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                Ok(resp) => {
                    last = Some(ClientError::RequestFailed {
                        status: resp.status().as_u16(),
                        body: resp.text().await.unwrap_or_default(),
                    });
                }
                Err(e) => last = Some(e.into()),
            }
            if attempt < attempts {
                tokio::time::sleep(delay).await;
            }
        }

        Err(last.expect("at least one probe ran"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let client = EnhanceClient::new("https://example.test/");
        assert_eq!(client.base_url(), "https://example.test");
        assert_eq!(client.enhance_url(), "https://example.test/api/enhance");
    }

    #[test]
    fn request_omits_absent_fields() {
        let json = serde_json::to_string(&EnhanceRequest {
            prompt: "p",
            model: None,
            user_id: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"prompt":"p"}"#);
    }

    #[test]
    fn request_uses_wire_names() {
        let json = serde_json::to_string(&EnhanceRequest {
            prompt: "p",
            model: Some("gpt-4o"),
            user_id: Some("u"),
        })
        .unwrap();
        assert!(json.contains("\"model\":\"gpt-4o\""));
        assert!(json.contains("\"userId\":\"u\""));
    }

    #[tokio::test]
    async fn empty_prompt_never_touches_the_network() {
        // Port 1 is never listening; a network attempt would error with
        // Transport, not EmptyPrompt.
        let client = EnhanceClient::new("http://127.0.0.1:1");
        let err = client.enhance("   ", None).await.unwrap_err();
        assert!(matches!(err, ClientError::EmptyPrompt));
    }
}
