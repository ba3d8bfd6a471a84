//! Chat relay: one outbound call per inbound message.
//!
//! The relay folds a static knowledge file into a fixed system prompt at
//! construction time, then forwards each user message to an
//! OpenAI-compatible completions endpoint. No retries, no streaming; any
//! upstream failure is reported as an error for the handler to collapse
//! into the generic degradation reply.

use std::time::Duration;

use netprobe_core::config::UpstreamConfig;
use netprobe_core::error::{NetProbeError, Result};

use crate::api::{CompletionRequest, CompletionResponse, WireMessage};

const SYSTEM_PROMPT_HEADER: &str = "You are the assistant for this service. \
Answer briefly and helpfully. When the reference notes below are relevant, \
base your answer on them.\n\n--- Reference notes ---\n";

fn build_system_prompt(knowledge: &str) -> String {
    let mut prompt = String::with_capacity(SYSTEM_PROMPT_HEADER.len() + knowledge.len());
    prompt.push_str(SYSTEM_PROMPT_HEADER);
    prompt.push_str(knowledge.trim());
    prompt
}

/// Client for the external completion service.
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
    system_prompt: String,
}

impl RelayClient {
    /// Build the relay from startup configuration.
    ///
    /// `api_key` is the credential read from the environment at startup;
    /// `None` defers the failure to the first chat request.
    pub fn new(upstream: &UpstreamConfig, api_key: Option<String>, knowledge: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(upstream.timeout_secs))
            .build()
            .map_err(|e| NetProbeError::UpstreamTransport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: upstream.base_url.clone(),
            model: upstream.model.clone(),
            api_key,
            api_key_env: upstream.api_key_env.clone(),
            system_prompt: build_system_prompt(knowledge),
        })
    }

    /// Whether a credential was present at startup.
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Forward one user message and return the assistant's reply text.
    pub async fn complete(&self, message: &str) -> Result<String> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| NetProbeError::MissingCredential {
                var: self.api_key_env.clone(),
            })?;

        let body = CompletionRequest {
            model: &self.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                WireMessage {
                    role: "user",
                    content: message,
                },
            ],
        };

        let resp = self
            .http
            .post(&self.base_url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NetProbeError::UpstreamTransport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NetProbeError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| NetProbeError::UpstreamTransport(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                NetProbeError::UpstreamTransport("completion response had no choices".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_upstream() -> UpstreamConfig {
        UpstreamConfig {
            // Discard port; nothing listens there, so transport errors fast.
            base_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            model: "test-model".to_string(),
            timeout_secs: 2,
            api_key_env: "NETPROBE_TEST_KEY".to_string(),
        }
    }

    #[test]
    fn test_system_prompt_includes_knowledge() {
        let prompt = build_system_prompt("The service runs on port 8080.\n");
        assert!(prompt.starts_with(SYSTEM_PROMPT_HEADER));
        assert!(prompt.ends_with("The service runs on port 8080."));
    }

    #[test]
    fn test_has_credential() {
        let relay = RelayClient::new(&test_upstream(), Some("sk-test".into()), "").unwrap();
        assert!(relay.has_credential());
        let relay = RelayClient::new(&test_upstream(), None, "").unwrap();
        assert!(!relay.has_credential());
    }

    #[tokio::test]
    async fn test_missing_credential_fails_at_call_time() {
        let relay = RelayClient::new(&test_upstream(), None, "notes").unwrap();
        let err = relay.complete("hello").await.unwrap_err();
        assert!(matches!(err, NetProbeError::MissingCredential { ref var } if var == "NETPROBE_TEST_KEY"));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_transport_error() {
        let relay = RelayClient::new(&test_upstream(), Some("sk-test".into()), "notes").unwrap();
        let err = relay.complete("hello").await.unwrap_err();
        assert!(matches!(err, NetProbeError::UpstreamTransport(_)));
    }
}
