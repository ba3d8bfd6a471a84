//! Request/response types for the HTTP surface and the upstream wire format.

use serde::{Deserialize, Serialize};

/// Inbound chat request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

impl ChatRequest {
    /// Whitespace-only messages count as empty.
    pub fn is_empty(&self) -> bool {
        self.message.trim().is_empty()
    }
}

/// Chat reply, both for success and for the fixed degradation messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Upload probe report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReport {
    pub status: String,
    #[serde(rename = "receivedMB")]
    pub received_mb: String,
}

impl UploadReport {
    pub fn ok(received_bytes: u64) -> Self {
        Self {
            status: "ok".to_string(),
            received_mb: format!("{:.2}", received_bytes as f64 / crate::stream::MIB as f64),
        }
    }
}

/// Ping probe reply. Latency is milliseconds with two decimals, as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingReply {
    pub message: String,
    pub latency: String,
}

impl PingReply {
    pub fn pong(delay_ms: f64) -> Self {
        Self {
            message: "pong".to_string(),
            latency: format!("{:.2}", delay_ms),
        }
    }
}

// ============================================================
// Upstream wire format (OpenAI-compatible chat completions)
// ============================================================

/// A single message on the upstream wire.
#[derive(Debug, Clone, Serialize)]
pub struct WireMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// Outbound completion request.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage<'a>>,
}

/// Upstream completion response, reduced to the fields the relay reads.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    pub message: CompletionMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionMessage {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_deserialize() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "hello"}"#).unwrap();
        assert_eq!(req.message, "hello");
        assert!(!req.is_empty());
    }

    #[test]
    fn test_chat_request_whitespace_is_empty() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "  \n\t "}"#).unwrap();
        assert!(req.is_empty());
    }

    #[test]
    fn test_upload_report_field_name() {
        let report = UploadReport::ok(5 * 1024 * 1024);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"receivedMB\":\"5.00\""));
        assert!(json.contains("\"status\":\"ok\""));
    }

    #[test]
    fn test_upload_report_fractional() {
        // 1.5 MiB rounds to two decimals.
        let report = UploadReport::ok(1024 * 1024 + 512 * 1024);
        assert_eq!(report.received_mb, "1.50");
    }

    #[test]
    fn test_ping_reply_two_decimals() {
        let reply = PingReply::pong(12.3456);
        assert_eq!(reply.message, "pong");
        assert_eq!(reply.latency, "12.35");
    }

    #[test]
    fn test_completion_request_serialize() {
        let req = CompletionRequest {
            model: "gpt-4o-mini",
            messages: vec![
                WireMessage {
                    role: "system",
                    content: "context",
                },
                WireMessage {
                    role: "user",
                    content: "hello",
                },
            ],
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"model\":\"gpt-4o-mini\""));
        assert!(json.contains("\"role\":\"system\""));
        assert!(json.contains("\"role\":\"user\""));
    }

    #[test]
    fn test_completion_response_parse() {
        let json = r#"{
            "id": "chatcmpl-abc",
            "object": "chat.completion",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "hi there"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
        }"#;
        let resp: CompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.choices[0].message.content, "hi there");
    }

    #[test]
    fn test_completion_response_no_choices() {
        let resp: CompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(resp.choices.is_empty());
    }
}
