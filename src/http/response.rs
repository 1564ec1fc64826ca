use serde_json::Value;

/// The result of one request: status classification plus the body in both
/// raw and parsed form.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub status_text: String,
    pub duration_ms: u128,
    pub size_bytes: usize,
    /// Raw body text as received.
    pub raw: String,
    /// Body parsed as JSON; `None` when the body is empty or unparseable.
    pub body: Option<Value>,
}

impl ResponseEnvelope {
    pub(crate) fn new(
        status: reqwest::StatusCode,
        duration_ms: u128,
        raw: String,
    ) -> Self {
        let body = serde_json::from_str(&raw).ok();
        Self {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            duration_ms,
            size_bytes: raw.len(),
            raw,
            body,
        }
    }

    /// Whether the status classifies as success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `"200 OK"`-style label for assertion messages.
    pub fn status_label(&self) -> String {
        format!("{} {}", self.status, self.status_text)
    }
}
