use thiserror::Error;

/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("Unable to reach the server: {0}")]
    Transport(String),

    /// The backend answered with a non-success status. Displays the backend message verbatim.
    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// A newer operation started before this one settled; its result was discarded.
    #[error("Superseded by a newer session operation")]
    Superseded,
}

impl AuthError {
    /// Build a backend error from a raw response body.
    ///
    /// The message is read from `message`, then `detail`, then the trimmed body.
    #[must_use]
    pub fn from_body(status: u16, body: &str) -> Self {
        Self::Backend {
            status,
            message: extract_message(body),
        }
    }
}

fn extract_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "detail"] {
            if let Some(message) = value.get(key).and_then(serde_json::Value::as_str) {
                if !message.trim().is_empty() {
                    return message.to_string();
                }
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
