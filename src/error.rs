use thiserror::Error;

/// Failures surfaced to the user. Each variant renders a single readable message.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("a status update for order {0} is already in progress")]
    UpdateInFlight(String),

    #[error("order {0} not found")]
    UnknownOrder(String),

    #[error("result discarded: the view has moved on")]
    Stale,

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl ConsoleError {
    /// Build a status error from a failed response body.
    ///
    /// Prefers a JSON `detail` or `message` field, then the raw body text,
    /// then `fallback`.
    pub fn from_body(status: u16, body: &str, fallback: &str) -> Self {
        let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
        let from_json = parsed.as_ref().and_then(|v| {
            ["detail", "message"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()))
                .map(String::from)
        });
        let message = match from_json {
            Some(m) if !m.trim().is_empty() => m,
            _ if parsed.is_none() && !body.trim().is_empty() => body.trim().to_string(),
            _ => fallback.to_string(),
        };
        ConsoleError::Status { status, message }
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_body_prefers_detail() {
        let err = ConsoleError::from_body(401, r#"{"detail":"Invalid credentials"}"#, "Login failed");
        assert_eq!(err.to_string(), "Invalid credentials (HTTP 401)");
    }

    #[test]
    fn test_from_body_uses_plain_text() {
        let err = ConsoleError::from_body(500, "upstream exploded", "Failed to fetch settings");
        assert_eq!(err.to_string(), "upstream exploded (HTTP 500)");
    }

    #[test]
    fn test_from_body_falls_back() {
        let err = ConsoleError::from_body(502, "", "Failed to fetch orders");
        assert_eq!(err.to_string(), "Failed to fetch orders (HTTP 502)");

        let err = ConsoleError::from_body(400, r#"{"error":true}"#, "Failed to update status");
        assert_eq!(err.to_string(), "Failed to update status (HTTP 400)");
    }
}
