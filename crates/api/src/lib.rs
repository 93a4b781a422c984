//! Shared wire types for the ledgerchat transaction-analysis API.
//!
//! This crate is the single source of truth for every request and response
//! body exchanged with the backend. The backend emits plain JSON; all types
//! here are tolerant of optional fields so older server builds still parse.

use serde::{Deserialize, Serialize};

// ─── Transactions ────────────────────────────────────────────────────────────

/// One bank transaction row, as returned by `GET /transactions/{id}`.
///
/// Amounts are `None` when the backend omits the field or sends `null`;
/// the table view renders those as empty cells. Extra backend fields
/// (`bank`, `transaction_id`, ...) are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: String,
    pub description: String,
    #[serde(default)]
    pub debit: Option<f64>,
    #[serde(default)]
    pub credit: Option<f64>,
    #[serde(default)]
    pub balance: Option<f64>,
}

// ─── Chat ────────────────────────────────────────────────────────────────────

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One chat message in a session's conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: None,
        }
    }
}

// ─── Analyze ─────────────────────────────────────────────────────────────────

/// Body for `POST /analyze`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyzeRequest {
    pub session_id: String,
    pub query: String,
}

/// Response from `POST /analyze`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyzeResponse {
    pub session_id: String,
    pub response: String,
}

// ─── Upload ──────────────────────────────────────────────────────────────────

/// Response from `POST /upload` (multipart CSV upload).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadResponse {
    pub session_id: String,
    #[serde(default)]
    pub message: String,
    pub transaction_count: u64,
    #[serde(default)]
    pub csv_format: String,
}

// ─── Health / status ─────────────────────────────────────────────────────────

/// Response from `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub sessions_active: u64,
}

/// Generic status envelope (`POST /set-api-key`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// Response from `DELETE /sessions/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DeleteResponse {
    #[serde(default)]
    pub message: String,
}

/// Response from `GET /format/{id}`: which CSV dialect the upload parsed as.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormatInfo {
    pub format: String,
    pub transaction_count: u64,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// The backend's error envelope: `{"detail": "..."}` on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_with_null_amounts_deserializes_to_none() {
        let json = r#"{"date":"2024-01-15","description":"COFFEE","debit":null,"credit":4.5,"balance":null}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.debit, None);
        assert_eq!(tx.credit, Some(4.5));
        assert_eq!(tx.balance, None);
    }

    #[test]
    fn transaction_with_missing_amounts_deserializes_to_none() {
        let json = r#"{"date":"2024-01-15","description":"COFFEE"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.debit, None);
        assert_eq!(tx.credit, None);
        assert_eq!(tx.balance, None);
    }

    #[test]
    fn transaction_ignores_extra_backend_fields() {
        let json = r#"{"date":"2024-01-15","description":"PAY","debit":0.0,"credit":100.0,"balance":500.0,"bank":"DESJ","transaction_id":"42"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.description, "PAY");
        assert_eq!(tx.balance, Some(500.0));
    }

    #[test]
    fn role_uses_snake_case_on_the_wire() {
        let msg: ChatMessage =
            serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        let out = serde_json::to_string(&ChatMessage::user("q")).unwrap();
        assert!(out.contains(r#""role":"user""#));
    }

    #[test]
    fn chat_message_keeps_backend_timestamp() {
        let json = r#"{"role":"user","content":"q","timestamp":"2024-01-15T10:00:00"}"#;
        let msg: ChatMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.timestamp.as_deref(), Some("2024-01-15T10:00:00"));
    }

    #[test]
    fn health_response_tolerates_sparse_bodies() {
        let health: HealthResponse = serde_json::from_str(r#"{"status":"healthy"}"#).unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.sessions_active, 0);
    }

    #[test]
    fn error_body_parses_fastapi_detail() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail":"Session not found"}"#).unwrap();
        assert_eq!(body.detail, "Session not found");
    }
}
