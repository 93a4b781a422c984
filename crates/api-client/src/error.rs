use ledgerchat_api::ErrorBody;
use reqwest::StatusCode;

/// Failure modes of a single API call. Nothing here retries: every error is
/// terminal for the user action that triggered it.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (connection refused,
    /// timeout, DNS failure, malformed URL).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status. `detail` is the backend's
    /// `detail` field when the body carried one, else a generic fallback.
    #[error("{detail}")]
    Status { status: StatusCode, detail: String },
}

impl ApiError {
    /// The string shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => {
                "Cannot connect to the API server. Please ensure the backend is running."
                    .to_string()
            }
            Self::Status { detail, .. } => detail.clone(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Transport(_) => None,
            Self::Status { status, .. } => Some(*status),
        }
    }
}

/// Extract the user-facing message from a non-2xx response body.
pub(crate) fn error_detail(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.detail.trim().is_empty() => parsed.detail,
        _ => format!("server returned {status}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_prefers_backend_detail_field() {
        let detail = error_detail(
            StatusCode::NOT_FOUND,
            r#"{"detail":"Session not found"}"#,
        );
        assert_eq!(detail, "Session not found");
    }

    #[test]
    fn error_detail_falls_back_on_non_json_bodies() {
        let detail = error_detail(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert_eq!(detail, "server returned 502 Bad Gateway");
    }

    #[test]
    fn error_detail_falls_back_on_blank_detail() {
        let detail = error_detail(StatusCode::INTERNAL_SERVER_ERROR, r#"{"detail":"  "}"#);
        assert_eq!(detail, "server returned 500 Internal Server Error");
    }

    #[test]
    fn user_message_for_status_error_is_the_detail() {
        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            detail: "OpenAI API key not set. Please set your API key.".to_string(),
        };
        assert_eq!(
            err.user_message(),
            "OpenAI API key not set. Please set your API key."
        );
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }
}
