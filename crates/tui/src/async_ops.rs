use std::path::PathBuf;
use std::time::Duration;

use ledgerchat_api::{AnalyzeRequest, ChatMessage, HealthResponse, Transaction, UploadResponse};
use ledgerchat_api_client::ApiClient;

use crate::config::Config;

/// Commands that require async I/O (network calls).
pub enum AsyncCommand {
    CheckHealth,
    FetchSuggestions,
    FetchSessions,

    /// Fetch transactions and conversation history for one session. `token`
    /// is the load epoch at dispatch time; the result is dropped if another
    /// switch happened in between.
    LoadSession {
        session_id: String,
        token: u64,
    },

    Analyze {
        session_id: String,
        query: String,
    },

    DeleteSession {
        session_id: String,
    },

    SetApiKey {
        api_key: String,
    },

    UploadCsv {
        path: PathBuf,
    },
}

/// Results returned by async commands. Network failures are already reduced
/// to the user-facing message string.
pub enum CommandResult {
    Health(Result<HealthResponse, String>),
    Suggestions(Result<Vec<String>, String>),
    Sessions(Result<Vec<String>, String>),

    SessionLoaded {
        session_id: String,
        token: u64,
        result: Result<(Vec<Transaction>, Vec<ChatMessage>), String>,
    },

    Analysis {
        session_id: String,
        result: Result<String, String>,
    },

    Deleted {
        session_id: String,
        result: Result<(), String>,
    },

    ApiKeySet {
        hint: String,
        result: Result<(), String>,
    },

    Uploaded(Result<UploadResponse, String>),
}

fn make_client(config: &Config) -> Result<ApiClient, String> {
    ApiClient::new(&config.server.url, Duration::from_secs(60))
        .map_err(|e| format!("Failed to create HTTP client: {e}"))
}

pub async fn execute(cmd: AsyncCommand, config: &Config) -> CommandResult {
    match cmd {
        AsyncCommand::CheckHealth => {
            // Short timeout: this only gates the offline banner.
            let result = async {
                let client = ApiClient::new(&config.server.url, Duration::from_secs(3))
                    .map_err(|e| format!("Failed to create HTTP client: {e}"))?;
                client.health().await.map_err(|e| e.user_message())
            }
            .await;
            CommandResult::Health(result)
        }

        AsyncCommand::FetchSuggestions => {
            let result = async {
                let client = make_client(config)?;
                client
                    .query_suggestions()
                    .await
                    .map_err(|e| e.user_message())
            }
            .await;
            CommandResult::Suggestions(result)
        }

        AsyncCommand::FetchSessions => {
            let result = async {
                let client = make_client(config)?;
                client.list_sessions().await.map_err(|e| e.user_message())
            }
            .await;
            CommandResult::Sessions(result)
        }

        AsyncCommand::LoadSession { session_id, token } => {
            let result = async {
                let client = make_client(config)?;
                // Two independent fetches; both must land before the session
                // counts as loaded.
                let (transactions, messages) = tokio::join!(
                    client.transactions(&session_id),
                    client.messages(&session_id),
                );
                let transactions = transactions.map_err(|e| e.user_message())?;
                let messages = messages.map_err(|e| e.user_message())?;
                Ok((transactions, messages))
            }
            .await;
            CommandResult::SessionLoaded {
                session_id,
                token,
                result,
            }
        }

        AsyncCommand::Analyze { session_id, query } => {
            let result = async {
                let client = make_client(config)?;
                let resp = client
                    .analyze(&AnalyzeRequest {
                        session_id: session_id.clone(),
                        query,
                    })
                    .await
                    .map_err(|e| e.user_message())?;
                Ok(resp.response)
            }
            .await;
            CommandResult::Analysis { session_id, result }
        }

        AsyncCommand::DeleteSession { session_id } => {
            let result = async {
                let client = make_client(config)?;
                client
                    .delete_session(&session_id)
                    .await
                    .map_err(|e| e.user_message())?;
                Ok(())
            }
            .await;
            CommandResult::Deleted { session_id, result }
        }

        AsyncCommand::SetApiKey { api_key } => {
            let hint = crate::config::credential_hint(&api_key);
            let result = async {
                let client = make_client(config)?;
                client
                    .set_api_key(&api_key)
                    .await
                    .map_err(|e| e.user_message())?;
                Ok(())
            }
            .await;
            CommandResult::ApiKeySet { hint, result }
        }

        AsyncCommand::UploadCsv { path } => {
            let result = async {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "upload.csv".to_string());
                let bytes = std::fs::read(&path)
                    .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
                let client = make_client(config)?;
                client
                    .upload_csv(&file_name, bytes)
                    .await
                    .map_err(|e| e.user_message())
            }
            .await;
            CommandResult::Uploaded(result)
        }
    }
}
