use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ledgerchat_api::{ChatMessage, HealthResponse};
use ratatui::widgets::{ListState, TableState};

use crate::async_ops::{AsyncCommand, CommandResult};
use crate::config::{self, Config};
use crate::table::TableView;
pub use crate::views::modal::{ConfirmAction, Modal};

/// Greeting injected when a session has no conversation history yet.
pub const WELCOME_MESSAGE: &str =
    "I've loaded your transaction data. What would you like to know about your finances?";

/// Which screen the user is viewing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Landing,
    Chat,
    Help,
}

/// Which pane receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sessions,
    Suggestions,
    UploadPath,
    ApiKey,
    ChatInput,
    Table,
}

/// Backend reachability, probed once after the first render.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServerStatus {
    #[default]
    Unknown,
    Online(String),
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Info,
    Success,
    Error,
}

pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
    at: Instant,
}

/// Inline feedback under the upload field, mirroring the upload flow's
/// progress / success / failure states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Info(String),
    Success(String),
    Error(String),
}

/// Everything tied to the one currently displayed session. Replaced as a
/// unit on every switch, so table rows, messages and the session id can
/// never disagree about which session they belong to.
pub struct ActiveSession {
    pub id: String,
    pub messages: Vec<ChatMessage>,
    pub table: TableView,
    pub loaded: bool,
}

pub struct App {
    pub view: View,
    pub focus: Focus,
    pub config: Config,
    pub server_status: ServerStatus,

    // Sidebar
    pub sessions: Vec<String>,
    pub session_state: ListState,

    // Landing
    pub suggestions: Vec<String>,
    pub suggestion_state: ListState,
    pub upload_path: String,
    pub api_key_input: String,
    pub upload_feedback: Option<Feedback>,
    pub upload_in_flight: bool,

    // Active session
    pub active: Option<ActiveSession>,
    /// Monotonically increasing session-switch token. A `SessionLoaded`
    /// result is applied only when its token still matches, so a slow fetch
    /// for a superseded session can never overwrite the current view.
    pub load_epoch: u64,
    /// Session id of the outstanding analyze call, if any. Submission is
    /// disabled while this is set.
    pub analyze_in_flight: Option<String>,
    pub reveal_table_on_load: bool,

    // Chat
    pub input: String,
    pub search_editing: bool,
    pub table_state: TableState,

    // Plumbing
    pub commands: VecDeque<AsyncCommand>,
    pub modal: Option<Modal>,
    pub flash: Option<Flash>,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            view: View::Landing,
            focus: Focus::Suggestions,
            config,
            server_status: ServerStatus::default(),
            sessions: Vec::new(),
            session_state: ListState::default(),
            suggestions: Vec::new(),
            suggestion_state: ListState::default(),
            upload_path: String::new(),
            api_key_input: String::new(),
            upload_feedback: None,
            upload_in_flight: false,
            active: None,
            load_epoch: 0,
            analyze_in_flight: None,
            reveal_table_on_load: false,
            input: String::new(),
            search_editing: false,
            table_state: TableState::default(),
            commands: VecDeque::new(),
            modal: None,
            flash: None,
        }
    }

    // ── Session switching ────────────────────────────────────────────────

    /// Make `id` the active session: install a fresh (hidden) table and an
    /// empty message list atomically, then fetch its data under a new epoch
    /// token.
    pub fn select_session(&mut self, id: String) {
        self.load_epoch += 1;
        self.active = Some(ActiveSession {
            id: id.clone(),
            messages: Vec::new(),
            table: TableView::new(Vec::new()),
            loaded: false,
        });
        self.view = View::Chat;
        self.focus = Focus::ChatInput;
        self.input.clear();
        self.search_editing = false;
        self.table_state = TableState::default();
        let selected = self.sessions.iter().position(|s| *s == id);
        self.session_state.select(selected);
        self.commands.push_back(AsyncCommand::LoadSession {
            session_id: id,
            token: self.load_epoch,
        });
    }

    /// Clear the active session and return to the landing view. Bumps the
    /// epoch so any in-flight load for the old session is discarded.
    pub fn deselect_session(&mut self) {
        self.load_epoch += 1;
        self.active = None;
        self.view = View::Landing;
        self.focus = Focus::Suggestions;
        self.input.clear();
        self.search_editing = false;
    }

    pub fn selected_session_id(&self) -> Option<&str> {
        self.session_state
            .selected()
            .and_then(|i| self.sessions.get(i))
            .map(String::as_str)
    }

    /// Ask for confirmation before deleting the sidebar-selected session.
    pub fn request_delete_selected(&mut self) {
        let Some(id) = self.selected_session_id().map(str::to_string) else {
            return;
        };
        self.modal = Some(Modal::Confirm {
            title: "Delete Session".to_string(),
            message: format!("Delete {}? This cannot be undone.", session_label(&id)),
            action: ConfirmAction::DeleteSession { session_id: id },
        });
    }

    // ── Chat ─────────────────────────────────────────────────────────────

    /// Submit the chat input. A no-op without an active session, with a
    /// blank query, or while an analyze call for this session is still
    /// outstanding. An outstanding call for another session does not block:
    /// its late reply is dropped by the session-id check on the result.
    pub fn submit_query(&mut self) {
        if self.analysis_pending_for_active() {
            return;
        }
        let query = self.input.trim().to_string();
        if query.is_empty() {
            return;
        }
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.messages.push(ChatMessage::user(query.clone()));
        let session_id = active.id.clone();
        self.analyze_in_flight = Some(session_id.clone());
        self.input.clear();
        self.commands
            .push_back(AsyncCommand::Analyze { session_id, query });
    }

    /// Whether the chat view should show the transient loading bubble.
    pub fn analysis_pending_for_active(&self) -> bool {
        match (&self.analyze_in_flight, &self.active) {
            (Some(pending), Some(active)) => *pending == active.id,
            _ => false,
        }
    }

    // ── Landing actions ──────────────────────────────────────────────────

    /// Stash the highlighted suggestion so it prefills the next session.
    pub fn pick_suggestion(&mut self) {
        let Some(suggestion) = self
            .suggestion_state
            .selected()
            .and_then(|i| self.suggestions.get(i))
            .cloned()
        else {
            return;
        };
        self.config.suggested_query = Some(suggestion);
        self.save_config();
        self.flash_info("Suggestion saved — it will prefill your next session");
    }

    /// Validate and start a CSV upload. All validation failures short-circuit
    /// before any network call.
    pub fn submit_upload(&mut self) {
        if self.upload_in_flight {
            return;
        }
        let path = self.upload_path.trim().to_string();
        if path.is_empty() {
            return;
        }
        if self.config.credential_hint.is_empty() {
            self.upload_feedback = Some(Feedback::Error(
                "Please set your OpenAI API key first".to_string(),
            ));
            return;
        }
        if !path.to_lowercase().ends_with(".csv") {
            self.upload_feedback =
                Some(Feedback::Error("Please upload a CSV file".to_string()));
            return;
        }
        let path = PathBuf::from(path);
        if !path.is_file() {
            self.upload_feedback = Some(Feedback::Error(format!(
                "File not found: {}",
                path.display()
            )));
            return;
        }
        self.upload_in_flight = true;
        self.upload_feedback = Some(Feedback::Info(
            "Uploading and processing your data...".to_string(),
        ));
        self.commands.push_back(AsyncCommand::UploadCsv { path });
    }

    /// Send the typed credential to the backend. Only a hint is kept.
    pub fn submit_api_key(&mut self) {
        let api_key = self.api_key_input.trim().to_string();
        if api_key.is_empty() {
            self.flash_error("Please enter your OpenAI API key");
            return;
        }
        self.commands.push_back(AsyncCommand::SetApiKey { api_key });
    }

    pub fn clear_credential_hint(&mut self) {
        if self.config.credential_hint.is_empty() {
            return;
        }
        self.config.credential_hint.clear();
        self.save_config();
        self.flash_info("API key hint cleared");
    }

    // ── Command results ──────────────────────────────────────────────────

    pub fn apply_command_result(&mut self, result: CommandResult) {
        match result {
            CommandResult::Health(Ok(health)) => {
                self.server_status = ServerStatus::Online(version_of(&health));
            }
            CommandResult::Health(Err(_)) => {
                self.server_status = ServerStatus::Offline;
            }

            CommandResult::Suggestions(Ok(suggestions)) => {
                self.suggestions = suggestions;
                if !self.suggestions.is_empty() && self.suggestion_state.selected().is_none() {
                    self.suggestion_state.select(Some(0));
                }
            }
            CommandResult::Suggestions(Err(e)) => {
                tracing::debug!(error = %e, "failed to fetch query suggestions");
            }

            CommandResult::Sessions(Ok(sessions)) => {
                self.sessions = sessions;
                if !self.sessions.is_empty() && self.session_state.selected().is_none() {
                    self.session_state.select(Some(0));
                }
            }
            CommandResult::Sessions(Err(e)) => {
                tracing::debug!(error = %e, "failed to fetch sessions");
            }

            CommandResult::SessionLoaded {
                session_id,
                token,
                result,
            } => self.apply_session_loaded(session_id, token, result),

            CommandResult::Analysis { session_id, result } => {
                if self.analyze_in_flight.as_deref() == Some(session_id.as_str()) {
                    self.analyze_in_flight = None;
                }
                let Some(active) = self.active.as_mut() else {
                    return;
                };
                if active.id != session_id {
                    // The user switched sessions while the call was in
                    // flight; the answer belongs to the old session.
                    return;
                }
                match result {
                    Ok(text) => active.messages.push(ChatMessage::assistant(text)),
                    Err(e) => active.messages.push(ChatMessage::assistant(format!(
                        "Error: {e}. Please make sure your OpenAI API key is set correctly."
                    ))),
                }
            }

            CommandResult::Deleted { session_id, result } => match result {
                Ok(()) => {
                    self.remove_session_entry(&session_id);
                    if self.active.as_ref().is_some_and(|a| a.id == session_id) {
                        self.deselect_session();
                    }
                    self.flash_success("Session deleted");
                }
                Err(e) => {
                    self.flash_error(format!("Failed to delete session: {e}"));
                }
            },

            CommandResult::ApiKeySet { hint, result } => match result {
                Ok(()) => {
                    self.config.credential_hint = hint;
                    self.save_config();
                    self.api_key_input.clear();
                    self.flash_success(
                        "API key set successfully! You can now upload transaction data.",
                    );
                }
                Err(e) => {
                    self.flash_error(format!("Error setting API key: {e}"));
                }
            },

            CommandResult::Uploaded(result) => {
                self.upload_in_flight = false;
                match result {
                    Ok(resp) => {
                        let mut line = format!(
                            "Successfully uploaded! {} transactions processed",
                            resp.transaction_count
                        );
                        if !resp.csv_format.is_empty() {
                            line.push_str(&format!(" ({} format)", resp.csv_format));
                        }
                        self.upload_feedback = Some(Feedback::Success(line));
                        self.upload_path.clear();
                        if !self.sessions.contains(&resp.session_id) {
                            self.sessions.push(resp.session_id.clone());
                        }
                        self.reveal_table_on_load = true;
                        self.select_session(resp.session_id);
                    }
                    Err(e) => {
                        self.upload_feedback = Some(Feedback::Error(format!("Error: {e}")));
                    }
                }
            }
        }
    }

    fn apply_session_loaded(
        &mut self,
        session_id: String,
        token: u64,
        result: Result<(Vec<ledgerchat_api::Transaction>, Vec<ChatMessage>), String>,
    ) {
        if token != self.load_epoch {
            // A newer switch superseded this load.
            return;
        }
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.id != session_id {
            return;
        }
        match result {
            Ok((transactions, history)) => {
                let keep_visible = active.table.is_visible() || self.reveal_table_on_load;
                self.reveal_table_on_load = false;
                active.table = TableView::new(transactions);
                active.table.set_visible(keep_visible);
                active.messages = if history.is_empty() {
                    vec![ChatMessage::assistant(WELCOME_MESSAGE)]
                } else {
                    history
                };
                active.loaded = true;
                self.table_state = TableState::default();
                if let Some(query) = self.config.suggested_query.take() {
                    self.input = query;
                    self.save_config();
                }
            }
            Err(e) => {
                // The deferred reveal is spent either way; letting it leak
                // would make the next session's table start visible.
                self.reveal_table_on_load = false;
                active.loaded = true;
                active.messages.push(ChatMessage::assistant(
                    "Error loading transaction data. Please try again or contact support."
                        .to_string(),
                ));
                self.flash_error(e);
            }
        }
    }

    fn remove_session_entry(&mut self, session_id: &str) {
        self.sessions.retain(|s| s != session_id);
        match self.session_state.selected() {
            Some(_) if self.sessions.is_empty() => self.session_state.select(None),
            Some(i) if i >= self.sessions.len() => {
                self.session_state.select(Some(self.sessions.len() - 1));
            }
            _ => {}
        }
    }

    // ── Flash messages ───────────────────────────────────────────────────

    pub fn flash_success(&mut self, msg: impl Into<String>) {
        self.set_flash(FlashLevel::Success, msg.into());
    }

    pub fn flash_error(&mut self, msg: impl Into<String>) {
        self.set_flash(FlashLevel::Error, msg.into());
    }

    pub fn flash_info(&mut self, msg: impl Into<String>) {
        self.set_flash(FlashLevel::Info, msg.into());
    }

    fn set_flash(&mut self, level: FlashLevel, message: String) {
        self.flash = Some(Flash {
            level,
            message,
            at: Instant::now(),
        });
    }

    pub fn expire_flash(&mut self) {
        if let Some(flash) = &self.flash {
            if flash.at.elapsed() > Duration::from_secs(5) {
                self.flash = None;
            }
        }
    }

    fn save_config(&mut self) {
        if let Err(e) = config::save(&self.config) {
            tracing::warn!(error = %e, "failed to save config");
        }
    }

    // ── Key handling ─────────────────────────────────────────────────────

    /// Handle a key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return true,
                KeyCode::Char('t') => {
                    if let Some(active) = self.active.as_mut() {
                        active.table.toggle();
                        if !active.table.is_visible() && self.focus == Focus::Table {
                            self.focus = Focus::ChatInput;
                            self.search_editing = false;
                        }
                    }
                    return false;
                }
                _ => {}
            }
        }

        if self.modal.is_some() {
            self.handle_modal_key(key.code);
            return false;
        }

        if key.code == KeyCode::F(1) {
            self.view = if self.view == View::Help {
                if self.active.is_some() {
                    View::Chat
                } else {
                    View::Landing
                }
            } else {
                View::Help
            };
            return false;
        }

        if self.view == View::Help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                self.view = if self.active.is_some() {
                    View::Chat
                } else {
                    View::Landing
                };
            }
            return false;
        }

        match key.code {
            KeyCode::Tab => {
                self.cycle_focus(true);
                return false;
            }
            KeyCode::BackTab => {
                self.cycle_focus(false);
                return false;
            }
            _ => {}
        }

        match self.focus {
            Focus::Sessions => self.handle_sessions_key(key.code),
            Focus::Suggestions => self.handle_suggestions_key(key.code),
            Focus::UploadPath => self.handle_upload_key(key.code),
            Focus::ApiKey => self.handle_api_key_key(key.code),
            Focus::ChatInput => self.handle_chat_key(key.code),
            Focus::Table => self.handle_table_key(key.code),
        }
        false
    }

    fn handle_modal_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Some(Modal::Confirm { action, .. }) = self.modal.take() {
                    match action {
                        ConfirmAction::DeleteSession { session_id } => {
                            self.commands
                                .push_back(AsyncCommand::DeleteSession { session_id });
                        }
                    }
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.modal = None;
            }
            _ => {}
        }
    }

    fn handle_sessions_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => list_prev(&mut self.session_state),
            KeyCode::Down | KeyCode::Char('j') => {
                list_next(&mut self.session_state, self.sessions.len())
            }
            KeyCode::Enter => {
                if let Some(id) = self.selected_session_id().map(str::to_string) {
                    self.select_session(id);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => self.request_delete_selected(),
            KeyCode::Esc => {
                if self.active.is_some() {
                    self.deselect_session();
                }
            }
            _ => {}
        }
    }

    fn handle_suggestions_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => list_prev(&mut self.suggestion_state),
            KeyCode::Down | KeyCode::Char('j') => {
                list_next(&mut self.suggestion_state, self.suggestions.len())
            }
            KeyCode::Enter => self.pick_suggestion(),
            _ => {}
        }
    }

    fn handle_upload_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(c) => self.upload_path.push(c),
            KeyCode::Backspace => {
                self.upload_path.pop();
            }
            KeyCode::Enter => self.submit_upload(),
            _ => {}
        }
    }

    fn handle_api_key_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(c) => self.api_key_input.push(c),
            KeyCode::Backspace => {
                self.api_key_input.pop();
            }
            KeyCode::Enter => self.submit_api_key(),
            KeyCode::Delete => self.clear_credential_hint(),
            _ => {}
        }
    }

    fn handle_chat_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => self.submit_query(),
            KeyCode::Esc => self.deselect_session(),
            _ => {}
        }
    }

    fn handle_table_key(&mut self, code: KeyCode) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if self.search_editing {
            match code {
                KeyCode::Char(c) => active.table.push_search_char(c),
                KeyCode::Backspace => active.table.pop_search_char(),
                KeyCode::Enter | KeyCode::Esc => self.search_editing = false,
                _ => {}
            }
            return;
        }
        match code {
            KeyCode::Char('/') => self.search_editing = true,
            KeyCode::Char('s') => active.table.cycle_sort(),
            KeyCode::Char('t') => {
                active.table.toggle();
                if !active.table.is_visible() {
                    self.focus = Focus::ChatInput;
                }
            }
            KeyCode::Char('c') => active.table.clear_search(),
            KeyCode::Up | KeyCode::Char('k') => list_prev_table(&mut self.table_state),
            KeyCode::Down | KeyCode::Char('j') => {
                let rows = active.table.shown();
                list_next_table(&mut self.table_state, rows);
            }
            KeyCode::Esc => self.focus = Focus::ChatInput,
            _ => {}
        }
    }

    fn focus_ring(&self) -> Vec<Focus> {
        match self.view {
            View::Landing => vec![
                Focus::Sessions,
                Focus::Suggestions,
                Focus::UploadPath,
                Focus::ApiKey,
            ],
            View::Chat => {
                let mut ring = vec![Focus::Sessions, Focus::ChatInput];
                if self
                    .active
                    .as_ref()
                    .is_some_and(|a| a.table.is_visible())
                {
                    ring.push(Focus::Table);
                }
                ring
            }
            View::Help => vec![],
        }
    }

    fn cycle_focus(&mut self, forward: bool) {
        let ring = self.focus_ring();
        if ring.is_empty() {
            return;
        }
        let idx = ring.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (idx + 1) % ring.len()
        } else {
            (idx + ring.len() - 1) % ring.len()
        };
        self.focus = ring[next];
        self.search_editing = false;
    }
}

/// Sidebar label for a session id: `Analysis` plus the first six characters.
pub fn session_label(id: &str) -> String {
    let short: String = id.chars().take(6).collect();
    format!("Analysis {short}")
}

fn version_of(health: &HealthResponse) -> String {
    if health.api_version.is_empty() {
        "unknown".to_string()
    } else {
        health.api_version.clone()
    }
}

// ── List helpers ────────────────────────────────────────────────────────

fn list_prev(state: &mut ListState) {
    let i = state.selected().unwrap_or(0);
    state.select(Some(i.saturating_sub(1)));
}

fn list_next(state: &mut ListState, len: usize) {
    if len == 0 {
        return;
    }
    let i = state.selected().map(|i| i + 1).unwrap_or(0);
    state.select(Some(i.min(len - 1)));
}

fn list_prev_table(state: &mut TableState) {
    let i = state.selected().unwrap_or(0);
    state.select(Some(i.saturating_sub(1)));
}

fn list_next_table(state: &mut TableState, len: usize) {
    if len == 0 {
        return;
    }
    let i = state.selected().map(|i| i + 1).unwrap_or(0);
    state.select(Some(i.min(len - 1)));
}
