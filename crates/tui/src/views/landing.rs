use crate::app::{App, Feedback, Focus, ServerStatus};
use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, Paragraph};

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let [status_area, suggestions_area, upload_area, key_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(5),
        Constraint::Length(5),
    ])
    .areas(area);

    render_status(frame, app, status_area);
    render_suggestions(frame, app, suggestions_area);
    render_upload(frame, app, upload_area);
    render_api_key(frame, app, key_area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let block = Theme::block_dim();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let status_span = match &app.server_status {
        ServerStatus::Unknown => Span::styled(
            "Checking server...",
            Style::new().fg(Theme::ACCENT_YELLOW).italic(),
        ),
        ServerStatus::Online(version) => Span::styled(
            format!("● Online (v{version})"),
            Style::new().fg(Theme::ACCENT_GREEN),
        ),
        ServerStatus::Offline => Span::styled(
            "● Offline. Please ensure the backend is running.",
            Style::new().fg(Theme::ACCENT_RED),
        ),
    };

    let line = Line::from(vec![
        Span::styled(" ledgerchat ", Style::new().fg(Theme::ACCENT_BLUE).bold()),
        Span::styled(
            format!(" {} ", app.config.server.url),
            Style::new().fg(Theme::TEXT_SECONDARY),
        ),
        Span::raw("  "),
        status_span,
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

fn render_suggestions(frame: &mut Frame, app: &mut App, area: Rect) {
    let focused = app.focus == Focus::Suggestions;
    let block = Theme::block_for(focused).title(" Suggested Questions ");

    if app.suggestions.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new("No suggestions available.")
                .style(Style::new().fg(Theme::TEXT_MUTED)),
            inner,
        );
        return;
    }

    let items: Vec<ListItem> = app
        .suggestions
        .iter()
        .map(|s| {
            ListItem::new(Line::from(Span::styled(
                format!("  {s}"),
                Style::new().fg(Theme::TEXT_CONTENT),
            )))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::new()
            .fg(Theme::TEXT_PRIMARY)
            .bg(Theme::BORDER_NORMAL),
    );
    frame.render_stateful_widget(list, area, &mut app.suggestion_state);
}

fn render_upload(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::UploadPath;
    let block = Theme::block_for(focused)
        .title(" Upload CSV ")
        .padding(Theme::PADDING_COMPACT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let input_line = if app.upload_path.is_empty() && !focused {
        Line::from(Span::styled(
            "Path to a CSV file, then Enter",
            Style::new().fg(Theme::TEXT_HINT),
        ))
    } else {
        let cursor = if focused { "▏" } else { "" };
        Line::from(vec![
            Span::styled(&app.upload_path, Style::new().fg(Theme::TEXT_PRIMARY)),
            Span::styled(cursor, Style::new().fg(Theme::ACCENT_BLUE)),
        ])
    };

    let feedback_line = match &app.upload_feedback {
        Some(Feedback::Info(msg)) => Line::from(Span::styled(
            msg.clone(),
            Style::new().fg(Theme::ACCENT_YELLOW).italic(),
        )),
        Some(Feedback::Success(msg)) => {
            Line::from(Span::styled(msg.clone(), Style::new().fg(Theme::ACCENT_GREEN)))
        }
        Some(Feedback::Error(msg)) => {
            Line::from(Span::styled(msg.clone(), Style::new().fg(Theme::ACCENT_RED)))
        }
        None => Line::raw(""),
    };

    frame.render_widget(Paragraph::new(vec![input_line, feedback_line]), inner);
}

fn render_api_key(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::ApiKey;
    let block = Theme::block_for(focused)
        .title(" OpenAI API Key ")
        .padding(Theme::PADDING_COMPACT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Never echo the key itself.
    let input_line = if app.api_key_input.is_empty() && !focused {
        Line::from(Span::styled(
            "Paste your key, then Enter",
            Style::new().fg(Theme::TEXT_HINT),
        ))
    } else {
        let masked = "•".repeat(app.api_key_input.chars().count());
        let cursor = if focused { "▏" } else { "" };
        Line::from(vec![
            Span::styled(masked, Style::new().fg(Theme::TEXT_PRIMARY)),
            Span::styled(cursor, Style::new().fg(Theme::ACCENT_BLUE)),
        ])
    };

    let hint_line = if app.config.credential_hint.is_empty() {
        Line::from(Span::styled(
            "No key set",
            Style::new().fg(Theme::TEXT_MUTED),
        ))
    } else {
        Line::from(vec![
            Span::styled("Current key: ", Style::new().fg(Theme::TEXT_SECONDARY)),
            Span::styled(
                app.config.credential_hint.clone(),
                Style::new().fg(Theme::ACCENT_GREEN),
            ),
            Span::styled("  (Del clears)", Style::new().fg(Theme::TEXT_HINT)),
        ])
    };

    frame.render_widget(Paragraph::new(vec![input_line, hint_line]), inner);
}
