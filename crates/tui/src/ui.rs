use crate::app::{App, Flash, FlashLevel, Focus, View};
use crate::theme::Theme;
use crate::views::{chat, help, landing, modal, session_list, transactions};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub fn render(frame: &mut Frame, app: &mut App) {
    let [body_area, footer_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());

    let [sidebar_area, main_area] =
        Layout::horizontal([Constraint::Length(32), Constraint::Fill(1)]).areas(body_area);

    session_list::render(frame, app, sidebar_area);

    match app.view {
        View::Landing => landing::render(frame, app, main_area),
        View::Chat => render_chat(frame, app, main_area),
        View::Help => {} // rendered as overlay below
    }

    render_footer(frame, app, footer_area);

    // Help overlay
    if app.view == View::Help {
        help::render(frame, frame.area());
    }

    // Modal overlay
    if let Some(ref m) = app.modal {
        modal::render(frame, m);
    }
}

fn render_chat(frame: &mut Frame, app: &mut App, area: Rect) {
    let table_visible = app
        .active
        .as_ref()
        .is_some_and(|a| a.table.is_visible() && a.loaded);

    if table_visible {
        let [chat_area, table_area] =
            Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)])
                .areas(area);
        chat::render(frame, app, chat_area);
        transactions::render(frame, app, table_area);
    } else {
        chat::render(frame, app, area);
    }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(Flash { level, message, .. }) = &app.flash {
        let color = match level {
            FlashLevel::Info => Theme::ACCENT_BLUE,
            FlashLevel::Success => Theme::ACCENT_GREEN,
            FlashLevel::Error => Theme::ACCENT_RED,
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {message}"),
                Style::new().fg(color),
            ))),
            area,
        );
        return;
    }

    let key_style = Style::new().fg(Theme::TEXT_KEY);
    let desc_style = Style::new().fg(Theme::TEXT_KEY_DESC);
    let hint = |key: &str, desc: &str| {
        vec![
            Span::styled(format!(" {key} "), key_style),
            Span::styled(format!("{desc} "), desc_style),
        ]
    };

    let mut spans: Vec<Span> = Vec::new();
    match app.focus {
        Focus::Sessions => {
            spans.extend(hint("j/k", "navigate"));
            spans.extend(hint("Enter", "open"));
            spans.extend(hint("d", "delete"));
        }
        Focus::Suggestions => {
            spans.extend(hint("j/k", "navigate"));
            spans.extend(hint("Enter", "use for next session"));
        }
        Focus::UploadPath => {
            spans.extend(hint("Enter", "upload"));
        }
        Focus::ApiKey => {
            spans.extend(hint("Enter", "set key"));
            spans.extend(hint("Del", "clear stored hint"));
        }
        Focus::ChatInput => {
            spans.extend(hint("Enter", "send"));
            if let Some(active) = app.active.as_ref() {
                spans.extend(hint("Ctrl+T", active.table.toggle_label()));
            }
        }
        Focus::Table => {
            spans.extend(hint("/", "search"));
            spans.extend(hint("s", "sort"));
            spans.extend(hint("t", "hide"));
        }
    }
    spans.extend(hint("Tab", "focus"));
    spans.extend(hint("F1", "help"));
    spans.extend(hint("Ctrl+C", "quit"));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
