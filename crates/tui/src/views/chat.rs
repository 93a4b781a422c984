use crate::app::{App, Focus};
use crate::theme::Theme;
use ledgerchat_api::Role;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let [messages_area, input_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]).areas(area);

    render_messages(frame, app, messages_area);
    render_input(frame, app, input_area);
}

fn render_messages(frame: &mut Frame, app: &App, area: Rect) {
    let Some(active) = app.active.as_ref() else {
        return;
    };

    let block = Theme::block().title(format!(" {} ", crate::app::session_label(&active.id)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width.saturating_sub(2).max(10) as usize;
    let mut lines: Vec<Line> = Vec::new();

    if !active.loaded {
        lines.push(Line::from(Span::styled(
            " Loading session...",
            Style::new().fg(Theme::ACCENT_YELLOW).italic(),
        )));
    }

    for msg in &active.messages {
        let (label, color) = match msg.role {
            Role::User => ("You", Theme::ROLE_USER),
            Role::Assistant => ("Assistant", Theme::ROLE_ASSISTANT),
        };
        lines.push(Line::from(Span::styled(
            format!(" {label}"),
            Style::new().fg(color).bold(),
        )));
        for wrapped in wrap(&msg.content, width) {
            lines.push(Line::from(Span::styled(
                format!(" {wrapped}"),
                Style::new().fg(Theme::TEXT_CONTENT),
            )));
        }
        lines.push(Line::raw(""));
    }

    if app.analysis_pending_for_active() {
        lines.push(Line::from(Span::styled(
            " Assistant",
            Style::new().fg(Theme::ROLE_ASSISTANT).bold(),
        )));
        lines.push(Line::from(Span::styled(
            " ● ● ●",
            Style::new().fg(Theme::TEXT_MUTED).italic(),
        )));
    }

    // Keep the newest messages in view.
    let scroll = lines.len().saturating_sub(inner.height as usize) as u16;
    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::ChatInput;
    let pending = app.analysis_pending_for_active();
    let title = if pending {
        " Waiting for response... "
    } else {
        " Ask about your transactions "
    };
    let block = Theme::block_for(focused && !pending).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line = if app.input.is_empty() && !focused {
        Line::from(Span::styled(
            "Type a question, then Enter",
            Style::new().fg(Theme::TEXT_HINT),
        ))
    } else {
        let cursor = if focused && !pending { "▏" } else { "" };
        Line::from(vec![
            Span::styled(&app.input, Style::new().fg(Theme::TEXT_PRIMARY)),
            Span::styled(cursor, Style::new().fg(Theme::ACCENT_BLUE)),
        ])
    };
    frame.render_widget(Paragraph::new(line), inner);
}

/// Greedy word wrap by display width. Words wider than the limit are split
/// mid-word so nothing is truncated.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for raw_line in text.lines() {
        if raw_line.is_empty() {
            out.push(String::new());
            continue;
        }
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            let sep = usize::from(!current.is_empty());
            if current.width() + sep + word.width() <= width {
                if sep == 1 {
                    current.push(' ');
                }
                current.push_str(word);
            } else {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
                if word.width() <= width {
                    current.push_str(word);
                } else {
                    // Hard-split an overlong word.
                    for c in word.chars() {
                        let c_width = c.to_string().width();
                        if current.width() + c_width > width {
                            out.push(std::mem::take(&mut current));
                        }
                        current.push(c);
                    }
                }
            }
        }
        if !current.is_empty() {
            out.push(current);
        }
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}
