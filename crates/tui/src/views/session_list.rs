use crate::app::{session_label, App, Focus};
use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, Paragraph};

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let focused = app.focus == Focus::Sessions;
    let block = Theme::block_for(focused).title(" Sessions ");

    if app.sessions.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new("No sessions yet.\nUpload a CSV to start one.")
                .style(Style::new().fg(Theme::TEXT_MUTED)),
            inner,
        );
        return;
    }

    let active_id = app.active.as_ref().map(|a| a.id.clone());
    let items: Vec<ListItem> = app
        .sessions
        .iter()
        .map(|id| {
            let is_active = active_id.as_deref() == Some(id.as_str());
            let style = if is_active {
                Style::new().fg(Theme::ACCENT_BLUE).bold()
            } else {
                Style::new().fg(Theme::TEXT_CONTENT)
            };
            let marker = if is_active { "● " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(marker, style),
                Span::styled(session_label(id), style),
            ]))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::new()
            .fg(Theme::TEXT_PRIMARY)
            .bg(Theme::BORDER_NORMAL),
    );
    frame.render_stateful_widget(list, area, &mut app.session_state);
}
