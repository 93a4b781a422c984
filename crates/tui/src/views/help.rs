use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph};

pub fn render(frame: &mut Frame, area: Rect) {
    // Center the help overlay
    let popup_width = 60u16.min(area.width.saturating_sub(4));
    let popup_height = 26u16.min(area.height.saturating_sub(4));
    let x = (area.width.saturating_sub(popup_width)) / 2;
    let y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let block = Theme::block_accent()
        .title(" Keyboard Shortcuts ")
        .padding(Theme::PADDING_CARD);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::new().fg(Theme::ACCENT_YELLOW).bold();
    let desc_style = Style::new().fg(Theme::TEXT_CONTENT);
    let header_style = Style::new().fg(Theme::ACCENT_BLUE).bold();

    let entry = |key: &str, desc: &str| {
        Line::from(vec![
            Span::styled(format!("  {key:<10}"), key_style),
            Span::styled(desc.to_string(), desc_style),
        ])
    };

    let lines = vec![
        Line::from(Span::styled("── Global ──", header_style)),
        entry("Tab", "Cycle focus between panes"),
        entry("F1", "Toggle this help"),
        entry("Ctrl+C", "Quit"),
        Line::raw(""),
        Line::from(Span::styled("── Sessions ──", header_style)),
        entry("j/k", "Navigate up/down"),
        entry("Enter", "Open session"),
        entry("d", "Delete session"),
        entry("Esc", "Back to the landing view"),
        Line::raw(""),
        Line::from(Span::styled("── Chat ──", header_style)),
        entry("Enter", "Send question"),
        entry("Ctrl+T", "Show/hide transactions"),
        Line::raw(""),
        Line::from(Span::styled("── Transactions ──", header_style)),
        entry("/", "Filter by description"),
        entry("s", "Cycle sort order"),
        entry("c", "Clear filter"),
        entry("t", "Hide the table"),
        Line::raw(""),
        Line::from(Span::styled(
            "Press Esc or F1 to close",
            Style::new().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}
