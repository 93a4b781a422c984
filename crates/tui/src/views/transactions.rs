use crate::app::{App, Focus};
use crate::table::{Column, Tone};
use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Cell, Paragraph, Row, Table};

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(active) = app.active.as_ref() else {
        return;
    };
    let focused = app.focus == Focus::Table;

    let title = format!(
        " Transactions — {} — sort: {} ",
        active.table.info_line(),
        active.table.sort().label()
    );
    let block = Theme::block_for(focused).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [search_area, table_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);

    render_search(frame, app, search_area);

    let Some(active) = app.active.as_ref() else {
        return;
    };
    let columns = active.table.columns().to_vec();

    let header = Row::new(
        columns
            .iter()
            .map(|c| Cell::from(c.title()).style(Style::new().fg(Theme::TEXT_SECONDARY).bold())),
    );

    let rows: Vec<Row> = active
        .table
        .rows()
        .into_iter()
        .map(|row| {
            Row::new(row.cells.into_iter().map(|cell| {
                let style = match cell.tone {
                    Tone::Positive => Style::new().fg(Theme::AMOUNT_POSITIVE),
                    Tone::Negative => Style::new().fg(Theme::AMOUNT_NEGATIVE),
                    Tone::Neutral => Style::new().fg(Theme::TEXT_CONTENT),
                };
                Cell::from(cell.text).style(style)
            }))
        })
        .collect();

    let widths: Vec<Constraint> = columns
        .iter()
        .map(|c| match c {
            Column::Description => Constraint::Fill(1),
            Column::Date => Constraint::Length(12),
            _ => Constraint::Length(12),
        })
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .row_highlight_style(
            Style::new()
                .fg(Theme::TEXT_PRIMARY)
                .bg(Theme::BORDER_NORMAL),
        );
    frame.render_stateful_widget(table, table_area, &mut app.table_state);
}

fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    let Some(active) = app.active.as_ref() else {
        return;
    };
    let term = active.table.search();

    let line = if app.search_editing {
        Line::from(vec![
            Span::styled(" /", Style::new().fg(Theme::ACCENT_BLUE).bold()),
            Span::styled(term.to_string(), Style::new().fg(Theme::TEXT_PRIMARY)),
            Span::styled("▏", Style::new().fg(Theme::ACCENT_BLUE)),
        ])
    } else if term.is_empty() {
        Line::from(Span::styled(
            " / search  s sort  t hide  c clear",
            Style::new().fg(Theme::TEXT_HINT),
        ))
    } else {
        Line::from(vec![
            Span::styled(" filter: ", Style::new().fg(Theme::TEXT_SECONDARY)),
            Span::styled(term.to_string(), Style::new().fg(Theme::ACCENT_YELLOW)),
        ])
    };
    frame.render_widget(Paragraph::new(line), area);
}
