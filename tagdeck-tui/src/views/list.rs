//! Tag list pane.

use crate::state::App;
use crate::theme::tag_color;
use crate::widgets::StatusBadge;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use tagdeck_core::RowKey;

pub fn render(f: &mut Frame<'_>, app: &mut App, area: Rect) {
    let snapshot = app.tags_snapshot();
    let tags = snapshot.data.clone().unwrap_or_default();
    app.cursor.clamp(tags.len());

    let title = Line::from(vec![
        Span::raw(format!(" Tags ({}) ", tags.len())),
        StatusBadge::from_snapshot(&snapshot).span(&app.theme),
    ]);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_focus));

    if tags.is_empty() {
        let message = match (&snapshot.data, snapshot.error_message()) {
            (_, Some(error)) => Span::styled(error, Style::default().fg(app.theme.error)),
            (None, None) => Span::styled("Loading tags…", Style::default().fg(app.theme.text_dim)),
            (Some(_), None) => Span::styled(
                "No tags yet. Press n to create one.",
                Style::default().fg(app.theme.text_dim),
            ),
        };
        f.render_widget(Paragraph::new(message).block(block), area);
        return;
    }

    let selected = app.selected_id();
    let items: Vec<ListItem> = tags
        .iter()
        .enumerate()
        .map(|(index, tag)| {
            let marker = if tag.id.is_some() && tag.id == selected { "▸ " } else { "  " };
            let ident = match tag.row_key(index) {
                RowKey::Id(id) => Span::styled(
                    format!(" #{id}"),
                    Style::default().fg(app.theme.text_muted),
                ),
                RowKey::Position(_) => Span::styled(
                    " (saving)",
                    Style::default()
                        .fg(app.theme.warning)
                        .add_modifier(Modifier::ITALIC),
                ),
            };
            ListItem::new(Line::from(vec![
                Span::raw(marker),
                Span::styled("■ ", Style::default().fg(tag_color(tag, &app.theme))),
                Span::styled(tag.name.clone(), Style::default().fg(app.theme.text)),
                ident,
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(app.theme.bg_highlight)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = ListState::default().with_selected(app.cursor.index);
    f.render_stateful_widget(list, area, &mut state);
}
