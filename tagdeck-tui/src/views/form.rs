//! Create/edit form modal.

use crate::form::{FormField, TagForm};
use crate::theme::DeckTheme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame<'_>, form: &TagForm, theme: &DeckTheme, area: Rect) {
    let field = |label: &'static str, value: &str, which: FormField| {
        let focused = form.focus == which;
        let label_style = if focused {
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_dim)
        };
        let cursor = if focused { "▏" } else { "" };
        Line::from(vec![
            Span::styled(format!("{label:<7}"), label_style),
            Span::styled(format!("{value}{cursor}"), Style::default().fg(theme.text)),
        ])
    };

    let mut lines = vec![
        field("name", &form.name, FormField::Name),
        field("color", &form.color, FormField::Color),
        Line::default(),
    ];
    match &form.error {
        Some(error) => lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(theme.error),
        ))),
        None => lines.push(Line::from(Span::styled(
            "tab switch field • enter save • esc cancel",
            Style::default().fg(theme.text_muted),
        ))),
    }

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(form.title())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border_focus)),
        ),
        area,
    );
}
