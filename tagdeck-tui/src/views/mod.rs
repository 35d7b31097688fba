//! Screen layout and rendering.

pub mod detail;
pub mod form;
pub mod list;

use crate::keys::HELP;
use crate::notifications::NotificationLevel;
use crate::state::App;
use crate::widgets::StatusBadge;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub fn render_view(f: &mut Frame<'_>, app: &mut App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(layout[1]);
    list::render(f, app, body[0]);
    detail::render(f, app, body[1]);

    render_footer(f, app, layout[2]);

    if let Some(tag_form) = &app.form {
        form::render(f, tag_form, &app.theme, centered(f.size(), 50, 8));
    } else if app.help_visible {
        render_help(f, app, centered(f.size(), 40, HELP.len() as u16 + 2));
    }
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let snapshot = app.tags_snapshot();
    let mut spans = vec![
        Span::styled(
            " TagDeck ",
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("| list "),
        StatusBadge::from_snapshot(&snapshot).span(&app.theme),
    ];
    if app.pending_writes > 0 {
        spans.push(Span::styled(
            format!(" | {} pending", app.pending_writes),
            Style::default().fg(app.theme.warning),
        ));
    }
    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(header, area);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let (text, style) = if let Some(note) = app.notifications.latest() {
        let label = match note.level {
            NotificationLevel::Info => "INFO",
            NotificationLevel::Warning => "WARN",
            NotificationLevel::Error => "ERROR",
            NotificationLevel::Success => "OK",
        };
        let color = match note.level {
            NotificationLevel::Info => app.theme.info,
            NotificationLevel::Warning => app.theme.warning,
            NotificationLevel::Error => app.theme.error,
            NotificationLevel::Success => app.theme.success,
        };
        (
            format!("{} {}: {}", note.created_at.format("%H:%M:%S"), label, note.message),
            Style::default().fg(color),
        )
    } else {
        (help_line(), Style::default().fg(app.theme.text_dim))
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(footer, area);
}

fn help_line() -> String {
    HELP.iter()
        .map(|(key, what)| format!("{key} {what}"))
        .collect::<Vec<_>>()
        .join(" • ")
}

fn render_help(f: &mut Frame<'_>, app: &App, area: Rect) {
    let lines: Vec<Line> = HELP
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{key:<8}"), Style::default().fg(app.theme.primary)),
                Span::raw(*what),
            ])
        })
        .collect();
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title("Keys")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border_focus)),
        ),
        area,
    );
}

/// A `width` x `height` rectangle centered in `area`, shrunk to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 30, 6);
        let rect = centered(area, 50, 9);
        assert_eq!(rect, Rect::new(0, 0, 30, 6));

        let rect = centered(Rect::new(10, 10, 100, 40), 50, 10);
        assert_eq!(rect, Rect::new(35, 25, 50, 10));
    }
}
