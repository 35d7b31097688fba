//! Detail pane for the selected tag.

use crate::state::App;
use crate::theme::tag_color;
use crate::widgets::{DetailPanel, StatusBadge};
use chrono::Utc;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let snapshot = app.current_snapshot();
    let theme = &app.theme;
    let title = Line::from(vec![
        Span::raw(" Selected "),
        StatusBadge::from_snapshot(&snapshot).span(theme),
    ]);
    let mut panel = DetailPanel::new(title)
        .label_style(Style::default().fg(theme.primary))
        .border_style(Style::default().fg(theme.border));

    match &snapshot.data {
        Some(tag) => {
            let id = tag
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            let swatch = match tag.rgb() {
                Ok(rgb) => Span::styled(
                    format!("■■■ #{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b),
                    Style::default().fg(tag_color(tag, theme)),
                ),
                Err(err) => Span::styled(err.to_string(), Style::default().fg(theme.text_muted)),
            };
            panel = panel
                .field("id", id)
                .field("name", tag.name.clone())
                .field("color", tag.color.clone())
                .field("swatch", swatch);
            if snapshot.arg.as_deref() != tag.id.as_ref().map(|id| id.as_str()) {
                panel = panel.footer_line(Span::styled(
                    "showing previous tag while loading",
                    Style::default().fg(theme.text_dim),
                ));
            }
        }
        None if app.selected_id().is_some() => {
            panel = panel.field("status", "loading…");
        }
        None => {
            panel = panel.field("status", "press enter on a tag to select it");
        }
    }

    if let Some(age) = snapshot.staleness(Utc::now()) {
        panel = panel.field("fetched", format!("{}s ago", age.as_secs()));
    }
    if let Some(error) = snapshot.error_message() {
        panel = panel.footer_line(Span::styled(error, Style::default().fg(theme.error)));
    }

    panel.render(f, area);
}
