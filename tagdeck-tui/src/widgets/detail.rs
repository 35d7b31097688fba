//! Detail panel widget for showing field/value pairs.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub struct DetailPanel<'a> {
    pub title: Line<'a>,
    pub fields: Vec<(&'a str, Span<'a>)>,
    pub label_style: Style,
    pub border_style: Style,
    /// Extra lines below the fields, such as an error message.
    pub footer: Vec<Line<'a>>,
}

impl<'a> DetailPanel<'a> {
    pub fn new(title: impl Into<Line<'a>>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
            label_style: Style::default(),
            border_style: Style::default(),
            footer: Vec::new(),
        }
    }

    pub fn field(mut self, label: &'a str, value: impl Into<Span<'a>>) -> Self {
        self.fields.push((label, value.into()));
        self
    }

    pub fn label_style(mut self, style: Style) -> Self {
        self.label_style = style;
        self
    }

    pub fn border_style(mut self, style: Style) -> Self {
        self.border_style = style;
        self
    }

    pub fn footer_line(mut self, line: impl Into<Line<'a>>) -> Self {
        self.footer.push(line.into());
        self
    }

    pub fn render(self, f: &mut Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = self
            .fields
            .into_iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(format!("{:<8}", format!("{}:", label)), self.label_style),
                    value,
                ])
            })
            .collect();
        if !self.footer.is_empty() {
            lines.push(Line::default());
            lines.extend(self.footer);
        }

        let widget = Paragraph::new(Text::from(lines))
            .block(
                Block::default()
                    .title(self.title)
                    .borders(Borders::ALL)
                    .border_style(self.border_style),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(widget, area);
    }
}
