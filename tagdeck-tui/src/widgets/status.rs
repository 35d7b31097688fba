//! Inline badge for a query entry's status.

use crate::theme::{query_status_color, DeckTheme};
use ratatui::{
    style::{Modifier, Style},
    text::Span,
};
use tagdeck_query::{QuerySnapshot, QueryStatus};

pub struct StatusBadge {
    pub status: QueryStatus,
    pub optimistic: bool,
    pub fetching: bool,
}

impl StatusBadge {
    pub fn from_snapshot<T>(snapshot: &QuerySnapshot<T>) -> Self {
        Self {
            status: snapshot.status,
            optimistic: snapshot.optimistic,
            fetching: snapshot.fetching,
        }
    }

    pub fn label(&self) -> String {
        match (self.optimistic, self.fetching) {
            (true, _) => format!("{} (saving)", self.status.as_str()),
            (false, true) => format!("{} (fetching)", self.status.as_str()),
            (false, false) => self.status.as_str().to_string(),
        }
    }

    pub fn span(&self, theme: &DeckTheme) -> Span<'static> {
        let mut style = Style::default().fg(query_status_color(self.status, theme));
        if self.status == QueryStatus::Error {
            style = style.add_modifier(Modifier::BOLD);
        }
        Span::styled(format!("[{}]", self.label()), style)
    }
}
