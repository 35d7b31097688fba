//! Keybinding definitions for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    First,
    Last,
    Select,
    NewItem,
    EditItem,
    DeleteItem,
    OpenHelp,
    Refresh,
    Cancel,
}

/// Map a key press in the list view to an action. Keys typed into the form
/// never go through here.
pub fn map_key(event: KeyEvent) -> Option<Action> {
    let KeyEvent { code, modifiers, .. } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        };
    }

    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => Some(Action::OpenHelp),
        KeyCode::Char('n') => Some(Action::NewItem),
        KeyCode::Char('e') => Some(Action::EditItem),
        KeyCode::Char('d') | KeyCode::Delete => Some(Action::DeleteItem),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Select),
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        KeyCode::Home | KeyCode::Char('g') => Some(Action::First),
        KeyCode::End | KeyCode::Char('G') => Some(Action::Last),
        _ => None,
    }
}

/// Help text shown in the footer, in display order.
pub const HELP: &[(&str, &str)] = &[
    ("j/k", "move"),
    ("enter", "select"),
    ("n", "new"),
    ("e", "edit"),
    ("d", "delete"),
    ("ctrl-r", "refresh"),
    ("?", "help"),
    ("q", "quit"),
];
