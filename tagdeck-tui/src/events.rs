//! Event types for the TUI event loop.

use crate::controller::{ControllerError, MutationKind};
use crossterm::event::KeyEvent;
use tagdeck_core::Tag;

#[derive(Debug, Clone)]
pub enum TuiEvent {
    Input(KeyEvent),
    Tick,
    Resize { width: u16, height: u16 },
    FocusGained,
    /// A background write settled.
    MutationSettled {
        kind: MutationKind,
        result: Result<Tag, ControllerError>,
    },
    /// A background read failed; the message is shown to the user.
    QueryFailed(String),
}
