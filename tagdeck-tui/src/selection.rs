//! The active tag cursor.

use std::sync::Arc;
use tagdeck_core::TagId;
use tokio::sync::watch;

/// Single-slot stream of selected tag ids.
///
/// Clearing a selection is ignored: subscribers only ever see present ids,
/// so whatever depends on the selection keeps its last value.
#[derive(Debug, Clone)]
pub struct SelectionStream {
    tx: Arc<watch::Sender<Option<TagId>>>,
}

impl Default for SelectionStream {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStream {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Publish `id`. Returns whether subscribers were notified; `None` and a
    /// repeat of the current id are dropped.
    pub fn publish(&self, id: Option<TagId>) -> bool {
        let Some(id) = id else {
            return false;
        };
        self.tx.send_if_modified(|current| {
            if current.as_ref() == Some(&id) {
                false
            } else {
                *current = Some(id);
                true
            }
        })
    }

    pub fn current(&self) -> Option<TagId> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<TagId>> {
        self.tx.subscribe()
    }
}
