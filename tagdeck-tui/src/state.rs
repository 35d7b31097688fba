//! Application state.
//!
//! `App` is synchronous: input produces [`Command`]s, and the event loop runs
//! them in the background and feeds the results back as events.

use crate::config::TuiConfig;
use crate::controller::{keys, ControllerError, MutationKind, TagController};
use crate::form::{FormOutcome, TagForm};
use crate::keys::{map_key, Action};
use crate::notifications::{Notification, NotificationLevel, NotificationLog};
use crate::persistence::PersistedState;
use crate::theme::DeckTheme;
use chrono::{DateTime, Utc};
use crossterm::event::KeyEvent;
use tagdeck_core::{Tag, TagId};
use tagdeck_query::{QuerySnapshot, QueryStatus};
use tokio::sync::watch;
use tracing::debug;

/// Background work requested by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LoadTags,
    RefreshTags,
    LoadCurrent,
    Mutate { kind: MutationKind, tag: Tag },
}

/// Cursor over the rendered tag list.
#[derive(Debug, Clone, Default)]
pub struct ListCursor {
    pub index: Option<usize>,
}

impl ListCursor {
    pub fn clamp(&mut self, len: usize) {
        self.index = match (self.index, len) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(i), len) => Some(i.min(len - 1)),
        };
    }

    pub fn move_by(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.index = None;
            return;
        }
        let current = self.index.unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.index = Some(next as usize);
    }

    pub fn first(&mut self, len: usize) {
        self.index = (len > 0).then_some(0);
    }

    pub fn last(&mut self, len: usize) {
        self.index = len.checked_sub(1);
    }
}

pub struct App {
    pub config: TuiConfig,
    pub theme: DeckTheme,
    pub controller: TagController,
    pub cursor: ListCursor,
    pub form: Option<TagForm>,
    pub notifications: NotificationLog,
    pub help_visible: bool,
    pub pending_writes: usize,
    pub should_quit: bool,
    // Held so the entries the screen shows are never evicted.
    _list_rx: Option<watch::Receiver<QuerySnapshot<Vec<Tag>>>>,
    _item_rx: Option<watch::Receiver<QuerySnapshot<Tag>>>,
}

impl App {
    pub fn new(config: TuiConfig, controller: TagController) -> Self {
        let theme = DeckTheme::from_name(&config.theme.name);
        let list_rx = controller.queries().subscribe(&keys::TAG_LIST).ok();
        let item_rx = controller.queries().subscribe(&keys::TAG).ok();
        Self {
            config,
            theme,
            controller,
            cursor: ListCursor::default(),
            form: None,
            notifications: NotificationLog::default(),
            help_visible: false,
            pending_writes: 0,
            should_quit: false,
            _list_rx: list_rx,
            _item_rx: item_rx,
        }
    }

    /// Commands to run once the UI is up.
    pub fn startup(&mut self, restored: Option<PersistedState>) -> Vec<Command> {
        let mut commands = vec![Command::LoadTags];
        if let Some(id) = restored.and_then(|state| state.selected_tag_id) {
            self.controller.select(Some(id));
            commands.push(Command::LoadCurrent);
        }
        commands
    }

    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            selected_tag_id: self.controller.selection().current(),
        }
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
    }

    pub fn tags_snapshot(&self) -> QuerySnapshot<Vec<Tag>> {
        self.controller.tags_snapshot()
    }

    pub fn current_snapshot(&self) -> QuerySnapshot<Tag> {
        self.controller.current_snapshot()
    }

    pub fn visible_tags(&self) -> Vec<Tag> {
        self.tags_snapshot().data.unwrap_or_default()
    }

    pub fn selected_id(&self) -> Option<TagId> {
        self.controller.selection().current()
    }

    /// The tag under the cursor, after clamping the cursor to the list.
    pub fn tag_under_cursor(&mut self) -> Option<Tag> {
        let tags = self.visible_tags();
        self.cursor.clamp(tags.len());
        self.cursor.index.and_then(|i| tags.get(i).cloned())
    }

    pub fn handle_key(&mut self, event: KeyEvent) -> Option<Command> {
        if let Some(form) = self.form.as_mut() {
            return match form.handle_key(event) {
                FormOutcome::Editing => None,
                FormOutcome::Cancelled => {
                    self.form = None;
                    None
                }
                FormOutcome::Submitted(tag) => {
                    let kind = form.kind();
                    self.form = None;
                    Some(self.begin_write(kind, tag))
                }
            };
        }
        map_key(event).and_then(|action| self.handle_action(action))
    }

    pub fn handle_action(&mut self, action: Action) -> Option<Command> {
        if self.help_visible && matches!(action, Action::Cancel | Action::OpenHelp) {
            self.help_visible = false;
            return None;
        }
        let len = self.visible_tags().len();
        match action {
            Action::Quit => {
                self.should_quit = true;
                None
            }
            Action::MoveUp => {
                self.cursor.move_by(-1, len);
                None
            }
            Action::MoveDown => {
                self.cursor.move_by(1, len);
                None
            }
            Action::First => {
                self.cursor.first(len);
                None
            }
            Action::Last => {
                self.cursor.last(len);
                None
            }
            Action::Select => {
                let tag = self.tag_under_cursor()?;
                match tag.id {
                    Some(id) => {
                        self.controller.select(Some(id));
                        Some(Command::LoadCurrent)
                    }
                    None => {
                        self.notify(NotificationLevel::Warning, "Tag is still being created");
                        None
                    }
                }
            }
            Action::NewItem => {
                self.form = Some(TagForm::create());
                None
            }
            Action::EditItem => {
                let tag = self.tag_under_cursor()?;
                match TagForm::edit(&tag) {
                    Some(form) => self.form = Some(form),
                    None => self.notify(NotificationLevel::Warning, "Tag is still being created"),
                }
                None
            }
            Action::DeleteItem => {
                let tag = self.tag_under_cursor()?;
                if tag.is_persisted() {
                    Some(self.begin_write(MutationKind::Delete, tag))
                } else {
                    self.notify(NotificationLevel::Warning, "Tag is still being created");
                    None
                }
            }
            Action::OpenHelp => {
                self.help_visible = true;
                None
            }
            Action::Refresh => Some(Command::RefreshTags),
            Action::Cancel => None,
        }
    }

    fn begin_write(&mut self, kind: MutationKind, tag: Tag) -> Command {
        self.pending_writes += 1;
        debug!(kind = kind.as_str(), name = %tag.name, "write queued");
        Command::Mutate { kind, tag }
    }

    pub fn on_mutation_settled(&mut self, kind: MutationKind, result: Result<Tag, ControllerError>) {
        self.pending_writes = self.pending_writes.saturating_sub(1);
        match result {
            Ok(tag) => {
                self.notify(
                    NotificationLevel::Success,
                    format!("Tag '{}' {}", tag.name, kind.past_tense()),
                );
            }
            Err(err) => {
                self.notify(
                    NotificationLevel::Error,
                    format!("Failed to {} tag: {}", kind.as_str(), err),
                );
            }
        }
        let len = self.visible_tags().len();
        self.cursor.clamp(len);
    }

    pub fn on_query_failed(&mut self, message: String) {
        self.notify(NotificationLevel::Error, message);
    }

    /// Window regained focus; refetch when the list opted into it.
    pub fn on_focus_gained(&mut self) -> Option<Command> {
        (self.controller.queries().window_focused() > 0).then_some(Command::LoadTags)
    }

    /// Sweep the cache and refetch the list once it has gone stale.
    pub fn on_tick(&mut self, now: DateTime<Utc>) -> Option<Command> {
        let report = self.controller.queries().sweep(now);
        if report.evicted > 0 {
            debug!(evicted = report.evicted, "cache sweep");
        }
        let len = self.visible_tags().len();
        self.cursor.clamp(len);
        let list = self.controller.tags_snapshot();
        (list.status == QueryStatus::Stale && !list.fetching).then_some(Command::LoadTags)
    }
}
