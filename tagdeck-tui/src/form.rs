//! Create/edit form for a single tag.

use crate::controller::MutationKind;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tagdeck_core::{Tag, TagId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(TagId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Color,
}

impl FormField {
    fn toggle(self) -> Self {
        match self {
            Self::Name => Self::Color,
            Self::Color => Self::Name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Editing,
    Submitted(Tag),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct TagForm {
    pub mode: FormMode,
    pub name: String,
    pub color: String,
    pub focus: FormField,
    pub error: Option<String>,
}

impl TagForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            name: String::new(),
            color: String::new(),
            focus: FormField::Name,
            error: None,
        }
    }

    /// Edit form prefilled from `tag`; `None` for tags the server has not
    /// assigned an id yet.
    pub fn edit(tag: &Tag) -> Option<Self> {
        let id = tag.id.clone()?;
        Some(Self {
            mode: FormMode::Edit(id),
            name: tag.name.clone(),
            color: tag.color.clone(),
            focus: FormField::Name,
            error: None,
        })
    }

    pub fn kind(&self) -> MutationKind {
        match self.mode {
            FormMode::Create => MutationKind::Create,
            FormMode::Edit(_) => MutationKind::Update,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "New tag",
            FormMode::Edit(_) => "Edit tag",
        }
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Name => &mut self.name,
            FormField::Color => &mut self.color,
        }
    }

    pub fn handle_key(&mut self, event: KeyEvent) -> FormOutcome {
        let KeyEvent { code, modifiers, .. } = event;
        if modifiers.contains(KeyModifiers::CONTROL) {
            if code == KeyCode::Char('u') {
                self.field_mut().clear();
            }
            return FormOutcome::Editing;
        }
        match code {
            KeyCode::Esc => return FormOutcome::Cancelled,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.focus = self.focus.toggle();
            }
            KeyCode::Enter if self.focus == FormField::Name => {
                self.focus = FormField::Color;
            }
            KeyCode::Enter => return self.submit(),
            KeyCode::Backspace => {
                self.field_mut().pop();
            }
            KeyCode::Char(c) => {
                self.field_mut().push(c);
                self.error = None;
            }
            _ => {}
        }
        FormOutcome::Editing
    }

    /// Validate and emit the tag. The fields are cleared on success so the
    /// next use starts empty.
    pub fn submit(&mut self) -> FormOutcome {
        let name = self.name.trim();
        let color = self.color.trim();
        if name.is_empty() {
            self.error = Some("name must not be empty".to_string());
            self.focus = FormField::Name;
            return FormOutcome::Editing;
        }
        if color.is_empty() {
            self.error = Some("color must not be empty".to_string());
            self.focus = FormField::Color;
            return FormOutcome::Editing;
        }
        let mut tag = Tag::draft(name, color);
        if let FormMode::Edit(id) = &self.mode {
            tag.id = Some(id.clone());
        }
        self.name.clear();
        self.color.clear();
        self.focus = FormField::Name;
        self.error = None;
        FormOutcome::Submitted(tag)
    }
}
