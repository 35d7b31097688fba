//! The tag record.

use crate::color::{ColorError, Rgb};
use crate::identity::TagId;
use serde::{Deserialize, Serialize};

/// A named, colored label.
///
/// `id` is `None` until the server has accepted the tag; optimistic stubs
/// inserted ahead of a create carry no id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TagId>,
    pub name: String,
    pub color: String,
}

impl Tag {
    /// A tag that has not been created yet.
    pub fn draft(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            color: color.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<TagId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// True when both tags carry the same id. Id-less tags never match.
    pub fn same_identity(&self, other: &Tag) -> bool {
        matches!((&self.id, &other.id), (Some(a), Some(b)) if a == b)
    }

    pub fn has_id(&self, id: &TagId) -> bool {
        self.id.as_ref() == Some(id)
    }

    pub fn rgb(&self) -> Result<Rgb, ColorError> {
        self.color.parse()
    }

    /// Stable row identity for list rendering.
    pub fn row_key(&self, index: usize) -> RowKey {
        match &self.id {
            Some(id) => RowKey::Id(id.clone()),
            None => RowKey::Position(index),
        }
    }
}

/// How a list row is tracked across re-renders: by id once the server has
/// assigned one, by position before that.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    Id(TagId),
    Position(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_serializes_without_id() {
        let tag = Tag::draft("urgent", "#ff0000");
        let json = serde_json::to_value(&tag).unwrap();
        assert_eq!(json, serde_json::json!({"name": "urgent", "color": "#ff0000"}));
    }

    #[test]
    fn server_payload_with_id_deserializes() {
        let tag: Tag =
            serde_json::from_str(r#"{"id":"5","name":"a","color":"blue"}"#).unwrap();
        assert_eq!(tag, Tag::draft("a", "blue").with_id("5"));
        assert!(tag.is_persisted());
    }

    #[test]
    fn id_less_tags_never_share_identity() {
        let a = Tag::draft("a", "red");
        let b = Tag::draft("a", "red");
        assert!(!a.same_identity(&b));
        assert!(a.clone().with_id("1").same_identity(&b.with_id("1")));
    }

    #[test]
    fn row_key_falls_back_to_position() {
        assert_eq!(Tag::draft("a", "red").row_key(3), RowKey::Position(3));
        assert_eq!(
            Tag::draft("a", "red").with_id("9").row_key(3),
            RowKey::Id(TagId::new("9"))
        );
    }
}
