//! Typed list transforms used by the optimistic update protocol.
//!
//! Every function takes the list by value and returns the new list, so they
//! can be handed to the query cache as overlays and replayed over a fresh
//! committed base at any time.

use crate::identity::TagId;
use crate::tag::Tag;

/// Create: put `tag` at the head of the list.
pub fn insert_front(mut tags: Vec<Tag>, tag: Tag) -> Vec<Tag> {
    tags.insert(0, tag);
    tags
}

/// Create (commit): put the server's record in the list exactly once.
///
/// A list fetched after the server stored `tag` already holds it; the
/// record is then overwritten in place and keeps the server's position.
pub fn upsert_front(tags: Vec<Tag>, tag: Tag) -> Vec<Tag> {
    match tag.id.as_ref().and_then(|id| position_of(&tags, id)) {
        Some(_) => replace_found(tags, tag),
        None => insert_front(tags, tag),
    }
}

/// Update (optimistic): swap every entry sharing `tag`'s id for `tag`.
///
/// An id-less `tag` matches nothing and leaves the list untouched.
pub fn replace_by_id(tags: Vec<Tag>, tag: &Tag) -> Vec<Tag> {
    tags.into_iter()
        .map(|t| if t.same_identity(tag) { tag.clone() } else { t })
        .collect()
}

/// Update (commit): locate the entry by id and overwrite it with the
/// server's record.
///
/// Index 0 is a valid hit. Nothing happens when the id is not in the list.
pub fn replace_found(mut tags: Vec<Tag>, tag: Tag) -> Vec<Tag> {
    let found = tag.id.as_ref().and_then(|id| position_of(&tags, id));
    if let Some(index) = found {
        tags[index] = tag;
    }
    tags
}

/// Delete: drop every entry sharing `tag`'s id.
pub fn remove_by_id(tags: Vec<Tag>, tag: &Tag) -> Vec<Tag> {
    if tag.id.is_none() {
        return tags;
    }
    tags.into_iter().filter(|t| !t.same_identity(tag)).collect()
}

pub fn position_of(tags: &[Tag], id: &TagId) -> Option<usize> {
    tags.iter().position(|t| t.has_id(id))
}
