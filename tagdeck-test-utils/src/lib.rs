//! TagDeck Test Utilities
//!
//! Shared test infrastructure for the TagDeck workspace:
//! - Proptest generators for tags and tag lists
//! - Fixtures for common list shapes

pub use tagdeck_core::{Tag, TagId};

// ============================================================================
// FIXTURES
// ============================================================================

/// A persisted tag.
pub fn tag(id: &str, name: &str, color: &str) -> Tag {
    Tag::draft(name, color).with_id(id)
}

/// `count` persisted tags with ids `"1"..=count`.
pub fn numbered_tags(count: usize) -> Vec<Tag> {
    (1..=count)
        .map(|i| tag(&i.to_string(), &format!("tag-{i}"), "#336699"))
        .collect()
}

pub mod generators {
    //! Proptest strategies for generating tags.

    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    pub fn arb_tag_id() -> impl Strategy<Value = TagId> {
        "[1-9][0-9]{0,3}".prop_map(TagId::new)
    }

    pub fn arb_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9 -]{0,15}"
    }

    pub fn arb_color() -> impl Strategy<Value = String> {
        prop_oneof![
            any::<[u8; 3]>().prop_map(|[r, g, b]| format!("#{r:02x}{g:02x}{b:02x}")),
            Just("red".to_string()),
            Just("blue".to_string()),
        ]
    }

    /// A tag the server has not seen yet.
    pub fn arb_draft() -> impl Strategy<Value = Tag> {
        (arb_name(), arb_color()).prop_map(|(name, color)| Tag::draft(name, color))
    }

    pub fn arb_tag() -> impl Strategy<Value = Tag> {
        (arb_tag_id(), arb_draft()).prop_map(|(id, draft)| draft.with_id(id))
    }

    /// A list of persisted tags with distinct ids, as the server returns it.
    pub fn arb_tag_list(max_len: usize) -> impl Strategy<Value = Vec<Tag>> {
        prop::collection::vec(arb_draft(), 0..=max_len).prop_flat_map(|drafts| {
            let len = drafts.len();
            prop::collection::btree_set(1u32..10_000, len..=len).prop_map(
                move |ids: BTreeSet<u32>| {
                    drafts
                        .iter()
                        .cloned()
                        .zip(ids)
                        .map(|(draft, id)| draft.with_id(id.to_string()))
                        .collect()
                },
            )
        })
    }

    /// A non-empty list plus the index of one of its elements.
    pub fn arb_tag_list_with_index(max_len: usize) -> impl Strategy<Value = (Vec<Tag>, usize)> {
        arb_tag_list(max_len.max(1))
            .prop_filter("list must be non-empty", |tags| !tags.is_empty())
            .prop_flat_map(|tags| {
                let len = tags.len();
                (Just(tags), 0..len)
            })
    }
}
