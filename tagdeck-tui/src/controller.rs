//! Tag view controller: the queries the UI reads and the optimistic writes
//! it issues.
//!
//! Every write follows the same three steps against the query cache:
//!
//! 1. overlay a pure transform on `tag-list` (and on `tag` for updates) so
//!    the change is visible before the request is sent;
//! 2. on success, commit a list computed from the record the server
//!    returned;
//! 3. on failure, roll the overlay back, leaving the entry in error, and
//!    hand the error to the caller.

use crate::api_client::{TagTransport, TransportError};
use crate::config::QuerySettings;
use crate::selection::SelectionStream;
use std::sync::Arc;
use tagdeck_core::transform::{insert_front, remove_by_id, replace_by_id, replace_found, upsert_front};
use tagdeck_core::{Tag, TagId};
use tagdeck_query::{Commit, QueryClient, QueryConfig, QueryError, QueryKey, QuerySnapshot};
use tracing::{info, warn};

pub mod keys {
    use super::*;

    pub const TAG_LIST: QueryKey<Vec<Tag>> = QueryKey::new("tag-list");
    pub const TAG: QueryKey<Tag> = QueryKey::new("tag");
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl ControllerError {
    /// The transport failure behind this error, whether it came from a write
    /// or from a fetch recorded in the cache.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Query(err) => err
                .fetch_source()
                .and_then(|source| source.downcast_ref::<TransportError>()),
        }
    }
}

/// Which write a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Update => "updated",
            Self::Delete => "deleted",
        }
    }
}

#[derive(Clone)]
pub struct TagController {
    queries: QueryClient,
    transport: Arc<dyn TagTransport>,
    selection: SelectionStream,
    list_config: QueryConfig,
    item_config: QueryConfig,
}

impl TagController {
    pub fn new(transport: Arc<dyn TagTransport>, settings: &QuerySettings) -> Self {
        let list_config = settings.to_query_config();
        // The detail pane never refetches just because the window was refocused.
        let item_config = list_config.clone().with_refetch_on_window_focus(false);
        Self::with_configs(transport, list_config, item_config)
    }

    pub fn with_configs(
        transport: Arc<dyn TagTransport>,
        list_config: QueryConfig,
        item_config: QueryConfig,
    ) -> Self {
        Self {
            queries: QueryClient::new(list_config.clone()),
            transport,
            selection: SelectionStream::new(),
            list_config,
            item_config,
        }
    }

    pub fn queries(&self) -> &QueryClient {
        &self.queries
    }

    pub fn selection(&self) -> &SelectionStream {
        &self.selection
    }

    /// The tag list, fetched when missing or stale.
    pub async fn tags(&self) -> Result<Vec<Tag>, ControllerError> {
        let transport = &self.transport;
        let tags = self
            .queries
            .query(
                &keys::TAG_LIST,
                || transport.list_tags(),
                self.list_config.clone(),
            )
            .await?;
        Ok(tags)
    }

    /// Drop freshness on the list and fetch it again.
    pub async fn refresh_tags(&self) -> Result<Vec<Tag>, ControllerError> {
        self.queries.invalidate(&keys::TAG_LIST);
        self.tags().await
    }

    pub fn tags_snapshot(&self) -> QuerySnapshot<Vec<Tag>> {
        self.queries.snapshot(&keys::TAG_LIST).unwrap_or_default()
    }

    /// Point the detail query at `id`. A `None` keeps the current selection.
    pub fn select(&self, id: Option<TagId>) -> bool {
        let changed = self.selection.publish(id);
        if changed {
            info!(tag_id = ?self.selection.current(), "tag selected");
        }
        changed
    }

    /// The selected tag, fetched when the selection changed or the data went
    /// stale. Without a selection, whatever the entry holds is returned.
    pub async fn current_tag(&self) -> Result<Option<Tag>, ControllerError> {
        let Some(id) = self.selection.current() else {
            return Ok(self.current_snapshot().data);
        };
        let transport = &self.transport;
        let tag = self
            .queries
            .query_with_arg(
                &keys::TAG,
                id,
                |id: TagId| async move { transport.get_tag(&id).await },
                self.item_config.clone(),
            )
            .await?;
        Ok(Some(tag))
    }

    pub fn current_snapshot(&self) -> QuerySnapshot<Tag> {
        self.queries.snapshot(&keys::TAG).unwrap_or_default()
    }

    pub async fn create(&self, tag: Tag) -> Result<Tag, ControllerError> {
        let stub = tag.clone();
        let ticket = self
            .queries
            .mutate_optimistic(&keys::TAG_LIST, move |tags| insert_front(tags, stub.clone()))?;

        match self.transport.create_tag(&tag).await {
            Ok(created) => {
                let committed = created.clone();
                self.queries.mutate_success(
                    ticket,
                    Commit::transform(move |tags| upsert_front(tags, committed)),
                )?;
                info!(tag_id = ?created.id, name = %created.name, "tag created");
                Ok(created)
            }
            Err(err) => {
                self.queries.mutate_error(ticket, err.clone())?;
                warn!(name = %tag.name, error = %err, "tag create failed");
                Err(err.into())
            }
        }
    }

    pub async fn update(&self, tag: Tag) -> Result<Tag, ControllerError> {
        let overlay = tag.clone();
        let list_ticket = self
            .queries
            .mutate_optimistic(&keys::TAG_LIST, move |tags| replace_by_id(tags, &overlay))?;
        // The detail entry is only touched while it shows this tag.
        let shows_tag = self
            .current_snapshot()
            .data
            .is_some_and(|current| current.same_identity(&tag));
        let item_ticket = if shows_tag {
            let overlay = tag.clone();
            Some(
                self.queries
                    .mutate_optimistic(&keys::TAG, move |current| replace_same(current, &overlay))?,
            )
        } else {
            None
        };

        match self.transport.update_tag(&tag).await {
            Ok(updated) => {
                let committed = updated.clone();
                self.queries.mutate_success(
                    list_ticket,
                    Commit::transform(move |tags| replace_found(tags, committed)),
                )?;
                if let Some(ticket) = item_ticket {
                    let committed = updated.clone();
                    self.queries.mutate_success(
                        ticket,
                        Commit::transform(move |current| replace_same(current, &committed)),
                    )?;
                }
                info!(tag_id = ?updated.id, name = %updated.name, "tag updated");
                Ok(updated)
            }
            Err(err) => {
                self.queries.mutate_error(list_ticket, err.clone())?;
                if let Some(ticket) = item_ticket {
                    self.queries.mutate_error(ticket, err.clone())?;
                }
                warn!(tag_id = ?tag.id, error = %err, "tag update failed");
                Err(err.into())
            }
        }
    }

    pub async fn delete(&self, tag: Tag) -> Result<Tag, ControllerError> {
        let doomed = tag.clone();
        let ticket = self
            .queries
            .mutate_optimistic(&keys::TAG_LIST, move |tags| remove_by_id(tags, &doomed))?;

        match self.transport.delete_tag(&tag).await {
            Ok(deleted) => {
                let committed = deleted.clone();
                self.queries.mutate_success(
                    ticket,
                    Commit::transform(move |tags| remove_by_id(tags, &committed)),
                )?;
                info!(tag_id = ?deleted.id, "tag deleted");
                Ok(deleted)
            }
            Err(err) => {
                self.queries.mutate_error(ticket, err.clone())?;
                warn!(tag_id = ?tag.id, error = %err, "tag delete failed");
                Err(err.into())
            }
        }
    }

    pub async fn run(&self, kind: MutationKind, tag: Tag) -> Result<Tag, ControllerError> {
        match kind {
            MutationKind::Create => self.create(tag).await,
            MutationKind::Update => self.update(tag).await,
            MutationKind::Delete => self.delete(tag).await,
        }
    }
}

fn replace_same(current: Tag, replacement: &Tag) -> Tag {
    if current.same_identity(replacement) {
        replacement.clone()
    } else {
        current
    }
}
