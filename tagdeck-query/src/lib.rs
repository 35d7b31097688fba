//! Keyed query cache with explicit freshness and optimistic mutation.
//!
//! Every cached value lives under a typed [`QueryKey`]. Reads go through
//! [`QueryClient::query`], which serves the cached value while it is inside
//! the freshness window and otherwise runs the caller's fetcher, collapsing
//! concurrent fetches for the same key into one.
//!
//! # Mutation protocol
//!
//! Writes never touch cached data directly. A caller first registers an
//! overlay with [`QueryClient::mutate_optimistic`], which returns a
//! [`MutationTicket`]. The ticket is later settled exactly once, either by
//! [`QueryClient::mutate_success`] (commit) or [`QueryClient::mutate_error`]
//! (rollback).
//!
//! Each entry keeps the last committed value and the ordered list of pending
//! overlays. The value subscribers see is always the committed value with the
//! pending overlays replayed on top, in issue order. Settling one ticket
//! rebuilds that view, so an earlier operation's commit can never wipe out a
//! later operation's overlay on the same key.
//!
//! # Example
//!
//! ```ignore
//! const TAGS: QueryKey<Vec<Tag>> = QueryKey::new("tag-list");
//!
//! let tags = client.query(&TAGS, || transport.list_tags(), config).await?;
//!
//! let ticket = client.mutate_optimistic(&TAGS, move |tags| insert_front(tags, draft.clone()))?;
//! match transport.create_tag(&draft).await {
//!     Ok(created) => client.mutate_success(ticket, Commit::transform(move |tags| insert_front(tags, created)))?,
//!     Err(err) => client.mutate_error(ticket, err)?,
//! }
//! ```

pub mod client;
pub mod config;
mod entry;
pub mod error;
pub mod freshness;
pub mod key;
pub mod mutation;

pub use client::{QueryClient, SweepReport};
pub use config::QueryConfig;
pub use error::{QueryError, QueryResult, SharedError};
pub use freshness::{QuerySnapshot, QueryStatus};
pub use key::QueryKey;
pub use mutation::{Commit, MutationTicket};
