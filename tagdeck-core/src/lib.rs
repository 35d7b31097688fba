//! TagDeck Core - Tag Types
//!
//! Pure data structures shared by the query cache, the transport client and
//! the terminal UI. The only behavior here is the set of typed list
//! transforms the optimistic update protocol is built from.

pub mod color;
pub mod identity;
pub mod tag;
pub mod transform;

pub use color::{ColorError, Rgb};
pub use identity::TagId;
pub use tag::{RowKey, Tag};
