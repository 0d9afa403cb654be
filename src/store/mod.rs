//! Entity caches shared by the pollers and the views
//!
//! Blocks and transactions are immutable once fetched, so they are cached for
//! the process lifetime and handed out as `Arc`s.

mod blocks;
mod entity;

pub use blocks::{BlockStore, Direction};
pub use entity::{Entity, EntityStore, TransactionStore};
