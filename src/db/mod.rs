//! Local record store
//!
//! The store is the offline half of the engine: a durable, keyed
//! collection of cards that every successful remote read warms and every
//! write hits before the network does. `SqliteStore` is the production
//! implementation; `MemoryStore` backs tests and embedders that have no
//! filesystem.

pub mod init;
pub mod memory;
pub mod sqlite;

pub use init::init_database;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::card::{Card, Completeness};
use crate::error::Result;
use async_trait::async_trait;

/// Keyed card storage with bulk upsert, substring search, and aggregate
/// counts.
///
/// Implementations must make each call atomic (a failed call leaves the
/// store unchanged) but provide no cross-call locking; the synchronizer
/// deliberately does not serialize operations on the same id.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Insert a new card, assigning a fresh local identifier. The card's
    /// own `id` is ignored.
    async fn insert(&self, card: &Card) -> Result<i64>;

    /// Update an existing card by its identifier; returns rows affected
    async fn update(&self, card: &Card) -> Result<u64>;

    /// Delete by identifier; returns rows affected (0 if absent)
    async fn delete_by_id(&self, id: i64) -> Result<u64>;

    /// Fetch a single card, or None if absent
    async fn get_by_id(&self, id: i64) -> Result<Option<Card>>;

    /// All cards, most recently assigned identifier first
    async fn list_all(&self) -> Result<Vec<Card>>;

    /// Idempotent bulk insert-or-replace keyed by identifier, applied
    /// all-or-nothing. Cards with id ≤ 0 are skipped: only records that
    /// already carry a server-assigned identifier may be absorbed, so a
    /// remote page can never clobber an unsynced local draft.
    async fn upsert_all(&self, cards: &[Card]) -> Result<()>;

    /// Case-insensitive substring search OR-combined across all 25 text
    /// fields, most recent first. An empty query matches nothing.
    async fn search(&self, query: &str) -> Result<Vec<Card>>;

    /// Total number of stored cards
    async fn count_total(&self) -> Result<u32>;

    /// Number of stored cards in the given completeness state
    async fn count_by_state(&self, state: Completeness) -> Result<u32>;
}
