//! Offline-first synchronizer
//!
//! Orchestrates every read and write across the local store and the
//! remote service, presenting one consistent view no matter which side is
//! reachable. Two policies cover every operation:
//!
//! - **fetch with fallback** (reads): try the remote; a success warms the
//!   local cache before being returned; a connectivity failure silently
//!   degrades to local data. List and statistics reads fall back on
//!   protocol errors too — availability over precision — while
//!   single-record reads surface protocol errors.
//! - **local durability first** (writes): classify and persist locally
//!   before any network I/O, so the record can never be lost to a network
//!   failure. Connectivity failure is success with sync pending; protocol
//!   failure is surfaced with the local write intact.
//!
//! Operations on the same record id are not serialized against each
//! other; the store's per-call atomicity is the only guarantee. This
//! mirrors the behavior callers already rely on.

use crate::card::{Card, Statistics};
use crate::classify::classify;
use crate::db::CardStore;
use crate::error::Result;
use crate::executor::{TaskHandle, TaskPool};
use crate::remote::RemoteSource;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a delete: the local row is gone either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Deleted locally and remotely
    Synced,
    /// Deleted locally; the remote was unreachable and still holds the
    /// record
    LocalOnly,
}

/// Orchestrator for all card operations.
///
/// Construct one per process with an injected store and remote client;
/// every operation executes on the internal worker pool and returns a
/// [`TaskHandle`] so the caller never blocks.
pub struct Synchronizer {
    store: Arc<dyn CardStore>,
    remote: Arc<dyn RemoteSource>,
    pool: TaskPool,
}

impl Synchronizer {
    pub fn new(
        store: Arc<dyn CardStore>,
        remote: Arc<dyn RemoteSource>,
        worker_count: usize,
    ) -> Self {
        Self {
            store,
            remote,
            pool: TaskPool::new(worker_count),
        }
    }

    /// Fetch a page of cards from the remote, warming the local cache on
    /// success. Any remote failure serves the full local card list
    /// instead.
    pub fn fetch_cards(&self, offset: u32, limit: u32, search: &str) -> TaskHandle<Vec<Card>> {
        let store = self.store.clone();
        let remote = self.remote.clone();
        let search = search.to_string();
        self.pool.submit(async move {
            match remote.list_cards(offset, limit, &search).await {
                Ok(cards) => {
                    store.upsert_all(&cards).await?;
                    debug!(count = cards.len(), "absorbed remote card page");
                    Ok(cards)
                }
                Err(err) => {
                    warn!(%err, "remote list failed, serving local cards");
                    store.list_all().await
                }
            }
        })
    }

    /// Fetch one card from the remote, warming the local cache on
    /// success. Falls back to the local copy only on connectivity
    /// failure; protocol errors are surfaced.
    pub fn fetch_card(&self, id: i64) -> TaskHandle<Option<Card>> {
        let store = self.store.clone();
        let remote = self.remote.clone();
        self.pool.submit(async move {
            match remote.get_card(id).await {
                Ok(card) => {
                    store.upsert_all(std::slice::from_ref(&card)).await?;
                    Ok(Some(card))
                }
                Err(err) if err.is_connectivity() => {
                    warn!(id, %err, "remote get failed, serving local card");
                    store.get_by_id(id).await
                }
                Err(err) => Err(err),
            }
        })
    }

    /// Save a card: classify, persist locally first, then push to the
    /// remote. A connectivity failure still reports success with the
    /// locally persisted card ("saved locally, sync pending"); a protocol
    /// failure is surfaced with the local write intact.
    ///
    /// A card with id 0 is created; the server assigns the durable
    /// identifier and the provisional local row is re-keyed to it (remote
    /// wins on identifier conflicts).
    pub fn save_card(&self, mut card: Card) -> TaskHandle<Card> {
        let store = self.store.clone();
        let remote = self.remote.clone();
        self.pool.submit(async move {
            card.health_status = classify(&card);
            let is_new = card.id == 0;

            if is_new {
                card.id = store.insert(&card).await?;
            } else if store.update(&card).await? == 0 {
                // Known remote id without a local row yet (e.g. edited
                // straight from a remote fetch on another device)
                store.upsert_all(std::slice::from_ref(&card)).await?;
            }

            let pushed = if is_new {
                remote.create_card(&card).await
            } else {
                remote.update_card(card.id, &card).await
            };

            match pushed {
                Ok(server_card) => {
                    if is_new && server_card.id != card.id {
                        // Re-key the provisional local row to the
                        // server-assigned identifier. Write the new row
                        // before dropping the old one: a failure between
                        // the two calls leaves a duplicate, never a lost
                        // record.
                        let provisional = card.id;
                        card.id = server_card.id;
                        store.upsert_all(std::slice::from_ref(&card)).await?;
                        store.delete_by_id(provisional).await?;
                    }
                    debug!(id = card.id, "card synced to remote");
                    Ok(card)
                }
                Err(err) if err.is_connectivity() => {
                    warn!(id = card.id, %err, "saved locally, sync pending");
                    Ok(card)
                }
                Err(err) => Err(err),
            }
        })
    }

    /// Delete a card locally and remotely. The local delete is
    /// unconditional and never rolled back; an unreachable remote yields
    /// the soft success [`DeleteOutcome::LocalOnly`].
    pub fn delete_card(&self, id: i64) -> TaskHandle<DeleteOutcome> {
        let store = self.store.clone();
        let remote = self.remote.clone();
        self.pool.submit(async move {
            store.delete_by_id(id).await?;
            match remote.delete_card(id).await {
                Ok(()) => Ok(DeleteOutcome::Synced),
                Err(err) if err.is_connectivity() => {
                    warn!(id, %err, "deleted locally, remote delete pending");
                    Ok(DeleteOutcome::LocalOnly)
                }
                Err(err) => Err(err),
            }
        })
    }

    /// Completeness statistics, remote-first. Any remote failure yields a
    /// snapshot computed from the local store instead.
    pub fn statistics(&self) -> TaskHandle<Statistics> {
        let store = self.store.clone();
        let remote = self.remote.clone();
        self.pool.submit(async move {
            match remote.get_statistics().await {
                Ok(stats) => Ok(stats),
                Err(err) => {
                    warn!(%err, "remote statistics failed, computing locally");
                    local_statistics(store.as_ref()).await
                }
            }
        })
    }

    /// Statistics computed purely from the local store
    pub fn local_statistics(&self) -> TaskHandle<Statistics> {
        let store = self.store.clone();
        self.pool
            .submit(async move { local_statistics(store.as_ref()).await })
    }

    /// Local substring search across all 25 text fields. An empty query
    /// returns nothing.
    pub fn search(&self, query: &str) -> TaskHandle<Vec<Card>> {
        let store = self.store.clone();
        let query = query.to_string();
        self.pool.submit(async move { store.search(&query).await })
    }

    /// Local point lookup
    pub fn get_by_id(&self, id: i64) -> TaskHandle<Option<Card>> {
        let store = self.store.clone();
        self.pool.submit(async move { store.get_by_id(id).await })
    }

    /// Everything in the local store, most recent first
    pub fn list_local(&self) -> TaskHandle<Vec<Card>> {
        let store = self.store.clone();
        self.pool.submit(async move { store.list_all().await })
    }

    /// Probe the remote and log the result. Startup diagnostics only;
    /// no operation depends on the outcome.
    pub fn check_remote(&self) -> TaskHandle<bool> {
        let remote = self.remote.clone();
        self.pool.submit(async move {
            match remote.health_check().await {
                Ok(()) => {
                    info!("remote service reachable");
                    Ok(true)
                }
                Err(err) => {
                    warn!(%err, "remote service unreachable, starting offline");
                    Ok(false)
                }
            }
        })
    }

    /// Drain in-flight operations and reject new ones. Idempotent; never
    /// abandons a started operation's result.
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }
}

async fn local_statistics(store: &dyn CardStore) -> Result<Statistics> {
    let total = store.count_total().await?;
    let complete = store
        .count_by_state(crate::card::Completeness::Complete)
        .await?;
    let incomplete = store
        .count_by_state(crate::card::Completeness::Incomplete)
        .await?;
    Ok(Statistics::from_counts(total, complete, incomplete))
}
