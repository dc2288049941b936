//! Remote source boundary
//!
//! The remote service is the authoritative side of the sync pair, but it
//! may be unreachable at any time; every caller goes through the
//! synchronizer's fallback policy rather than talking to this trait
//! directly. `HttpRemote` binds the trait to the card service's HTTP API;
//! tests substitute stubs.

pub mod client;

pub use client::HttpRemote;

use crate::card::{Card, Statistics};
use crate::error::Result;
use async_trait::async_trait;

/// Abstract operation set of the remote card service.
///
/// Failures are reported through the engine taxonomy: `Connectivity` for
/// transport-level failures (unreachable, timeout, DNS), `Remote` for
/// application-level ones (server-reported error, undecodable payload).
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch a page of cards, optionally filtered by a search string
    async fn list_cards(&self, offset: u32, limit: u32, search: &str) -> Result<Vec<Card>>;

    /// Fetch a single card by server identifier
    async fn get_card(&self, id: i64) -> Result<Card>;

    /// Create a card; the server assigns the identifier and returns the
    /// stored record
    async fn create_card(&self, card: &Card) -> Result<Card>;

    /// Replace the card with the given identifier
    async fn update_card(&self, id: i64, card: &Card) -> Result<Card>;

    /// Delete the card with the given identifier
    async fn delete_card(&self, id: i64) -> Result<()>;

    /// Aggregate completeness statistics computed server-side
    async fn get_statistics(&self) -> Result<Statistics>;

    /// Reachability probe; used only to log connectivity state at startup
    async fn health_check(&self) -> Result<()>;
}
