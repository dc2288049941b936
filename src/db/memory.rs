//! In-memory card store
//!
//! Same contract as [`SqliteStore`](crate::db::SqliteStore), backed by a
//! mutex-guarded map. Used by the test suite and by embedders that want
//! the engine without a filesystem.

use crate::card::{Card, Completeness};
use crate::db::CardStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    cards: BTreeMap<i64, Card>,
    next_id: i64,
}

/// Mutex-guarded map with the same semantics as the SQLite store
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CardStore for MemoryStore {
    async fn insert(&self, card: &Card) -> Result<i64> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        let mut card = card.clone();
        card.id = id;
        inner.cards.insert(id, card);
        Ok(id)
    }

    async fn update(&self, card: &Card) -> Result<u64> {
        let mut inner = self.inner.lock().unwrap();
        if inner.cards.contains_key(&card.id) {
            inner.cards.insert(card.id, card.clone());
            Ok(1)
        } else {
            Ok(0)
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64> {
        let mut inner = self.inner.lock().unwrap();
        Ok(if inner.cards.remove(&id).is_some() { 1 } else { 0 })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Card>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.cards.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Card>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.cards.values().rev().cloned().collect())
    }

    async fn upsert_all(&self, cards: &[Card]) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        for card in cards.iter().filter(|c| c.id > 0) {
            inner.cards.insert(card.id, card.clone());
            // Keep local inserts from reusing a server-assigned id
            if card.id > inner.next_id {
                inner.next_id = card.id;
            }
        }
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<Card>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let needle = query.to_lowercase();
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .cards
            .values()
            .rev()
            .filter(|card| {
                card.text_fields()
                    .iter()
                    .any(|f| f.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    async fn count_total(&self) -> Result<u32> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.cards.len() as u32)
    }

    async fn count_by_state(&self, state: Completeness) -> Result<u32> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .cards
            .values()
            .filter(|c| c.health_status == state)
            .count() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Card {
        let mut card = Card::new();
        card.name_en = name.into();
        card
    }

    #[tokio::test]
    async fn insert_ignores_caller_id() {
        let store = MemoryStore::new();
        let mut card = named("Ann");
        card.id = 500;
        let id = store.insert(&card).await.unwrap();
        assert_eq!(id, 1);
        assert!(store.get_by_id(500).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_advances_id_sequence() {
        let store = MemoryStore::new();
        let mut remote = named("Rita");
        remote.id = 10;
        store.upsert_all(&[remote]).await.unwrap();

        let id = store.insert(&named("Ann")).await.unwrap();
        assert_eq!(id, 11);
        assert_eq!(store.count_total().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn list_is_most_recent_first() {
        let store = MemoryStore::new();
        for name in ["a", "b", "c"] {
            store.insert(&named(name)).await.unwrap();
        }
        let ids: Vec<i64> = store.list_all().await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn search_matches_substrings_case_insensitively() {
        let store = MemoryStore::new();
        let mut card = named("Ann");
        card.line_id = "Ann-Line-99".into();
        store.insert(&card).await.unwrap();
        store.insert(&named("Bob")).await.unwrap();

        assert_eq!(store.search("line-99").await.unwrap().len(), 1);
        assert!(store.search("").await.unwrap().is_empty());
    }
}
