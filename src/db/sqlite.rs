//! SQLite-backed card store

use crate::card::{Card, Completeness};
use crate::db::CardStore;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Sqlite, SqlitePool};

/// The 25 user-editable text columns, in schema order. Substring search
/// spans exactly this set.
const TEXT_COLUMNS: [&str; 25] = [
    "name_zh",
    "name_en",
    "company_name_zh",
    "company_name_en",
    "position_zh",
    "position_en",
    "position1_zh",
    "position1_en",
    "department1_zh",
    "department1_en",
    "department2_zh",
    "department2_en",
    "department3_zh",
    "department3_en",
    "mobile_phone",
    "company_phone1",
    "company_phone2",
    "email",
    "line_id",
    "company_address1_zh",
    "company_address1_en",
    "company_address2_zh",
    "company_address2_en",
    "note1",
    "note2",
];

const DATA_COLUMNS: &str = "name_zh, name_en, company_name_zh, company_name_en, \
    position_zh, position_en, position1_zh, position1_en, \
    department1_zh, department1_en, department2_zh, department2_en, \
    department3_zh, department3_en, mobile_phone, company_phone1, \
    company_phone2, email, line_id, company_address1_zh, company_address1_en, \
    company_address2_zh, company_address2_en, note1, note2, \
    created_at, updated_at, health_status, image_path";

const DATA_PLACEHOLDERS: &str =
    "?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?";

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Bind the 29 non-id columns in `DATA_COLUMNS` order
fn bind_data<'q>(q: SqliteQuery<'q>, card: &'q Card) -> SqliteQuery<'q> {
    q.bind(&card.name_zh)
        .bind(&card.name_en)
        .bind(&card.company_name_zh)
        .bind(&card.company_name_en)
        .bind(&card.position_zh)
        .bind(&card.position_en)
        .bind(&card.position1_zh)
        .bind(&card.position1_en)
        .bind(&card.department1_zh)
        .bind(&card.department1_en)
        .bind(&card.department2_zh)
        .bind(&card.department2_en)
        .bind(&card.department3_zh)
        .bind(&card.department3_en)
        .bind(&card.mobile_phone)
        .bind(&card.company_phone1)
        .bind(&card.company_phone2)
        .bind(&card.email)
        .bind(&card.line_id)
        .bind(&card.company_address1_zh)
        .bind(&card.company_address1_en)
        .bind(&card.company_address2_zh)
        .bind(&card.company_address2_en)
        .bind(&card.note1)
        .bind(&card.note2)
        .bind(&card.created_at)
        .bind(&card.updated_at)
        .bind(card.health_status.as_str())
        .bind(&card.image_path)
}

/// Durable card store over a SQLite connection pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap an initialized pool (see [`crate::db::init_database`])
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CardStore for SqliteStore {
    async fn insert(&self, card: &Card) -> Result<i64> {
        let sql =
            format!("INSERT INTO cards ({DATA_COLUMNS}) VALUES ({DATA_PLACEHOLDERS})");
        let result = bind_data(sqlx::query(&sql), card).execute(&self.pool).await?;
        Ok(result.last_insert_rowid())
    }

    async fn update(&self, card: &Card) -> Result<u64> {
        let assignments = format!(
            "{}, created_at = ?, updated_at = ?, health_status = ?, image_path = ?",
            TEXT_COLUMNS
                .iter()
                .map(|c| format!("{c} = ?"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let sql = format!("UPDATE cards SET {assignments} WHERE id = ?");
        let result = bind_data(sqlx::query(&sql), card)
            .bind(card.id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cards WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Card>> {
        let card = sqlx::query_as::<_, Card>("SELECT * FROM cards WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(card)
    }

    async fn list_all(&self) -> Result<Vec<Card>> {
        let cards = sqlx::query_as::<_, Card>("SELECT * FROM cards ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(cards)
    }

    async fn upsert_all(&self, cards: &[Card]) -> Result<()> {
        // One transaction per batch: either the whole page lands or none
        // of it does. Dropping the transaction on error rolls back.
        let mut tx = self.pool.begin().await?;
        let sql = format!(
            "INSERT OR REPLACE INTO cards (id, {DATA_COLUMNS}) VALUES (?, {DATA_PLACEHOLDERS})"
        );
        for card in cards.iter().filter(|c| c.id > 0) {
            bind_data(sqlx::query(&sql).bind(card.id), card)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<Card>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        // LIKE metacharacters in the query must match literally
        let escaped = query
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let clauses = TEXT_COLUMNS
            .iter()
            .map(|c| format!("lower({c}) LIKE '%' || lower(?1) || '%' ESCAPE '\\'"))
            .collect::<Vec<_>>()
            .join(" OR ");
        let sql = format!("SELECT * FROM cards WHERE {clauses} ORDER BY id DESC");
        let cards = sqlx::query_as::<_, Card>(&sql)
            .bind(escaped)
            .fetch_all(&self.pool)
            .await?;
        Ok(cards)
    }

    async fn count_total(&self) -> Result<u32> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cards")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u32)
    }

    async fn count_by_state(&self, state: Completeness) -> Result<u32> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cards WHERE health_status = ?")
                .bind(state.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_database_in_memory;

    async fn store() -> SqliteStore {
        SqliteStore::new(init_database_in_memory().await.unwrap())
    }

    fn sample(name: &str) -> Card {
        let mut card = Card::new();
        card.name_en = name.into();
        card.company_name_en = "Acme Corp".into();
        card.email = "someone@acme.example".into();
        card
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = store().await;
        let a = store.insert(&sample("Ann")).await.unwrap();
        let b = store.insert(&sample("Bob")).await.unwrap();
        assert!(b > a);

        let fetched = store.get_by_id(a).await.unwrap().unwrap();
        assert_eq!(fetched.name_en, "Ann");
        assert_eq!(fetched.id, a);
    }

    #[tokio::test]
    async fn update_and_delete_report_affected_rows() {
        let store = store().await;
        let id = store.insert(&sample("Ann")).await.unwrap();

        let mut card = store.get_by_id(id).await.unwrap().unwrap();
        card.position_en = "CTO".into();
        assert_eq!(store.update(&card).await.unwrap(), 1);
        assert_eq!(
            store.get_by_id(id).await.unwrap().unwrap().position_en,
            "CTO"
        );

        let mut missing = card.clone();
        missing.id = 9999;
        assert_eq!(store.update(&missing).await.unwrap(), 0);

        assert_eq!(store.delete_by_id(id).await.unwrap(), 1);
        assert_eq!(store.delete_by_id(id).await.unwrap(), 0);
        assert!(store.get_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_all_is_idempotent_and_skips_unsynced_cards() {
        let store = store().await;

        let mut synced = sample("Remote Rita");
        synced.id = 42;
        let unsynced = sample("Draft Dora"); // id 0, must be skipped

        store.upsert_all(&[synced.clone(), unsynced]).await.unwrap();
        store.upsert_all(&[synced.clone()]).await.unwrap();

        assert_eq!(store.count_total().await.unwrap(), 1);
        let stored = store.get_by_id(42).await.unwrap().unwrap();
        assert_eq!(stored.name_en, "Remote Rita");

        // Latest values win on replace
        synced.name_en = "Rita Remote".into();
        store.upsert_all(&[synced]).await.unwrap();
        assert_eq!(
            store.get_by_id(42).await.unwrap().unwrap().name_en,
            "Rita Remote"
        );
    }

    #[tokio::test]
    async fn search_is_case_insensitive_across_fields_and_ordered() {
        let store = store().await;
        let mut a = sample("Ann");
        a.note2 = "Conference Taipei".into();
        let b = sample("Bob");
        let id_a = store.insert(&a).await.unwrap();
        let id_b = store.insert(&b).await.unwrap();

        // Matches email domain on both, most recent id first
        let hits = store.search("ACME").await.unwrap();
        assert_eq!(
            hits.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![id_b, id_a]
        );

        // Matches a note field only
        let hits = store.search("taipei").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, id_a);

        assert!(store.search("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_treats_like_metacharacters_literally() {
        let store = store().await;
        let mut discount = sample("Ann");
        discount.note1 = "offers 100% discount".into();
        let id_discount = store.insert(&discount).await.unwrap();
        let mut plain = sample("Bob");
        plain.note1 = "offers 100 units".into();
        store.insert(&plain).await.unwrap();

        // '%' must not act as a wildcard
        let hits = store.search("100%").await.unwrap();
        assert_eq!(hits.iter().map(|c| c.id).collect::<Vec<_>>(), vec![id_discount]);

        // '_' must not match arbitrary single characters
        let mut coded = sample("Cyd");
        coded.line_id = "a_c".into();
        let id_coded = store.insert(&coded).await.unwrap();
        let mut similar = sample("Dee");
        similar.line_id = "abc".into();
        store.insert(&similar).await.unwrap();

        let hits = store.search("a_c").await.unwrap();
        assert_eq!(hits.iter().map(|c| c.id).collect::<Vec<_>>(), vec![id_coded]);
    }

    #[tokio::test]
    async fn empty_search_returns_nothing() {
        let store = store().await;
        for name in ["a", "b", "c", "d", "e"] {
            store.insert(&sample(name)).await.unwrap();
        }
        assert!(store.search("").await.unwrap().is_empty());
        assert_eq!(store.list_all().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn counts_by_state() {
        let store = store().await;
        let mut complete = sample("Ann");
        complete.position_en = "CEO".into();
        complete.health_status = Completeness::Complete;
        store.insert(&complete).await.unwrap();
        store.insert(&sample("Bob")).await.unwrap();
        store.insert(&sample("Cyd")).await.unwrap();

        assert_eq!(store.count_total().await.unwrap(), 3);
        assert_eq!(store.count_by_state(Completeness::Complete).await.unwrap(), 1);
        assert_eq!(
            store.count_by_state(Completeness::Incomplete).await.unwrap(),
            2
        );
    }
}
