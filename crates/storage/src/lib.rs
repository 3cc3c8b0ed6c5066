use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use wayfare_core::{FaqEntry, Place};

/// Collection-level store failures. Per-record anomalies (a place with
/// unrankable coordinates) are not store errors — ranking skips those.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store data error: {0}")]
    Data(String),
}

pub trait PlaceRepository: Send + Sync {
    async fn list_places(&self) -> Result<Vec<Place>, StoreError>;
    /// Case-insensitive substring match on the category label.
    async fn list_places_by_category(&self, needle: &str) -> Result<Vec<Place>, StoreError>;
    /// Get-or-create keyed by name; returns whether the place was new.
    async fn upsert_place(&self, place: Place) -> Result<bool, StoreError>;
}

pub trait FaqRepository: Send + Sync {
    async fn list_faqs(&self) -> Result<Vec<FaqEntry>, StoreError>;
    /// Case-insensitive exact-question lookup.
    async fn find_faq_by_question(&self, question: &str) -> Result<Option<FaqEntry>, StoreError>;
    async fn upsert_faq(&self, faq: FaqEntry) -> Result<bool, StoreError>;
}

/// In-memory store. Places live in a Vec so catalog iteration order — the
/// ranking tie-break — stays the insertion order.
#[derive(Clone, Default)]
pub struct MemoryStore {
    places: Arc<RwLock<Vec<Place>>>,
    faqs: Arc<RwLock<Vec<FaqEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlaceRepository for MemoryStore {
    async fn list_places(&self) -> Result<Vec<Place>, StoreError> {
        Ok(self.places.read().clone())
    }

    async fn list_places_by_category(&self, needle: &str) -> Result<Vec<Place>, StoreError> {
        let needle = needle.to_lowercase();
        Ok(self
            .places
            .read()
            .iter()
            .filter(|place| place.category_label().to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn upsert_place(&self, place: Place) -> Result<bool, StoreError> {
        let mut places = self.places.write();
        if places.iter().any(|existing| existing.name == place.name) {
            return Ok(false);
        }
        places.push(place);
        Ok(true)
    }
}

impl FaqRepository for MemoryStore {
    async fn list_faqs(&self) -> Result<Vec<FaqEntry>, StoreError> {
        Ok(self.faqs.read().clone())
    }

    async fn find_faq_by_question(&self, question: &str) -> Result<Option<FaqEntry>, StoreError> {
        Ok(self
            .faqs
            .read()
            .iter()
            .find(|faq| faq.question.eq_ignore_ascii_case(question))
            .cloned())
    }

    async fn upsert_faq(&self, faq: FaqEntry) -> Result<bool, StoreError> {
        let mut faqs = self.faqs.write();
        if faqs
            .iter()
            .any(|existing| existing.question.eq_ignore_ascii_case(&faq.question))
        {
            return Ok(false);
        }
        faqs.push(faq);
        Ok(true)
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("failed connecting to sqlite at {}", database_url))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS places (
              name TEXT PRIMARY KEY,
              latitude REAL NOT NULL,
              longitude REAL NOT NULL,
              category TEXT,
              description TEXT,
              rating REAL,
              average_duration_hours INTEGER
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS faqs (
              question TEXT PRIMARY KEY,
              answer TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn place_from_row(row: &sqlx::sqlite::SqliteRow) -> Place {
    Place {
        name: row.get("name"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        category: row.get("category"),
        description: row.get("description"),
        rating: row.get("rating"),
        average_duration_hours: row
            .get::<Option<i64>, _>("average_duration_hours")
            .map(|hours| hours.max(0) as u32),
    }
}

impl PlaceRepository for SqliteStore {
    async fn list_places(&self) -> Result<Vec<Place>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT name, latitude, longitude, category, description, rating, average_duration_hours
            FROM places
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(place_from_row).collect())
    }

    async fn list_places_by_category(&self, needle: &str) -> Result<Vec<Place>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT name, latitude, longitude, category, description, rating, average_duration_hours
            FROM places
            WHERE lower(coalesce(nullif(trim(category), ''), 'General')) LIKE '%' || lower(?1) || '%'
            ORDER BY rowid
            "#,
        )
        .bind(needle)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(place_from_row).collect())
    }

    async fn upsert_place(&self, place: Place) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO places
              (name, latitude, longitude, category, description, rating, average_duration_hours)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(name) DO NOTHING
            "#,
        )
        .bind(&place.name)
        .bind(place.latitude)
        .bind(place.longitude)
        .bind(&place.category)
        .bind(&place.description)
        .bind(place.rating)
        .bind(place.average_duration_hours.map(|hours| hours as i64))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl FaqRepository for SqliteStore {
    async fn list_faqs(&self) -> Result<Vec<FaqEntry>, StoreError> {
        let rows = sqlx::query("SELECT question, answer FROM faqs ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| FaqEntry {
                question: row.get("question"),
                answer: row.get("answer"),
            })
            .collect())
    }

    async fn find_faq_by_question(&self, question: &str) -> Result<Option<FaqEntry>, StoreError> {
        let row = sqlx::query("SELECT question, answer FROM faqs WHERE lower(question) = lower(?1)")
            .bind(question)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| FaqEntry {
            question: row.get("question"),
            answer: row.get("answer"),
        }))
    }

    async fn upsert_faq(&self, faq: FaqEntry) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO faqs (question, answer)
            VALUES (?1, ?2)
            ON CONFLICT(question) DO NOTHING
            "#,
        )
        .bind(&faq.question)
        .bind(&faq.answer)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub async fn sqlite(database_url: &str) -> Result<Self> {
        let sqlite = SqliteStore::connect(database_url).await?;
        Ok(Self::Sqlite(sqlite))
    }
}

impl PlaceRepository for Store {
    async fn list_places(&self) -> Result<Vec<Place>, StoreError> {
        match self {
            Store::Memory(store) => store.list_places().await,
            Store::Sqlite(store) => store.list_places().await,
        }
    }

    async fn list_places_by_category(&self, needle: &str) -> Result<Vec<Place>, StoreError> {
        match self {
            Store::Memory(store) => store.list_places_by_category(needle).await,
            Store::Sqlite(store) => store.list_places_by_category(needle).await,
        }
    }

    async fn upsert_place(&self, place: Place) -> Result<bool, StoreError> {
        match self {
            Store::Memory(store) => store.upsert_place(place).await,
            Store::Sqlite(store) => store.upsert_place(place).await,
        }
    }
}

impl FaqRepository for Store {
    async fn list_faqs(&self) -> Result<Vec<FaqEntry>, StoreError> {
        match self {
            Store::Memory(store) => store.list_faqs().await,
            Store::Sqlite(store) => store.list_faqs().await,
        }
    }

    async fn find_faq_by_question(&self, question: &str) -> Result<Option<FaqEntry>, StoreError> {
        match self {
            Store::Memory(store) => store.find_faq_by_question(question).await,
            Store::Sqlite(store) => store.find_faq_by_question(question).await,
        }
    }

    async fn upsert_faq(&self, faq: FaqEntry) -> Result<bool, StoreError> {
        match self {
            Store::Memory(store) => store.upsert_faq(faq).await,
            Store::Sqlite(store) => store.upsert_faq(faq).await,
        }
    }
}
