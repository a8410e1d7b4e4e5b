//! Session type catalogue repository (read-only)

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::SessionType};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionTypeStore: Send + Sync {
    async fn list_active(&self) -> AppResult<Vec<SessionType>>;

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<SessionType>>;
}

#[derive(Clone)]
pub struct SessionTypesRepository {
    pool: Pool<Postgres>,
}

impl SessionTypesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionTypeStore for SessionTypesRepository {
    async fn list_active(&self) -> AppResult<Vec<SessionType>> {
        let rows = sqlx::query_as::<_, SessionType>(
            "SELECT * FROM session_types WHERE is_active ORDER BY sort_order, name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<SessionType>> {
        let row = sqlx::query_as::<_, SessionType>(
            "SELECT * FROM session_types WHERE slug = $1 AND is_active",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
