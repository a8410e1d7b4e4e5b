//! Vacation blocks repository

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::vacation::{NewVacationBlock, VacationBlock},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VacationStore: Send + Sync {
    /// All blocks, most recent start first
    async fn list(&self) -> AppResult<Vec<VacationBlock>>;

    /// Blocks sharing at least one day with `[from, to]`
    async fn overlapping(&self, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<VacationBlock>>;

    async fn get(&self, id: Uuid) -> AppResult<Option<VacationBlock>>;

    async fn insert(&self, block: &NewVacationBlock) -> AppResult<VacationBlock>;

    async fn set_calendar_event(&self, id: Uuid, event_id: &str) -> AppResult<()>;

    /// Returns whether a row was deleted
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

#[derive(Clone)]
pub struct VacationsRepository {
    pool: Pool<Postgres>,
}

impl VacationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VacationStore for VacationsRepository {
    async fn list(&self) -> AppResult<Vec<VacationBlock>> {
        let rows = sqlx::query_as::<_, VacationBlock>(
            "SELECT * FROM vacation_blocks ORDER BY start_date DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn overlapping(&self, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<VacationBlock>> {
        let rows = sqlx::query_as::<_, VacationBlock>(
            r#"
            SELECT * FROM vacation_blocks
            WHERE start_date <= $2 AND end_date >= $1
            ORDER BY start_date
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<VacationBlock>> {
        let row = sqlx::query_as::<_, VacationBlock>("SELECT * FROM vacation_blocks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, block: &NewVacationBlock) -> AppResult<VacationBlock> {
        let row = sqlx::query_as::<_, VacationBlock>(
            r#"
            INSERT INTO vacation_blocks (id, start_date, end_date, reason)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(block.start_date)
        .bind(block.end_date)
        .bind(&block.reason)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn set_calendar_event(&self, id: Uuid, event_id: &str) -> AppResult<()> {
        sqlx::query("UPDATE vacation_blocks SET calendar_event_id = $2 WHERE id = $1")
            .bind(id)
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM vacation_blocks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
