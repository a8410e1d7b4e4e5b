//! Bookings repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::booking::{Booking, BookingFilter, BookingStatus, NewBooking},
};

/// Persistence operations the booking lifecycle depends on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Insert a new pending booking
    async fn insert(&self, booking: &NewBooking) -> AppResult<Booking>;

    async fn find_by_invoice(&self, invoice_id: &str) -> AppResult<Option<Booking>>;

    /// Atomically move a pending booking to `status`.
    ///
    /// Returns the updated row, or `None` when the booking was no longer
    /// pending (another delivery got there first).
    async fn transition(&self, invoice_id: &str, status: BookingStatus) -> AppResult<Option<Booking>>;

    async fn set_calendar_event(&self, id: Uuid, event_id: &str) -> AppResult<()>;

    /// List bookings, newest first
    async fn list(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>>;

    async fn count_by_status(&self) -> AppResult<Vec<(BookingStatus, i64)>>;
}

#[derive(Clone)]
pub struct BookingsRepository {
    pool: Pool<Postgres>,
}

impl BookingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for BookingsRepository {
    async fn insert(&self, booking: &NewBooking) -> AppResult<Booking> {
        let row = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                id, invoice_id, name, email, phone, session_type,
                selected_slot, note, status, amount
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&booking.invoice_id)
        .bind(&booking.name)
        .bind(&booking.email)
        .bind(&booking.phone)
        .bind(&booking.session_type)
        .bind(booking.selected_slot)
        .bind(&booking.note)
        .bind(BookingStatus::Pending)
        .bind(booking.amount)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_invoice(&self, invoice_id: &str) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE invoice_id = $1")
            .bind(invoice_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn transition(&self, invoice_id: &str, status: BookingStatus) -> AppResult<Option<Booking>> {
        if !status.is_terminal() {
            return Err(AppError::Internal(format!(
                "Refusing to transition booking {} to {}",
                invoice_id, status
            )));
        }
        let paid_at = (status == BookingStatus::Paid).then(Utc::now);

        let row = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = $2, paid_at = COALESCE($3, paid_at)
            WHERE invoice_id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(invoice_id)
        .bind(status)
        .bind(paid_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn set_calendar_event(&self, id: Uuid, event_id: &str) -> AppResult<()> {
        sqlx::query("UPDATE bookings SET calendar_event_id = $2 WHERE id = $1")
            .bind(id)
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if filter.status.is_some() {
            conditions.push(format!("status = ${}", idx));
            idx += 1;
        }
        if filter.search.is_some() {
            conditions.push(format!("(name ILIKE ${0} OR email ILIKE ${0})", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let select_q = format!(
            "SELECT * FROM bookings {} ORDER BY created_at DESC",
            where_clause
        );
        let mut builder = sqlx::query_as::<_, Booking>(&select_q);
        if let Some(status) = filter.status { builder = builder.bind(status); }
        if let Some(ref search) = filter.search { builder = builder.bind(format!("%{}%", search)); }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn count_by_status(&self) -> AppResult<Vec<(BookingStatus, i64)>> {
        let rows = sqlx::query_as::<_, (BookingStatus, i64)>(
            "SELECT status, COUNT(*) FROM bookings GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
