//! Repository layer for database operations

pub mod bookings;
pub mod session_types;
pub mod settings;
pub mod vacations;

use sqlx::{Pool, Postgres};

pub use bookings::BookingStore;
pub use session_types::SessionTypeStore;
pub use settings::SettingsStore;
pub use vacations::VacationStore;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub bookings: bookings::BookingsRepository,
    pub vacations: vacations::VacationsRepository,
    pub settings: settings::SettingsRepository,
    pub session_types: session_types::SessionTypesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            bookings: bookings::BookingsRepository::new(pool.clone()),
            vacations: vacations::VacationsRepository::new(pool.clone()),
            settings: settings::SettingsRepository::new(pool.clone()),
            session_types: session_types::SessionTypesRepository::new(pool.clone()),
            pool,
        }
    }

    /// Check database connectivity
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
