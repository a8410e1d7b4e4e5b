//! Studio Booking Server
//!
//! Booking backend for a photography studio: bookable slots derived from
//! working hours and the studio calendar, deposit invoices, payment webhooks
//! and vacation blocks mirrored to Google Calendar.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
