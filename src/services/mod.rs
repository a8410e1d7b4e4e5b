//! Business logic services

pub mod auth;
pub mod availability;
pub mod bookings;
pub mod calendar;
pub mod payment;
pub mod pipeline;
pub mod settings;
pub mod slots;
pub mod telegram;
pub mod vacations;

use std::{sync::Arc, time::Duration};

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    repository::Repository,
};

/// Timeout for every outbound provider call
const HTTP_TIMEOUT_SECS: u64 = 20;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub availability: availability::AvailabilityService,
    pub bookings: bookings::BookingService,
    pub vacations: vacations::VacationService,
    pub settings: settings::SettingsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository and configuration
    pub fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        let tz = config
            .booking
            .tz()
            .map_err(|e| AppError::Configuration(e.to_string()))?;
        let side_effect_timeout = Duration::from_secs(config.booking.side_effect_timeout_secs);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let calendar: Arc<dyn calendar::CalendarGateway> = Arc::new(calendar::GoogleCalendar::new(
            http.clone(),
            config.calendar.clone(),
            tz.name(),
        ));
        let payment: Arc<dyn payment::PaymentGateway> =
            Arc::new(payment::MonobankAcquiring::new(http.clone(), config.payment.clone()));
        let notifier: Arc<dyn telegram::Notifier> =
            Arc::new(telegram::TelegramNotifier::new(http, config.telegram.clone()));

        let settings = settings::SettingsService::new(Arc::new(repository.settings.clone()));

        let availability = availability::AvailabilityService::new(
            calendar.clone(),
            Arc::new(repository.vacations.clone()),
            settings.clone(),
            availability::AvailabilityPolicy {
                tz,
                block_minutes: config.booking.block_minutes,
                buffer_minutes: config.booking.buffer_minutes,
                default_days_ahead: config.booking.default_days_ahead,
                max_days_ahead: config.booking.max_days_ahead,
            },
        );

        let bookings = bookings::BookingService::new(
            Arc::new(repository.bookings.clone()),
            Arc::new(repository.session_types.clone()),
            payment,
            calendar.clone(),
            notifier,
            settings.clone(),
            bookings::BookingPolicy {
                tz,
                block_minutes: config.booking.block_minutes,
                session_minutes: config.booking.session_minutes,
                side_effect_timeout,
                currency_code: config.payment.currency_code,
                invoice_validity_secs: config.payment.invoice_validity_secs,
                public_base_url: config.server.public_base_url.clone(),
            },
        );

        let vacations = vacations::VacationService::new(
            Arc::new(repository.vacations.clone()),
            calendar,
            side_effect_timeout,
        );

        Ok(Self {
            auth: auth::AuthService::new(config.auth.clone()),
            availability,
            bookings,
            vacations,
            settings,
            repository,
        })
    }

    /// Whether the database answers queries
    pub async fn database_ready(&self) -> bool {
        self.repository.ping().await
    }
}
