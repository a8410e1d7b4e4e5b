//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, availability, bookings, health, payments, settings, vacations};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Studio Booking API",
        version = "1.0.0",
        description = "Photography studio availability, deposits and calendar sync",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        // Booking
        availability::get_availability,
        availability::list_session_types,
        bookings::create_booking,
        bookings::create_invoice,
        bookings::booking_status,
        // Payments
        payments::payment_webhook,
        // Admin
        bookings::list_bookings,
        settings::get_working_hours,
        settings::update_working_hours,
        vacations::list_vacations,
        vacations::create_vacation,
        vacations::delete_vacation,
    ),
    components(
        schemas(
            crate::models::auth::LoginRequest,
            crate::models::auth::LoginResponse,
            crate::models::slot::TimeSlot,
            crate::models::slot::AvailabilityResponse,
            crate::models::session_type::SessionType,
            crate::models::booking::Booking,
            crate::models::booking::BookingStatus,
            crate::models::booking::BookingRequest,
            crate::models::booking::CreateBookingRequest,
            crate::models::booking::InvoiceRequest,
            crate::models::booking::InvoiceResponse,
            crate::models::booking::OpenedBooking,
            crate::models::booking::BookingStatusResponse,
            crate::models::booking::BookingStats,
            crate::models::booking::BookingListResponse,
            crate::models::payment::InvoiceStatus,
            crate::models::payment::WebhookPayload,
            crate::models::payment::WebhookAck,
            crate::models::settings::WorkingHours,
            crate::models::vacation::VacationBlock,
            crate::models::vacation::CreateVacationBlock,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Admin authentication"),
        (name = "booking", description = "Availability and booking flow"),
        (name = "payments", description = "Payment provider callbacks"),
        (name = "admin", description = "Studio administration")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
