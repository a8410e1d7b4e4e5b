//! Data models for the studio booking server

pub mod auth;
pub mod booking;
pub mod payment;
pub mod session_type;
pub mod settings;
pub mod slot;
pub mod vacation;

// Re-export commonly used types
pub use booking::{Booking, BookingStatus, NewBooking};
pub use payment::{InvoiceStatus, WebhookPayload};
pub use session_type::SessionType;
pub use settings::WorkingHours;
pub use slot::{BusyInterval, TimeSlot};
pub use vacation::{NewVacationBlock, VacationBlock};
