//! Studio settings stored in the key/value `settings` table

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Settings key holding the working hours row
pub const WORKING_HOURS_KEY: &str = "working_hours";

/// Daily window during which a session may start, in studio-local hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WorkingHours {
    pub start: u32,
    pub end: u32,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self { start: 9, end: 15 }
    }
}

impl WorkingHours {
    pub fn validate(&self) -> AppResult<()> {
        if self.end > 23 {
            return Err(AppError::Validation(
                "working hours must be within 0..=23".to_string(),
            ));
        }
        if self.start >= self.end {
            return Err(AppError::Validation(
                "working hours start must be before end".to_string(),
            ));
        }
        Ok(())
    }
}
