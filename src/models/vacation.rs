//! Vacation blocks: closed date ranges during which the studio takes no sessions

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::slot::{local_to_utc, BusyInterval};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VacationBlock {
    pub id: Uuid,
    pub start_date: NaiveDate,
    /// Inclusive
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    /// Mirror in the external calendar, if the mirror call succeeded
    pub calendar_event_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl VacationBlock {
    /// Whole-day busy interval in the studio timezone:
    /// local midnight of `start_date` up to local midnight after `end_date`
    pub fn as_busy_interval(&self, tz: Tz) -> BusyInterval {
        let start = local_to_utc(tz, self.start_date.and_time(chrono::NaiveTime::MIN));
        let end = local_to_utc(
            tz,
            (self.end_date + Duration::days(1)).and_time(chrono::NaiveTime::MIN),
        );
        BusyInterval::new(start, end)
    }

    pub fn title(&self) -> String {
        format!("Vacation: {}", self.reason.as_deref().unwrap_or("Blocked"))
    }
}

/// Create vacation block request
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVacationBlock {
    /// First blocked day (YYYY-MM-DD)
    pub start_date: String,
    /// Last blocked day, inclusive (YYYY-MM-DD)
    pub end_date: String,
    pub reason: Option<String>,
}

/// Validated vacation range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVacationBlock {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

impl TryFrom<CreateVacationBlock> for NewVacationBlock {
    type Error = AppError;

    fn try_from(data: CreateVacationBlock) -> AppResult<Self> {
        let parse = |field: &str, value: &str| {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .map_err(|_| AppError::Validation(format!("{} must be a YYYY-MM-DD date", field)))
        };
        let start_date = parse("startDate", &data.start_date)?;
        let end_date = parse("endDate", &data.end_date)?;
        if start_date > end_date {
            return Err(AppError::Validation(
                "startDate must not be after endDate".to_string(),
            ));
        }
        let reason = data
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        Ok(Self {
            start_date,
            end_date,
            reason,
        })
    }
}
