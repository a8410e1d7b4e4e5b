//! Availability query: calendar busy time, vacation blocks and working hours
//! fed into the slot generator

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::{
    error::AppResult,
    models::{slot::local_to_utc, BusyInterval, TimeSlot},
    repository::VacationStore,
    services::{
        calendar::CalendarGateway,
        settings::SettingsService,
        slots::{self, SlotRules},
    },
};

#[derive(Debug, Clone, Copy)]
pub struct AvailabilityPolicy {
    pub tz: Tz,
    pub block_minutes: i64,
    pub buffer_minutes: i64,
    pub default_days_ahead: i64,
    pub max_days_ahead: i64,
}

#[derive(Clone)]
pub struct AvailabilityService {
    calendar: Arc<dyn CalendarGateway>,
    vacations: Arc<dyn VacationStore>,
    settings: SettingsService,
    policy: AvailabilityPolicy,
}

impl AvailabilityService {
    pub fn new(
        calendar: Arc<dyn CalendarGateway>,
        vacations: Arc<dyn VacationStore>,
        settings: SettingsService,
        policy: AvailabilityPolicy,
    ) -> Self {
        Self {
            calendar,
            vacations,
            settings,
            policy,
        }
    }

    /// Free slots from tomorrow (studio time) for `days` days
    pub async fn get_availability(&self, days: Option<i64>) -> AppResult<Vec<TimeSlot>> {
        let today = Utc::now().with_timezone(&self.policy.tz).date_naive();
        self.availability_from(today, days).await
    }

    pub async fn availability_from(&self, today: NaiveDate, days: Option<i64>) -> AppResult<Vec<TimeSlot>> {
        let days = days
            .unwrap_or(self.policy.default_days_ahead)
            .clamp(1, self.policy.max_days_ahead.max(1));
        let range_start = today + Duration::days(1);
        let range_end = range_start + Duration::days(days);

        let tz = self.policy.tz;
        let time_min = local_to_utc(tz, range_start.and_time(NaiveTime::MIN));
        let time_max = local_to_utc(tz, range_end.and_time(NaiveTime::MIN));

        let mut busy: Vec<BusyInterval> = self.calendar.query_busy(time_min, time_max).await?;
        let calendar_busy = busy.len();

        // Vacation blocks count even when their calendar mirror is missing
        let last_day = range_end - Duration::days(1);
        let blocks = self.vacations.overlapping(range_start, last_day).await?;
        busy.extend(blocks.iter().map(|b| b.as_busy_interval(tz)));

        let working_hours = self.settings.working_hours().await?;
        let rules = SlotRules {
            working_hours,
            block_minutes: self.policy.block_minutes,
            buffer_minutes: self.policy.buffer_minutes,
            tz,
        };
        let slots = slots::generate(range_start, range_end, &busy, &rules);

        tracing::debug!(
            %range_start,
            days,
            calendar_busy,
            vacation_blocks = blocks.len(),
            slots = slots.len(),
            "Availability computed"
        );
        Ok(slots)
    }
}
