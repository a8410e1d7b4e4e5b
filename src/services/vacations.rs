//! Vacation manager: local blocks mirrored to the external calendar

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::vacation::{CreateVacationBlock, NewVacationBlock, VacationBlock},
    repository::VacationStore,
    services::{
        calendar::{CalendarEvent, CalendarGateway, DeleteOutcome, EventTiming},
        pipeline::SideEffects,
    },
};

/// Google Calendar color id used for blocked days
const VACATION_COLOR_ID: &str = "11";

#[derive(Clone)]
pub struct VacationService {
    store: Arc<dyn VacationStore>,
    calendar: Arc<dyn CalendarGateway>,
    side_effect_timeout: Duration,
}

impl VacationService {
    pub fn new(
        store: Arc<dyn VacationStore>,
        calendar: Arc<dyn CalendarGateway>,
        side_effect_timeout: Duration,
    ) -> Self {
        Self {
            store,
            calendar,
            side_effect_timeout,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<VacationBlock>> {
        self.store.list().await
    }

    /// Persist a block, then mirror it to the calendar if possible
    pub async fn block(&self, data: CreateVacationBlock) -> AppResult<VacationBlock> {
        let new_block = NewVacationBlock::try_from(data)?;
        let mut block = self.store.insert(&new_block).await?;
        tracing::info!(
            vacation_id = %block.id,
            start = %block.start_date,
            end = %block.end_date,
            "Vacation block created"
        );

        let mut effects = SideEffects::new(self.side_effect_timeout, block.id.to_string());
        let event = mirror_event(&block);
        if let Some(event_id) = effects
            .run("calendar_mirror", self.calendar.create_event(&event))
            .await
        {
            if effects
                .run("record_calendar_event", self.store.set_calendar_event(block.id, &event_id))
                .await
                .is_some()
            {
                block.calendar_event_id = Some(event_id);
            }
        }
        Ok(block)
    }

    /// Delete a block; the mirrored event is removed best-effort
    pub async fn unblock(&self, id: Uuid) -> AppResult<()> {
        let block = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Vacation block {} not found", id)))?;

        let mut effects = SideEffects::new(self.side_effect_timeout, id.to_string());
        match &block.calendar_event_id {
            Some(event_id) => {
                if let Some(DeleteOutcome::NotFound) = effects
                    .run("calendar_unmirror", self.calendar.delete_event(event_id))
                    .await
                {
                    tracing::info!(vacation_id = %id, event_id = %event_id, "Mirrored event already gone");
                }
            }
            None => effects.skip("calendar_unmirror", "block was never mirrored"),
        }

        if !self.store.delete(id).await? {
            return Err(AppError::NotFound(format!("Vacation block {} not found", id)));
        }
        tracing::info!(vacation_id = %id, "Vacation block deleted");
        Ok(())
    }
}

/// All-day calendar event covering the block; the end date is exclusive
fn mirror_event(block: &VacationBlock) -> CalendarEvent {
    CalendarEvent {
        summary: block.title(),
        description: format!(
            "Studio closed {} to {}",
            block.start_date.format("%Y-%m-%d"),
            block.end_date.format("%Y-%m-%d")
        ),
        timing: EventTiming::AllDay {
            start: block.start_date,
            end_exclusive: block.end_date + chrono::Duration::days(1),
        },
        color_id: Some(VACATION_COLOR_ID.to_string()),
        reminder_minutes: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{repository::vacations::MockVacationStore, services::calendar::MockCalendarGateway};
    use chrono::{NaiveDate, Utc};
    use mockall::predicate::eq;
    use tokio_test::{assert_err, assert_ok};

    fn stored(calendar_event_id: Option<&str>) -> VacationBlock {
        VacationBlock {
            id: Uuid::nil(),
            start_date: NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2030, 1, 12).unwrap(),
            reason: Some("Holidays".to_string()),
            calendar_event_id: calendar_event_id.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    fn create() -> CreateVacationBlock {
        CreateVacationBlock {
            start_date: "2030-01-10".to_string(),
            end_date: "2030-01-12".to_string(),
            reason: Some("Holidays".to_string()),
        }
    }

    fn service(store: MockVacationStore, calendar: MockCalendarGateway) -> VacationService {
        VacationService::new(Arc::new(store), Arc::new(calendar), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_block_mirrors_all_day_event() {
        let mut store = MockVacationStore::new();
        store.expect_insert().times(1).returning(|_| Ok(stored(None)));
        store
            .expect_set_calendar_event()
            .withf(|_, event_id| event_id == "evt-v")
            .times(1)
            .returning(|_, _| Ok(()));
        let mut calendar = MockCalendarGateway::new();
        calendar
            .expect_create_event()
            .withf(|event| {
                event.timing
                    == EventTiming::AllDay {
                        start: NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
                        end_exclusive: NaiveDate::from_ymd_opt(2030, 1, 13).unwrap(),
                    }
                    && event.summary == "Vacation: Holidays"
            })
            .times(1)
            .returning(|_| Ok("evt-v".to_string()));

        let block = service(store, calendar).block(create()).await.unwrap();
        assert_eq!(block.calendar_event_id.as_deref(), Some("evt-v"));
    }

    #[tokio::test]
    async fn test_block_survives_mirror_failure() {
        let mut store = MockVacationStore::new();
        store.expect_insert().times(1).returning(|_| Ok(stored(None)));
        store.expect_set_calendar_event().times(0);
        let mut calendar = MockCalendarGateway::new();
        calendar
            .expect_create_event()
            .returning(|_| Err(AppError::Configuration("calendar missing".to_string())));

        let block = service(store, calendar).block(create()).await.unwrap();
        assert_eq!(block.calendar_event_id, None);
    }

    #[tokio::test]
    async fn test_block_rejects_inverted_range() {
        let svc = service(MockVacationStore::new(), MockCalendarGateway::new());
        let mut data = create();
        data.start_date = "2030-01-13".to_string();
        let err = assert_err!(svc.block(data).await);
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unblock_deletes_locally_when_remote_fails() {
        let mut store = MockVacationStore::new();
        store.expect_get().returning(|_| Ok(Some(stored(Some("evt-v")))));
        store.expect_delete().with(eq(Uuid::nil())).times(1).returning(|_| Ok(true));
        let mut calendar = MockCalendarGateway::new();
        calendar
            .expect_delete_event()
            .times(1)
            .returning(|_| Err(AppError::upstream("calendar", "timeout")));

        assert_ok!(service(store, calendar).unblock(Uuid::nil()).await);
    }

    #[tokio::test]
    async fn test_unblock_without_mirror_skips_calendar() {
        let mut store = MockVacationStore::new();
        store.expect_get().returning(|_| Ok(Some(stored(None))));
        store.expect_delete().times(1).returning(|_| Ok(true));

        assert_ok!(service(store, MockCalendarGateway::new()).unblock(Uuid::nil()).await);
    }

    #[tokio::test]
    async fn test_unblock_unknown_id_is_not_found() {
        let mut store = MockVacationStore::new();
        store.expect_get().returning(|_| Ok(None));
        let result = service(store, MockCalendarGateway::new())
            .unblock(Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
