//! Working hours configuration

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::settings::{WorkingHours, WORKING_HOURS_KEY},
    repository::SettingsStore,
};

#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn SettingsStore>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Current working hours, falling back to the default when unset or unreadable
    pub async fn working_hours(&self) -> AppResult<WorkingHours> {
        let Some(value) = self.store.get(WORKING_HOURS_KEY).await? else {
            return Ok(WorkingHours::default());
        };

        match serde_json::from_value::<WorkingHours>(value) {
            Ok(hours) if hours.validate().is_ok() => Ok(hours),
            Ok(hours) => {
                tracing::warn!(?hours, "Stored working hours are invalid, using default");
                Ok(WorkingHours::default())
            }
            Err(e) => {
                tracing::warn!("Stored working hours are malformed, using default: {}", e);
                Ok(WorkingHours::default())
            }
        }
    }

    pub async fn update_working_hours(&self, hours: WorkingHours) -> AppResult<WorkingHours> {
        hours.validate()?;
        let value = serde_json::to_value(hours)
            .map_err(|e| AppError::Internal(format!("Failed to encode working hours: {}", e)))?;
        self.store.put(WORKING_HOURS_KEY, value).await?;
        tracing::info!(start = hours.start, end = hours.end, "Working hours updated");
        Ok(hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::settings::MockSettingsStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_absent_row_defaults() {
        let mut store = MockSettingsStore::new();
        store.expect_get().returning(|_| Ok(None));
        let svc = SettingsService::new(Arc::new(store));
        assert_eq!(svc.working_hours().await.unwrap(), WorkingHours { start: 9, end: 15 });
    }

    #[tokio::test]
    async fn test_stored_hours_are_used() {
        let mut store = MockSettingsStore::new();
        store
            .expect_get()
            .returning(|_| Ok(Some(json!({ "start": 10, "end": 18 }))));
        let svc = SettingsService::new(Arc::new(store));
        assert_eq!(svc.working_hours().await.unwrap(), WorkingHours { start: 10, end: 18 });
    }

    #[tokio::test]
    async fn test_inverted_stored_hours_fall_back() {
        let mut store = MockSettingsStore::new();
        store
            .expect_get()
            .returning(|_| Ok(Some(json!({ "start": 18, "end": 10 }))));
        let svc = SettingsService::new(Arc::new(store));
        assert_eq!(svc.working_hours().await.unwrap(), WorkingHours::default());
    }

    #[tokio::test]
    async fn test_update_validates_before_writing() {
        // No put expectation: an invalid update must not reach the store
        let svc = SettingsService::new(Arc::new(MockSettingsStore::new()));
        let result = svc.update_working_hours(WorkingHours { start: 16, end: 9 }).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_upserts_json() {
        let mut store = MockSettingsStore::new();
        store
            .expect_put()
            .withf(|key, value| key == WORKING_HOURS_KEY && *value == json!({ "start": 8, "end": 17 }))
            .times(1)
            .returning(|_, _| Ok(()));
        let svc = SettingsService::new(Arc::new(store));
        let hours = svc.update_working_hours(WorkingHours { start: 8, end: 17 }).await.unwrap();
        assert_eq!(hours.end, 17);
    }
}
